//! Caller-owned chat session and prompt assembly.
//!
//! A [`ChatSession`] holds the currently loaded page and the question/answer
//! history for it. Nothing here is global: the CLI keeps one per run, and
//! tool callers send theirs along with every question.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Error, ExtractedPage};

const PERSONA: &str = "You are an expert in web content analysis and a highly interactive conversational AI assistant. \
When answering, provide detailed, specific insights and refer directly to facts, events, or examples mentioned in the website content. \
Include technical details when needed and use concrete examples to support your answer. \
If the question is unclear or requires more context, politely ask targeted follow-up questions. \
Avoid generic responses; be precise, specific, and advanced in your explanation.";

/// One question and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Turn {
    pub question: String,
    pub answer: String,
    /// Defaults to now when a caller sends history without timestamps.
    #[serde(default = "Utc::now")]
    pub asked_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self { question: question.into(), answer: answer.into(), asked_at: Utc::now() }
    }
}

/// Loaded page plus conversation history.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    page: Option<ExtractedPage>,
    turns: Vec<Turn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the loaded page. History belongs to the old page and is dropped.
    pub fn load(&mut self, page: ExtractedPage) {
        self.page = Some(page);
        self.turns.clear();
    }

    /// Clear the history, keeping the page.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn record(&mut self, question: impl Into<String>, answer: impl Into<String>) -> &Turn {
        self.turns.push(Turn::new(question, answer));
        &self.turns[self.turns.len() - 1]
    }

    pub fn is_ready(&self) -> bool {
        self.page.is_some()
    }

    pub fn page(&self) -> Option<&ExtractedPage> {
        self.page.as_ref()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Build the prompt for `question` against the loaded page.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if no page is loaded or the question is blank.
    pub fn prompt_for(&self, question: &str, max_prompt_chars: usize) -> Result<String, Error> {
        let page = self
            .page
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("no page loaded".into()))?;
        build_prompt(&page.text, &self.turns, question, max_prompt_chars)
    }
}

/// Assemble the LLM prompt from page text, history and the new question.
///
/// The page text is sliced to `max_prompt_chars` characters.
pub fn build_prompt(content: &str, turns: &[Turn], question: &str, max_prompt_chars: usize) -> Result<String, Error> {
    let question = question.trim();
    if question.is_empty() {
        return Err(Error::InvalidInput("question cannot be empty".into()));
    }
    if content.trim().is_empty() {
        return Err(Error::InvalidInput("content cannot be empty".into()));
    }

    let content = match content.char_indices().nth(max_prompt_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    };

    let mut prompt = format!("{PERSONA}\n\nWebsite content: {content}\n\nConversation history:\n");
    for turn in turns {
        prompt.push_str(&format!("User: {}\nAssistant: {}\n", turn.question, turn.answer));
    }
    prompt.push_str(&format!("User: {question}\nAssistant:"));

    Ok(prompt)
}
