//! page_ask tool implementation.
//!
//! Answers a question about page text the caller already loaded. The caller
//! owns the conversation: it sends the history in and gets the updated
//! history back.

use pagechat_client::LanguageModel;
use pagechat_core::{Error, Turn, build_prompt};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input parameters for page_ask tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PageAskParams {
    /// Page text, usually the `text` field of a page_load result.
    pub content: String,

    /// Previous turns for this page, oldest first.
    #[serde(default)]
    pub history: Vec<Turn>,

    /// The new question.
    pub question: String,
}

/// Output structure for page_ask tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageAskOutput {
    pub answer: String,
    /// Input history with the new turn appended.
    pub history: Vec<Turn>,
}

/// Build the prompt, query the model, and append the turn.
pub async fn ask(model: &dyn LanguageModel, max_prompt_chars: usize, params: PageAskParams) -> Result<PageAskOutput, Error> {
    let prompt = build_prompt(&params.content, &params.history, &params.question, max_prompt_chars)?;
    let answer = model.generate(&prompt).await?;

    let mut history = params.history;
    history.push(Turn::new(params.question.trim(), answer.clone()));

    Ok(PageAskOutput { answer, history })
}

/// Implementation of the page_ask tool.
///
/// `model` is `None` when no API key is configured.
pub async fn ask_impl(
    model: Option<&dyn LanguageModel>, max_prompt_chars: usize, params: PageAskParams,
) -> Result<CallToolResult, McpError> {
    let model = model.ok_or_else(|| Error::Llm("missing API key: set PAGECHAT_GEMINI_API_KEY".into()))?;
    let output = ask(model, max_prompt_chars, params).await?;

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| McpError::internal_error(format!("failed to serialize output: {e}"), None))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
