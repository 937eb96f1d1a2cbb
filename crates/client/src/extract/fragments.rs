//! Fragment collection with normalized-prefix deduplication.
//!
//! Fragments are compared by a key made of the lowercased,
//! whitespace-collapsed text cut to a fixed prefix length. Repeated
//! boilerplate that appears in several elements is kept once, in the order
//! it was first seen.

use std::collections::HashSet;

use super::normalize::clean_whitespace;

/// Default prefix length for dedup keys.
pub const DEDUP_PREFIX_CHARS: usize = 100;

/// Dedup key: lowercased, whitespace-collapsed, first `prefix_len` chars.
pub fn dedup_key(fragment: &str, prefix_len: usize) -> String {
    clean_whitespace(fragment).to_lowercase().chars().take(prefix_len).collect()
}

/// Ordered set of cleaned text fragments.
#[derive(Debug, Clone)]
pub struct FragmentSet {
    prefix_len: usize,
    seen: HashSet<String>,
    fragments: Vec<String>,
    body_chars: usize,
}

impl Default for FragmentSet {
    fn default() -> Self {
        Self::new(DEDUP_PREFIX_CHARS)
    }
}

impl FragmentSet {
    pub fn new(prefix_len: usize) -> Self {
        Self { prefix_len, seen: HashSet::new(), fragments: Vec::new(), body_chars: 0 }
    }

    /// Clean and add a fragment. Returns false for empty or already-seen text.
    pub fn push(&mut self, fragment: &str) -> bool {
        let cleaned = clean_whitespace(fragment);
        if cleaned.is_empty() {
            return false;
        }

        let key = dedup_key(&cleaned, self.prefix_len);
        if !self.seen.insert(key) {
            return false;
        }

        if !self.fragments.is_empty() {
            self.body_chars += 1;
        }
        self.body_chars += cleaned.chars().count();
        self.fragments.push(cleaned);
        true
    }

    /// Add every fragment, returning how many were new.
    pub fn extend<I, S>(&mut self, fragments: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fragments.into_iter().filter(|f| self.push(f.as_ref())).count()
    }

    /// Whether `fragment` already appears inside an accepted fragment.
    pub fn covers(&self, fragment: &str) -> bool {
        let needle = clean_whitespace(fragment).to_lowercase();
        !needle.is_empty() && self.fragments.iter().any(|f| f.to_lowercase().contains(&needle))
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Character count of the joined body.
    pub fn body_chars(&self) -> usize {
        self.body_chars
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Fragments joined by single newlines.
    pub fn join(&self) -> String {
        self.fragments.join("\n")
    }
}

/// Deduplicate a fragment list; applying it twice gives the same result.
pub fn dedup_fragments<S: AsRef<str>>(fragments: &[S], prefix_len: usize) -> Vec<String> {
    let mut set = FragmentSet::new(prefix_len);
    set.extend(fragments);
    set.fragments
}
