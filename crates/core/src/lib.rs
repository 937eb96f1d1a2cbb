//! Core types and shared functionality for pagechat.
//!
//! This crate provides:
//! - Unified error types
//! - Configuration structures
//! - Page extraction result types
//! - The caller-owned chat session and prompt assembly

pub mod config;
pub mod error;
pub mod page;
pub mod session;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use page::{ExtractedPage, ExtractionAttempt, Method, PageOutcome, PageStats};
pub use session::{ChatSession, Turn, build_prompt};
