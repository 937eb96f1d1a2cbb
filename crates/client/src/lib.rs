//! Client code for pagechat.
//!
//! This crate provides the page extraction pipeline (URL normalization,
//! static fetch, headless rendering, text heuristics, and the coordinator
//! that sequences them) plus the Gemini client used for question answering.
//! It is shared by the MCP server and the CLI.

pub mod coordinator;
pub mod extract;
pub mod fetch;
pub mod gemini;
pub mod render;

pub use coordinator::{ContentSource, DYNAMIC_UNAVAILABLE_NOTE, Extractor, LoadOptions, StaticExtractor};
pub use extract::{ExtractConfig, FragmentSet, PageText, dedup_fragments, extract_rendered, extract_static};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, HtmlFetcher, UrlError, normalize};
pub use gemini::{GeminiClient, GeminiConfig, GeminiError, LanguageModel, ask_session};
pub use render::{DynamicExtractor, RenderError, RenderOptions, RenderedPage, Renderer};

#[cfg(feature = "render")]
pub use render::HeadlessRenderer;
