//! MCP tool implementations.
//!
//! This module contains all tools exposed by the pagechat server.

pub mod page_ask;
pub mod page_batch_load;
pub mod page_load;
