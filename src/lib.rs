//! docscout: live documentation lookup for coding agents.
//!
//! The search, fetch and formatting pipeline lives in the
//! [`docscout_search`] crate. This crate adds:
//!
//! - [`DocscoutConfig`]: TOML configuration with credentials from the
//!   environment
//! - agent tools ([`tools::WebSearchTool`], [`tools::FetchDocumentationTool`])
//!   behind the [`tools::Tool`] trait and a [`tools::ToolRegistry`]
//! - the `docscout` command-line binary

pub mod config;
pub mod error;
pub mod tools;

pub use config::{CacheConfig, DocscoutConfig, ToolsConfig};
pub use error::{DocscoutError, Result};
pub use tools::{Tool, ToolRegistry, ToolResult, build_registry};

pub use docscout_search;
