//! # sarissa-jpc
//!
//! A C-callable JSON control bridge for an embedded full-text search engine.
//!
//! A host process drives the engine through five `extern "C"` functions
//! (see [`ffi`]): `init`, `term`, `set_k_and_b`, `sarissa_jpc` and
//! `sarissa_jpc_free`. Each `sarissa_jpc` call carries one JSON request and
//! returns one JSON buffer per result item.
//!
//! ## Features
//!
//! - Session-scoped schemas, documents, indexes, readers and query parsers
//! - Dynamic schemas for schemaless `index_document` / `search` use
//! - BM25 scoring with host-tunable `k1` and `b`
//! - Term, phrase, boolean and fuzzy queries
//! - Score explanations and HTML snippets

pub mod analysis;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod index;
pub mod query;
pub mod schema;
pub mod search;

pub mod prelude {
    pub use crate::config::BridgeConfig;
    pub use crate::dispatch::{dispatch, Command, Reply};
    pub use crate::engine::Engine;
    pub use crate::error::{JpcError, Result};
    pub use crate::search::ScoringParams;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
