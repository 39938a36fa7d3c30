//! Search provider implementations.
//!
//! Each module provides a struct implementing [`crate::engine::SearchBackend`].

pub mod brave;

pub use brave::BraveSearchClient;
