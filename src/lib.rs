//! Shopmate - storefront chat endpoint
//!
//! One HTTP request becomes a Gemini conversation turn. When the model asks
//! for it, a single catalog lookup runs and its result is fed back before the
//! final answer is returned.

pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod server;
pub mod tools;

pub use error::{Result, ShopmateError};
