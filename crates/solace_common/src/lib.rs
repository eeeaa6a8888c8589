//! Solace Common - Shared types for the Solace support chatbot
//!
//! Emotion taxonomy, chat schemas, LLM wire types, knowledge base and
//! configuration shared between the daemon and its tests.

pub mod config;
pub mod emotion;
pub mod kb;
pub mod llm;
pub mod messages;

pub use config::*;
pub use emotion::*;
pub use kb::*;
pub use llm::*;
pub use messages::*;
