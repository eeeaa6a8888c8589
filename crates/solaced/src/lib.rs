//! Solace daemon library - exposes modules for testing.

pub mod analytics;
pub mod emotion;
pub mod llm;
pub mod response;
pub mod retrieval;
pub mod routes;
pub mod server;
pub mod session;
