//! Response generation and tone adaptation
//!
//! The line-oriented EMOTION/CONFIDENCE/RESPONSE micro-protocol lives in
//! `parser`; `adapter` rewrites answers to match the detected emotion and
//! tracks per-session frustration; `generator` drives the combined
//! detection+generation remote call and the deterministic fallback path.

pub mod adapter;
pub mod generator;
pub mod parser;

pub use adapter::{AdaptedAnswer, FrustrationTracker, ToneAdapter};
pub use generator::{GeneratedTurn, ResponseGenerator};
pub use parser::{parse_combined_reply, ParsedReply};
