//! Free-text answer oracle.
//!
//! This crate turns inbound stock questions into answers:
//! - **LLM client** (`llm`) - pluggable completion trait with an HTTP
//!   implementation for the hosted model API and a disabled stand-in
//! - **Answer relay** (`relay`) - builds a bounded stock-context prompt
//!   around the verbatim query and returns the oracle's text, or a fixed
//!   fallback when the oracle is unavailable or silent
//!
//! # Safety principle
//!
//! The oracle only words answers. It never mutates inventory and its
//! failures never become engine-level errors; the worst outcome of this
//! crate is the fallback string.

pub mod llm;
pub mod relay;

pub use llm::{DisabledLlmClient, HttpLlmClient, LlmClient};
pub use relay::{AnswerRelay, FALLBACK_ANSWER};
