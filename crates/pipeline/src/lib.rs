//! The resilient exchange pipeline for chatrelay.
//!
//! Turns one incoming user message into one AI-generated response while
//! tolerating failures in both the store and the completion endpoint.

pub mod pipeline;
pub mod prompt;

pub use pipeline::{DEGRADED_REPLY, ExchangePipeline};
pub use prompt::assemble;
