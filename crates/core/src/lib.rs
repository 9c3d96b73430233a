//! # Chatrelay Core
//!
//! Domain types, traits, and error definitions for the chatrelay exchange
//! pipeline. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external collaborators — the persistent store and the remote
//! completion API — are defined as traits here. Implementations live in
//! their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod completion;
pub mod error;
pub mod exchange;
pub mod message;
pub mod profile;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use completion::{CompletionClient, CompletionRequest, CompletionResponse, Usage};
pub use error::{CompletionError, Error, Result, StoreError};
pub use exchange::Exchange;
pub use message::{PromptMessage, Role};
pub use profile::{PlaceholderProfile, ProfileId, ResolvedUser, UserProfile};
pub use store::ExchangeStore;
