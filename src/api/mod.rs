//! Client for the conversation service that proposes graph edits.

mod client;
mod error;
pub mod sse;
pub mod types;

pub use client::ConversationClient;
pub use error::ApiError;
pub use types::{ChatRequest, ChatResponse, HealthStatus, Message, MessageKind, StreamEvent};
