//! Completion client abstraction layer
//!
//! This module provides a trait-based abstraction for the remote
//! text-completion service, so the production `genai` client and the scripted
//! mock can be used interchangeably.

mod client;
mod error;
mod genai;
mod mock;
mod types;

pub use client::LLMClient;
pub use error::BackendError;
pub use genai::{GenAIClient, API_BASE_URL_ENV};
pub use mock::{MockLLMClient, MockResponse};
pub use types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
