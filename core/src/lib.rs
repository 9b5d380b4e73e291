//! Core library: prompt composition, conversation state and the action handler.

pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod form;
pub mod handler;
pub mod prompt;
pub mod session;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use client::{GeminiAdapter, GenerationError, ModelClient};
pub use config::Config;
pub use conversation::{Conversation, Phase};
pub use error::{ConfigError, PlannerError};
pub use handler::{handle, Action, Outcome};
pub use session::{Session, SessionHandle, SessionId, SessionRegistry, DEFAULT_IDLE_TTL};
