//! Minimal client for the Gemini `generateContent` endpoint.

mod client;

pub use client::{GeminiClient, GeminiError, DEFAULT_ENDPOINT, DEFAULT_MODEL};
