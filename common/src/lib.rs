//! Shared data model for the event planner: form parameters and transcript entries.

mod types;

pub use types::*;
