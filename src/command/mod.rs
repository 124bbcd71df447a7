//! Command execution infrastructure
//!
//! This module handles:
//! - Replaying a command script step by step
//! - Dispatching each command to its handler
//! - Collecting per-step feedback
//! - Aborting on device faults or stop requests

mod executor;
pub mod handlers;

pub use executor::{CommandExecutor, CommandResult, ExecutionError};
