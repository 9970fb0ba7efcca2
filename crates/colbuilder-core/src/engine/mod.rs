//! # Engine Module
//!
//! Stateful machinery behind the workflows: configuration, error types, progress
//! reporting, the optimization state machine, the connectivity and optimization
//! tasks, and the candidate generators the optimizer draws trial structures from.
//!
//! - **Configuration** ([`config`]) - Cutoffs, thresholds and attempt budgets with builders
//! - **Error Handling** ([`error`]) - One error enum per concern, collected by [`error::EngineError`]
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **State Tracking** ([`state`]) - Attempt history and outcome of an optimization run
//! - **Candidate Generation** ([`generators`]) - External-process and in-process trial sources

pub mod config;
pub mod error;
pub mod generators;
pub mod progress;
pub mod state;
pub mod tasks;
