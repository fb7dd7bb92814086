// pipewright/src/pipeline/mod.rs

//! Defines the `Pipeline<C>` struct, its construction, observers and execution logic.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::{Pipeline, DEFAULT_TIMEOUT};
pub use hooks::{Failure, StepEvent};
