// pipewright/src/core/control.rs

//! Defines the outcome of a pipeline run that did not fail.

/// Outcome of a full pipeline execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step in the (possibly grown) step list advanced.
  Completed,
  /// A step called `stop()` and then advanced; no later step was entered.
  Stopped,
}
