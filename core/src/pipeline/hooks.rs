// pipewright/src/pipeline/hooks.rs

//! Observer registration for the two events a pipeline emits:
//! `step` (before a step's logic runs) and `error` (once per failed run).
//! Listeners are invoked synchronously, in registration order.

use crate::core::results::Results;
use crate::core::step::Handler;
use crate::error::PipelineError;
use crate::pipeline::definition::Pipeline;
use std::sync::Arc;

/// Emitted before a step is entered.
pub struct StepEvent<'a, C: Send + Sync + 'static> {
  pub pipeline: &'a str,
  pub step_name: &'a str,
  pub step_index: usize,
  /// The function about to be invoked.
  pub handler: &'a Handler<C>,
}

impl<C: Send + Sync + 'static> Clone for StepEvent<'_, C> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<C: Send + Sync + 'static> Copy for StepEvent<'_, C> {}

impl<C: Send + Sync + 'static> std::fmt::Debug for StepEvent<'_, C> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepEvent")
      .field("pipeline", &self.pipeline)
      .field("step_name", &self.step_name)
      .field("step_index", &self.step_index)
      .finish_non_exhaustive()
  }
}

/// Attribution handed to error listeners alongside the error.
#[derive(Debug)]
pub struct Failure<'a, C> {
  pub pipeline: &'a str,
  /// The engine's `current_step` when the failure surfaced.
  pub current_step: usize,
  /// Name of the blamed step; `None` only for a pipeline without steps.
  pub step_name: Option<&'a str>,
  /// Partial results at the time of failure.
  pub results: &'a Results<C>,
}

pub type StepListener<C> = Arc<dyn Fn(&StepEvent<'_, C>, &Results<C>) + Send + Sync>;
pub type ErrorListener<C> = Arc<dyn Fn(&PipelineError, &Failure<'_, C>) + Send + Sync>;

impl<C: Send + Sync + 'static> Pipeline<C> {
  /// Registers a listener for the `step` event.
  ///
  /// Listeners registered from inside a callback first hear the next event.
  pub fn on_step(&self, listener: impl Fn(&StepEvent<'_, C>, &Results<C>) + Send + Sync + 'static) -> &Self {
    self.inner.step_listeners.write().push(Arc::new(listener));
    self
  }

  /// Registers a listener for the `error` event.
  pub fn on_error(&self, listener: impl Fn(&PipelineError, &Failure<'_, C>) + Send + Sync + 'static) -> &Self {
    self.inner.error_listeners.write().push(Arc::new(listener));
    self
  }

  // Listeners run on a snapshot so a callback may register more listeners
  // without re-entering the list lock.
  pub(crate) fn emit_step(&self, event: &StepEvent<'_, C>, results: &Results<C>) {
    let listeners = self.inner.step_listeners.read().clone();
    for listener in listeners.iter() {
      listener(event, results);
    }
  }

  pub(crate) fn emit_error(&self, error: &PipelineError, failure: &Failure<'_, C>) {
    let listeners = self.inner.error_listeners.read().clone();
    for listener in listeners.iter() {
      listener(error, failure);
    }
  }
}
