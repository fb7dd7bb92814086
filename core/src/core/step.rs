// pipewright/src/core/step.rs

//! Defines a single step of a pipeline and what it receives when entered.

use super::results::{Entry, Results};
use crate::error::PipelineError;
use crate::pipeline::definition::Pipeline;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// What a step resolves to.
///
/// `Ok(Some(entry))` advances and appends `entry` to the results,
/// `Ok(None)` advances without appending, `Err(_)` fails the run.
/// A step that never resolves is caught by the pipeline timeout.
pub type StepResult = Result<Option<Entry>, PipelineError>;

/// Type alias for a type-erased step handler.
///
/// Handlers are stored behind an `Arc` so the engine can clone one out of the
/// step list and release the list lock before awaiting it. This is what lets a
/// running step append further steps.
pub type Handler<C> = Arc<dyn Fn(StepContext<C>) -> Pin<Box<dyn Future<Output = StepResult> + Send>> + Send + Sync>;

/// Everything a step gets when it is entered.
pub struct StepContext<C: Send + Sync + 'static> {
  /// Results accumulated before this step.
  pub results: Results<C>,
  /// Handle to the running pipeline, for `stop()` and `use_step()`.
  /// Do not store it inside a step closure; that would keep the pipeline alive forever.
  pub pipeline: Pipeline<C>,
}

/// Definition of a pipeline step.
pub struct StepDef<C: Send + Sync + 'static> {
  pub name: String,
  pub handler: Handler<C>,
}

impl<C: Send + Sync + 'static> Clone for StepDef<C> {
  fn clone(&self) -> Self {
    Self {
      name: self.name.clone(),
      handler: Arc::clone(&self.handler),
    }
  }
}

impl<C: Send + Sync + 'static> std::fmt::Debug for StepDef<C> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef").field("name", &self.name).finish_non_exhaustive()
  }
}
