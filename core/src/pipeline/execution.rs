// pipewright/src/pipeline/execution.rs

//! Contains the `Pipeline::run()` method, responsible for sequencing the
//! steps, honouring `stop()`, enforcing the timeout and emitting events.

use crate::core::control::PipelineResult;
use crate::core::results::Results;
use crate::core::step::StepContext;
use crate::error::{PipelineError, StepError};
use crate::pipeline::definition::Pipeline;
use crate::pipeline::hooks::{Failure, StepEvent};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{event, instrument, Level};

impl<C: Send + Sync + 'static> Pipeline<C> {
  /// Runs the pipeline once against `context`, which becomes results entry 0.
  ///
  /// Steps are entered strictly one at a time. The step list is re-read before
  /// every step, so steps appended during the run are picked up. The whole run
  /// is bounded by the pipeline timeout.
  ///
  /// Any failure (a step error, a panicking step, the timeout) is delivered to
  /// the `error` listeners exactly once and then returned. Calling `run` a
  /// second time returns `PipelineError::AlreadyStarted` without emitting.
  #[instrument(
        name = "Pipeline::run",
        skip_all,
        fields(
            pipeline = %self.inner.name,
            num_steps = self.step_count(),
        ),
        err(Display)
    )]
  pub async fn run(&self, context: C) -> Result<PipelineResult, PipelineError> {
    if self.inner.started.swap(true, Ordering::SeqCst) {
      event!(Level::ERROR, "Pipeline instance reused; create a new one per request.");
      return Err(PipelineError::AlreadyStarted {
        pipeline: self.inner.name.clone(),
      });
    }

    let context = Arc::new(context);
    self.inner.state.lock().context = Some(Arc::clone(&context));

    let timeout = self.timeout();
    event!(Level::DEBUG, timeout_ms = timeout.as_millis() as u64, "Pipeline execution starting.");

    // Dropping the sequence future on expiry cancels the in-flight step.
    // Completing first drops the timer.
    let outcome = match tokio::time::timeout(timeout, self.sequence(&context)).await {
      Ok(outcome) => outcome,
      Err(_) => {
        event!(Level::WARN, "Pipeline timed out.");
        Err(PipelineError::Timeout {
          pipeline: self.inner.name.clone(),
          after: timeout,
        })
      }
    };

    match &outcome {
      Ok(result) => event!(Level::DEBUG, ?result, "Pipeline execution finished."),
      Err(error) => self.fail(error, &context),
    }
    outcome
  }

  async fn sequence(&self, context: &Arc<C>) -> Result<PipelineResult, PipelineError> {
    loop {
      let (step_index, results) = {
        let state = self.inner.state.lock();
        (state.current_step, Results::new(Arc::clone(context), state.entries.clone()))
      };

      let step = self.inner.steps.read().get(step_index).cloned();
      let Some(step) = step else {
        return Ok(PipelineResult::Completed);
      };

      self.emit_step(
        &StepEvent {
          pipeline: &self.inner.name,
          step_name: &step.name,
          step_index,
          handler: &step.handler,
        },
        &results,
      );
      event!(Level::TRACE, step = %step.name, step_index, "Entering step.");

      let step_ctx = StepContext {
        results,
        pipeline: self.clone(),
      };
      let handler = Arc::clone(&step.handler);
      let outcome = AssertUnwindSafe(async move { handler(step_ctx).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(PipelineError::Step(panic_to_step_error(panic))));

      let entry = match outcome {
        Ok(entry) => entry,
        Err(error) => {
          event!(Level::DEBUG, step = %step.name, step_index, error = %error, "Step failed.");
          return Err(error);
        }
      };

      let mut state = self.inner.state.lock();
      if let Some(entry) = entry {
        state.entries.push(entry);
      }
      state.current_step += 1;
      if state.stopped {
        event!(Level::DEBUG, step = %step.name, step_index, "Pipeline stopped after step.");
        return Ok(PipelineResult::Stopped);
      }
    }
  }

  fn fail(&self, error: &PipelineError, context: &Arc<C>) {
    let (current_step, results) = {
      let state = self.inner.state.lock();
      (state.current_step, Results::new(Arc::clone(context), state.entries.clone()))
    };
    let step_name = self.blamed_step(current_step);
    event!(Level::DEBUG, current_step, step = ?step_name, "Emitting pipeline error.");

    let failure = Failure {
      pipeline: &self.inner.name,
      current_step,
      step_name: step_name.as_deref(),
      results: &results,
    };
    self.emit_error(error, &failure);
  }
}

fn panic_to_step_error(panic: Box<dyn Any + Send>) -> StepError {
  let message = if let Some(text) = panic.downcast_ref::<&str>() {
    (*text).to_string()
  } else if let Some(text) = panic.downcast_ref::<String>() {
    text.clone()
  } else {
    "step panicked".to_string()
  };
  StepError::Exception {
    stack: Some(format!("panic: {}", message)),
    message,
  }
}
