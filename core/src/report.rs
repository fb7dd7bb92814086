// pipewright/src/report.rs

//! The formatted error record handed to error reporters.

use crate::error::{PipelineError, StepError};
use crate::pipeline::hooks::Failure;
use serde::Serialize;

/// Failure report for one pipeline run.
///
/// `message` names the pipeline, the blamed step and its index, followed by the
/// failure detail. Reporters receive this record by reference; the pipeline does
/// not keep it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedError {
  pub message: String,
  /// Stack of an exception-like failure, when one was captured.
  pub stack: Option<String>,
  pub request_id: Option<String>,
  pub inner: StepError,
}

impl FormattedError {
  pub fn new<C>(error: &PipelineError, failure: &Failure<'_, C>) -> Self {
    let inner = error.detail();
    let mut message = format!(
      "Pipeline Error - {}. Step - {}({})\n",
      failure.pipeline,
      failure.step_name.unwrap_or("<none>"),
      failure.current_step
    );
    append_detail(&mut message, &inner);

    let stack = match &inner {
      StepError::Exception { stack, .. } => stack.clone(),
      _ => None,
    };

    Self {
      message,
      stack,
      request_id: failure.results.request_id().map(str::to_string),
      inner,
    }
  }
}

/// Appends the failure detail to a report message.
///
/// Exceptions contribute their stack (nothing if none was captured), text
/// contributes itself, structured values their JSON, and an empty error nothing.
pub fn append_detail(message: &mut String, detail: &StepError) {
  match detail {
    StepError::Exception { stack, .. } => message.push_str(stack.as_deref().unwrap_or("")),
    StepError::Text(text) => message.push_str(text),
    StepError::Structured(value) => message.push_str(&value.to_string()),
    StepError::Empty => {}
  }
}
