// pipewright/src/error.rs
use anyhow::Error as AnyhowError;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The value a step fails with.
///
/// Mirrors what callers hand to a continuation in callback-style pipelines:
/// an exception-like error, a bare message, an arbitrary structured value,
/// or nothing at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StepError {
  Exception { message: String, stack: Option<String> },
  Text(String),
  Structured(serde_json::Value),
  Empty,
}

impl StepError {
  pub fn exception(message: impl Into<String>, stack: Option<String>) -> Self {
    StepError::Exception {
      message: message.into(),
      stack,
    }
  }

  /// Serializes `value` into a structured error. Falls back to a text error
  /// holding the serializer's complaint if `value` cannot be represented as JSON.
  pub fn structured<T: Serialize>(value: &T) -> Self {
    match serde_json::to_value(value) {
      Ok(json) => json.into(),
      Err(e) => StepError::Text(format!("unserializable step error: {}", e)),
    }
  }

  pub fn is_empty(&self) -> bool {
    matches!(self, StepError::Empty)
  }
}

impl fmt::Display for StepError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StepError::Exception { message, .. } => f.write_str(message),
      StepError::Text(text) => f.write_str(text),
      StepError::Structured(value) => write!(f, "{}", value),
      StepError::Empty => f.write_str("step failed without detail"),
    }
  }
}

impl From<AnyhowError> for StepError {
  fn from(err: AnyhowError) -> Self {
    // `{:?}` on anyhow prints the cause chain, and the backtrace when captured.
    StepError::Exception {
      message: err.to_string(),
      stack: Some(format!("{:?}", err)),
    }
  }
}

impl From<&str> for StepError {
  fn from(text: &str) -> Self {
    StepError::Text(text.to_string())
  }
}

impl From<String> for StepError {
  fn from(text: String) -> Self {
    StepError::Text(text)
  }
}

impl From<serde_json::Value> for StepError {
  fn from(value: serde_json::Value) -> Self {
    if value.is_null() {
      StepError::Empty
    } else {
      StepError::Structured(value)
    }
  }
}

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Step failed: {0}")]
  Step(StepError),

  #[error("Pipeline '{pipeline}' timed out after {}ms", .after.as_millis())]
  Timeout { pipeline: String, after: Duration },

  #[error("Could not find file \"{path}\" in these locations {}", locations_json(.locations))]
  NotFound { path: String, locations: Vec<String> },

  #[error("Pipeline '{pipeline}' has already been started")]
  AlreadyStarted { pipeline: String },

  #[error("Configuration error: {message}")]
  Configuration { message: String },
}

impl PipelineError {
  /// The failure as the polymorphic value the error formatter works on.
  pub fn detail(&self) -> StepError {
    match self {
      PipelineError::Step(inner) => inner.clone(),
      PipelineError::NotFound { .. } => StepError::Text(self.to_string()),
      other => StepError::Exception {
        message: other.to_string(),
        stack: Some(format!("PipelineError: {}", other)),
      },
    }
  }

  pub fn is_timeout(&self) -> bool {
    matches!(self, PipelineError::Timeout { .. })
  }
}

impl From<StepError> for PipelineError {
  fn from(err: StepError) -> Self {
    PipelineError::Step(err)
  }
}

impl From<AnyhowError> for PipelineError {
  fn from(err: AnyhowError) -> Self {
    // An anyhow error already wrapping a PipelineError keeps its kind.
    match err.downcast::<PipelineError>() {
      Ok(pipeline_err) => pipeline_err,
      Err(err) => PipelineError::Step(StepError::from(err)),
    }
  }
}

impl From<&str> for PipelineError {
  fn from(text: &str) -> Self {
    PipelineError::Step(text.into())
  }
}

impl From<String> for PipelineError {
  fn from(text: String) -> Self {
    PipelineError::Step(text.into())
  }
}

impl From<serde_json::Value> for PipelineError {
  fn from(value: serde_json::Value) -> Self {
    PipelineError::Step(value.into())
  }
}

pub(crate) fn locations_json(locations: &[String]) -> String {
  serde_json::to_string(locations).unwrap_or_else(|_| format!("{:?}", locations))
}

pub type PipewrightResult<T, E = PipelineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn null_json_is_empty() {
    assert_eq!(StepError::from(json!(null)), StepError::Empty);
    assert_eq!(StepError::from(json!({"code": 7})), StepError::Structured(json!({"code": 7})));
  }

  #[test]
  fn not_found_lists_path_and_locations() {
    let err = PipelineError::NotFound {
      path: "/x.txt".into(),
      locations: vec!["/a".into(), "/b".into()],
    };
    assert_eq!(
      err.to_string(),
      r#"Could not find file "/x.txt" in these locations ["/a","/b"]"#
    );
    assert_eq!(err.detail(), StepError::Text(err.to_string()));
  }

  #[test]
  fn anyhow_wrapping_pipeline_error_keeps_kind() {
    let wrapped = anyhow::Error::new(PipelineError::Configuration {
      message: "no file server".into(),
    });
    assert!(matches!(PipelineError::from(wrapped), PipelineError::Configuration { .. }));
  }

  #[test]
  fn anyhow_error_becomes_exception_with_chain() {
    let err = anyhow::anyhow!("disk unplugged").context("reading /a/x.txt");
    match StepError::from(err) {
      StepError::Exception { message, stack } => {
        assert_eq!(message, "reading /a/x.txt");
        assert!(stack.unwrap().contains("disk unplugged"));
      }
      other => panic!("Expected exception, got {:?}", other),
    }
  }

  #[test]
  fn timeout_detail_is_exception_with_stack() {
    let err = PipelineError::Timeout {
      pipeline: "app-x".into(),
      after: Duration::from_millis(50),
    };
    match err.detail() {
      StepError::Exception { message, stack } => {
        assert_eq!(message, "Pipeline 'app-x' timed out after 50ms");
        assert!(stack.is_some());
      }
      other => panic!("Expected exception, got {:?}", other),
    }
  }
}
