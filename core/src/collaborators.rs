// pipewright/src/collaborators.rs

//! Contracts for the services a wired pipeline calls into, plus the defaults
//! used when the host application provides none.

use crate::core::context::ResponseHandle;
use crate::report::FormattedError;
use async_trait::async_trait;
use tracing::{event, Level};
use uuid::Uuid;

/// Counter sink. Shared by every pipeline of a factory, so implementations
/// must tolerate concurrent increments.
pub trait MetricsCollector: Send + Sync {
  fn increment(&self, counter: &str);
}

/// Turns a failure report into a response.
pub trait ErrorReporter<R: ResponseHandle>: Send + Sync {
  fn fail(&self, error: &FormattedError, res: &R);
}

/// A file the file server is asked to write to the response.
#[derive(Debug, Clone)]
pub struct FileRequest<R> {
  pub path: String,
  pub res: Option<R>,
}

#[async_trait]
pub trait FileServer<R: ResponseHandle>: Send + Sync {
  /// Serves `request.path`. `Ok(())` means the response has been written;
  /// any error means the file was not found or could not be served.
  async fn serve_file(&self, request: FileRequest<R>) -> anyhow::Result<()>;
}

/// Source of per-run correlation tokens.
pub trait TokenGenerator: Send + Sync {
  fn generate(&self) -> String;
}

/// Random v4 uuids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidTokens;

impl TokenGenerator for UuidTokens {
  fn generate(&self) -> String {
    Uuid::new_v4().to_string()
  }
}

/// Reporter used when the host application registers none. One instance is
/// created per factory and shared by all of its pipelines.
#[derive(Debug, Default)]
pub struct DefaultErrorReporter;

impl DefaultErrorReporter {
  pub const STATUS: u16 = 500;
}

impl<R: ResponseHandle> ErrorReporter<R> for DefaultErrorReporter {
  fn fail(&self, error: &FormattedError, res: &R) {
    event!(
      Level::ERROR,
      request_id = error.request_id.as_deref().unwrap_or("null"),
      "{}",
      error.message
    );
    res.send_error(Self::STATUS, &error.message);
  }
}
