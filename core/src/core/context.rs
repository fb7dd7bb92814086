// pipewright/src/core/context.rs

//! Traits describing the initial request context handed to `Pipeline::run`
//! and the response handle it may carry.

/// A handle through which an error response can be written.
///
/// The engine never writes to it directly. It is passed to the error reporter
/// and to the file server, which own the response semantics.
pub trait ResponseHandle: Clone + Send + Sync + 'static {
  /// Writes a terminal error response.
  fn send_error(&self, status: u16, body: &str);
}

/// The value seeded as results entry 0.
pub trait RequestContext: Send + Sync + 'static {
  type Response: ResponseHandle;

  /// The response handle, if this request can still be answered.
  /// Without one, failures are logged but never reported.
  fn response(&self) -> Option<&Self::Response>;

  /// Request URL recorded in the run metadata.
  fn url(&self) -> Option<&str> {
    None
  }
}
