// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use async_trait::async_trait;
use parking_lot::Mutex;
use pipewright::{
  Entry, ErrorReporter, FileRequest, FileServer, FormattedError, MetricsCollector, Pipeline, RequestContext,
  ResponseHandle, StepContext, StepResult, TokenGenerator,
};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::Level;

// --- Response handle that records what was written ---
#[derive(Clone, Debug, Default)]
pub struct RecordingResponse {
  sent: Arc<Mutex<Vec<(u16, String)>>>,
  served: Arc<Mutex<Vec<String>>>,
}

impl RecordingResponse {
  pub fn sent(&self) -> Vec<(u16, String)> {
    self.sent.lock().clone()
  }

  pub fn served(&self) -> Vec<String> {
    self.served.lock().clone()
  }

  pub fn serve(&self, path: &str) {
    self.served.lock().push(path.to_string());
  }
}

impl ResponseHandle for RecordingResponse {
  fn send_error(&self, status: u16, body: &str) {
    self.sent.lock().push((status, body.to_string()));
  }
}

// --- Common Context ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub res: Option<RecordingResponse>,
  pub url: Option<String>,
}

impl TestContext {
  pub fn with_response(res: &RecordingResponse) -> Self {
    Self {
      res: Some(res.clone()),
      url: None,
    }
  }
}

impl RequestContext for TestContext {
  type Response = RecordingResponse;

  fn response(&self) -> Option<&RecordingResponse> {
    self.res.as_ref()
  }

  fn url(&self) -> Option<&str> {
    self.url.as_deref()
  }
}

// --- Collaborator fakes ---
#[derive(Default)]
pub struct RecordingReporter {
  pub reports: Mutex<Vec<FormattedError>>,
}

impl RecordingReporter {
  pub fn reports(&self) -> Vec<FormattedError> {
    self.reports.lock().clone()
  }
}

impl ErrorReporter<RecordingResponse> for RecordingReporter {
  fn fail(&self, error: &FormattedError, _res: &RecordingResponse) {
    self.reports.lock().push(error.clone());
  }
}

#[derive(Default)]
pub struct RecordingMetrics {
  pub counters: Mutex<Vec<String>>,
}

impl RecordingMetrics {
  pub fn counters(&self) -> Vec<String> {
    self.counters.lock().clone()
  }
}

impl MetricsCollector for RecordingMetrics {
  fn increment(&self, counter: &str) {
    self.counters.lock().push(counter.to_string());
  }
}

/// Serves only the paths it was built with and records every attempt.
#[derive(Default)]
pub struct FakeFileServer {
  existing: HashSet<String>,
  pub attempts: Mutex<Vec<String>>,
}

impl FakeFileServer {
  pub fn with_files(paths: &[&str]) -> Self {
    Self {
      existing: paths.iter().map(|p| p.to_string()).collect(),
      attempts: Mutex::new(Vec::new()),
    }
  }

  pub fn attempts(&self) -> Vec<String> {
    self.attempts.lock().clone()
  }
}

#[async_trait]
impl FileServer<RecordingResponse> for FakeFileServer {
  async fn serve_file(&self, request: FileRequest<RecordingResponse>) -> anyhow::Result<()> {
    self.attempts.lock().push(request.path.clone());
    if !self.existing.contains(&request.path) {
      anyhow::bail!("ENOENT: {}", request.path);
    }
    if let Some(res) = &request.res {
      res.serve(&request.path);
    }
    Ok(())
  }
}

/// Deterministic tokens: req-1, req-2, ...
#[derive(Default)]
pub struct SequentialTokens(AtomicUsize);

impl TokenGenerator for SequentialTokens {
  fn generate(&self) -> String {
    format!("req-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
  }
}

// --- Step log helpers ---
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
  Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
  log.lock().clone()
}

pub type BoxedStep = Pin<Box<dyn Future<Output = StepResult> + Send>>;

/// Records `run <name>` and advances with `value` as its entry.
pub fn value_step<C: Send + Sync + 'static>(
  log: &Log,
  name: &'static str,
  value: serde_json::Value,
) -> impl Fn(StepContext<C>) -> BoxedStep + Send + Sync + 'static {
  let log = Arc::clone(log);
  move |_ctx: StepContext<C>| -> BoxedStep {
    log.lock().push(format!("run {}", name));
    let value = value.clone();
    Box::pin(async move { Ok(Some(Entry::Value(value))) })
  }
}

/// Records `run <name>` and advances without an entry.
pub fn plain_step<C: Send + Sync + 'static>(
  log: &Log,
  name: &'static str,
) -> impl Fn(StepContext<C>) -> BoxedStep + Send + Sync + 'static {
  let log = Arc::clone(log);
  move |_ctx: StepContext<C>| -> BoxedStep {
    log.lock().push(format!("run {}", name));
    Box::pin(async move { Ok(None) })
  }
}

/// Records `enter <step>` for every `step` event.
pub fn record_step_events<C: Send + Sync + 'static>(pipeline: &Pipeline<C>, log: &Log) {
  let log = Arc::clone(log);
  pipeline.on_step(move |event, _results| {
    log.lock().push(format!("enter {}", event.step_name));
  });
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
