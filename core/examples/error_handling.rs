// pipewright/examples/error_handling.rs

use pipewright::{
  FormattedError, ErrorReporter, HostApp, MetricsCollector, PipelineError, PipelineFactory, PipelineOptions,
  RequestContext, ResponseHandle, StepContext,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Clone, Debug, Default)]
struct ConsoleResponse;

impl ResponseHandle for ConsoleResponse {
  fn send_error(&self, status: u16, body: &str) {
    info!("HTTP {}: {}", status, body);
  }
}

#[derive(Debug)]
struct ApiRequest {
  res: ConsoleResponse,
}

impl RequestContext for ApiRequest {
  type Response = ConsoleResponse;

  fn response(&self) -> Option<&ConsoleResponse> {
    Some(&self.res)
  }
}

struct LogMetrics;

impl MetricsCollector for LogMetrics {
  fn increment(&self, counter: &str) {
    info!("metric++ {}", counter);
  }
}

/// Renders failures as a JSON problem document.
struct JsonReporter;

impl ErrorReporter<ConsoleResponse> for JsonReporter {
  fn fail(&self, error: &FormattedError, res: &ConsoleResponse) {
    match serde_json::to_string(error) {
      Ok(body) => res.send_error(502, &body),
      Err(e) => error!("Could not encode failure report: {}", e),
    }
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Error Handling Example ---");

  let app = HostApp::<ConsoleResponse>::new("api")
    .with_metrics(Arc::new(LogMetrics))
    .with_error_reporter(Arc::new(JsonReporter));
  let options = PipelineOptions::default().with_timeout(Duration::from_millis(200));
  let factory = match PipelineFactory::attach(app, options) {
    Ok(factory) => factory,
    Err(e) => {
      error!("Could not attach pipeline factory: {}", e);
      return;
    }
  };

  // 1. A step returning structured error data
  let pipeline = factory.pipelines().generic::<ApiRequest>("inventory");
  pipeline.use_step("reserve", |_ctx: StepContext<ApiRequest>| async move {
    Err(PipelineError::from(json!({ "sku": "A-1", "reason": "out of stock" })))
  });
  if let Err(e) = pipeline.run(ApiRequest { res: ConsoleResponse }).await {
    info!("inventory failed: {}", e);
  }

  // 2. A step that never finishes is cut off by the timeout
  let pipeline = factory.pipelines().generic::<ApiRequest>("upstream");
  pipeline.use_step("call upstream", |_ctx: StepContext<ApiRequest>| async move {
    tokio::time::sleep(Duration::from_secs(10)).await;
    Ok(None)
  });
  match pipeline.run(ApiRequest { res: ConsoleResponse }).await {
    Err(e) if e.is_timeout() => info!("upstream timed out: {}", e),
    other => error!("Unexpected outcome: {:?}", other),
  }
}
