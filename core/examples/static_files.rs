// pipewright/examples/static_files.rs

use async_trait::async_trait;
use pipewright::{
  FileRequest, FileServer, HostApp, PipelineError, PipelineFactory, PipelineOptions, PipelineResult, ResponseHandle,
  StaticRequest,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

// 1. A response handle that prints what would be written
#[derive(Clone, Debug, Default)]
struct ConsoleResponse;

impl ResponseHandle for ConsoleResponse {
  fn send_error(&self, status: u16, body: &str) {
    warn!("HTTP {}\n{}", status, body);
  }
}

// 2. A file server backed by an in-memory set of paths
struct MemoryFiles {
  files: HashSet<String>,
}

#[async_trait]
impl FileServer<ConsoleResponse> for MemoryFiles {
  async fn serve_file(&self, request: FileRequest<ConsoleResponse>) -> anyhow::Result<()> {
    if self.files.contains(&request.path) {
      info!("Served {}", request.path);
      Ok(())
    } else {
      anyhow::bail!("ENOENT: {}", request.path)
    }
  }
}

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Static File Pipeline Example ---");

  let files = MemoryFiles {
    files: ["/theme/site.css", "/public/app.js"].iter().map(|s| s.to_string()).collect(),
  };
  let app = HostApp::<ConsoleResponse>::new("site").with_file_server(Arc::new(files));
  let factory = PipelineFactory::attach(app, PipelineOptions::from_env()?)?;

  let locations = vec!["/theme".to_string(), "/public".to_string()];

  // 3. Found in the second location: probing stops there
  let pipeline = factory.pipelines().static_files()?;
  let result = pipeline
    .run(StaticRequest::new("/app.js", locations.clone(), ConsoleResponse).with_url("/static/app.js"))
    .await?;
  assert_eq!(result, PipelineResult::Stopped);
  info!("Steps: {:?}", pipeline.step_names());

  // 4. Found nowhere: the default reporter writes a 500
  let pipeline = factory.pipelines().static_files()?;
  match pipeline.run(StaticRequest::new("/missing.png", locations, ConsoleResponse)).await {
    Err(PipelineError::NotFound { path, .. }) => info!("Not found as expected: {}", path),
    other => warn!("Unexpected outcome: {:?}", other),
  }

  Ok(())
}
