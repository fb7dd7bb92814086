// pipewright/src/factory/static_files.rs

//! Static-file pipelines: try a request path under each candidate location in
//! turn, serve the first hit and fail with a not-found error otherwise.

use crate::collaborators::{FileRequest, FileServer};
use crate::core::context::{RequestContext, ResponseHandle};
use crate::core::step::StepContext;
use crate::error::{PipelineError, PipewrightResult};
use crate::factory::standard::PipelineBuilder;
use crate::pipeline::definition::Pipeline;
use std::sync::Arc;
use tracing::{event, Level};

pub const STATIC_PIPELINE_NAME: &str = "Static File";
pub const RESOLVE_STEP: &str = "Resolve File path";
pub const NOT_FOUND_STEP: &str = "Error check step";

/// Initial context of a static-file pipeline.
#[derive(Debug, Clone)]
pub struct StaticRequest<R> {
  /// Requested path, appended verbatim to each location.
  pub path: String,
  /// Candidate base locations, tried in order.
  pub locations: Vec<String>,
  pub res: Option<R>,
  pub url: Option<String>,
}

impl<R> StaticRequest<R> {
  pub fn new(path: impl Into<String>, locations: Vec<String>, res: R) -> Self {
    Self {
      path: path.into(),
      locations,
      res: Some(res),
      url: None,
    }
  }

  pub fn with_url(mut self, url: impl Into<String>) -> Self {
    self.url = Some(url.into());
    self
  }
}

impl<R: ResponseHandle> RequestContext for StaticRequest<R> {
  type Response = R;

  fn response(&self) -> Option<&R> {
    self.res.as_ref()
  }

  fn url(&self) -> Option<&str> {
    self.url.as_deref()
  }
}

pub struct StaticPipelineBuilder<R: ResponseHandle> {
  base: Arc<PipelineBuilder<R>>,
  file_server: Option<Arc<dyn FileServer<R>>>,
}

impl<R: ResponseHandle> StaticPipelineBuilder<R> {
  pub fn new(base: Arc<PipelineBuilder<R>>, file_server: Option<Arc<dyn FileServer<R>>>) -> Self {
    Self { base, file_server }
  }

  /// Builds a standard pipeline plus the resolve step. The probing steps and
  /// the not-found step are appended by the resolve step once the request's
  /// locations are known.
  pub fn build(&self) -> PipewrightResult<Pipeline<StaticRequest<R>>> {
    let file_server = self.file_server.clone().ok_or_else(|| PipelineError::Configuration {
      message: "static file pipelines need a file server".to_string(),
    })?;

    let pipeline = self.base.new_pipeline::<StaticRequest<R>>(STATIC_PIPELINE_NAME);
    pipeline.use_step(RESOLVE_STEP, move |ctx: StepContext<StaticRequest<R>>| {
      append_location_steps(&ctx, &file_server);
      async move { Ok(None) }
    });
    Ok(pipeline)
  }
}

/// Appends one probing step per location, then the not-found step.
fn append_location_steps<R: ResponseHandle>(ctx: &StepContext<StaticRequest<R>>, file_server: &Arc<dyn FileServer<R>>) {
  let request = ctx.results.context();
  event!(
    Level::DEBUG,
    path = %request.path,
    locations = request.locations.len(),
    "Resolving static file."
  );

  for location in &request.locations {
    let candidate = format!("{}{}", location, request.path);
    let server = Arc::clone(file_server);
    let res = request.res.clone();

    ctx
      .pipeline
      .use_step(format!("Try {}", location), move |step: StepContext<StaticRequest<R>>| {
        let server = Arc::clone(&server);
        let file = FileRequest {
          path: candidate.clone(),
          res: res.clone(),
        };
        async move {
          match server.serve_file(file).await {
            Ok(()) => {
              event!(Level::DEBUG, path = %step.results.context().path, "File served; stopping pipeline.");
              // The response is written; stop before advancing so nothing else runs.
              step.pipeline.stop();
            }
            Err(e) => {
              event!(Level::DEBUG, error = %e, "Location miss, trying next.");
            }
          }
          Ok(None)
        }
      });
  }

  let path = request.path.clone();
  let locations = request.locations.clone();
  ctx.pipeline.use_step(NOT_FOUND_STEP, move |_: StepContext<StaticRequest<R>>| {
    let error = PipelineError::NotFound {
      path: path.clone(),
      locations: locations.clone(),
    };
    async move { Err(error) }
  });
}
