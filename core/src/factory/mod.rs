// pipewright/src/factory/mod.rs

//! Top-level entry point: attach to a host application and get pipeline builders.

pub mod options;
pub mod standard;
pub mod static_files;

use crate::collaborators::{
  DefaultErrorReporter, ErrorReporter, FileServer, MetricsCollector, TokenGenerator, UuidTokens,
};
use crate::core::context::{RequestContext, ResponseHandle};
use crate::error::PipewrightResult;
use crate::pipeline::definition::Pipeline;
use options::PipelineOptions;
use standard::PipelineBuilder;
use static_files::{StaticPipelineBuilder, StaticRequest};
use std::sync::Arc;
use tracing::{event, Level};

/// The host application: an id used to namespace pipeline names, and the
/// optional collaborators pipelines call into.
pub struct HostApp<R: ResponseHandle> {
  pub id: String,
  pub metrics: Option<Arc<dyn MetricsCollector>>,
  pub error_reporter: Option<Arc<dyn ErrorReporter<R>>>,
  pub file_server: Option<Arc<dyn FileServer<R>>>,
  pub tokens: Option<Arc<dyn TokenGenerator>>,
}

impl<R: ResponseHandle> HostApp<R> {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      metrics: None,
      error_reporter: None,
      file_server: None,
      tokens: None,
    }
  }

  pub fn with_metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
    self.metrics = Some(metrics);
    self
  }

  pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter<R>>) -> Self {
    self.error_reporter = Some(reporter);
    self
  }

  pub fn with_file_server(mut self, file_server: Arc<dyn FileServer<R>>) -> Self {
    self.file_server = Some(file_server);
    self
  }

  pub fn with_tokens(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
    self.tokens = Some(tokens);
    self
  }
}

/// Builds bare standard pipelines under an application-supplied name.
pub struct GenericPipelineBuilder<R: ResponseHandle> {
  base: Arc<PipelineBuilder<R>>,
}

impl<R: ResponseHandle> GenericPipelineBuilder<R> {
  pub fn new(base: Arc<PipelineBuilder<R>>) -> Self {
    Self { base }
  }

  pub fn build<C>(&self, name: &str) -> Pipeline<C>
  where
    C: RequestContext<Response = R>,
  {
    self.base.new_pipeline(name)
  }
}

/// The `pipelines` namespace exposed by a factory.
pub struct Pipelines<R: ResponseHandle> {
  static_files: StaticPipelineBuilder<R>,
  generic: GenericPipelineBuilder<R>,
}

impl<R: ResponseHandle> Pipelines<R> {
  /// A pipeline serving `StaticRequest::path` from the first matching location.
  pub fn static_files(&self) -> PipewrightResult<Pipeline<StaticRequest<R>>> {
    self.static_files.build()
  }

  /// A pipeline with only the standard wiring; the caller appends its steps.
  pub fn generic<C>(&self, name: &str) -> Pipeline<C>
  where
    C: RequestContext<Response = R>,
  {
    self.generic.build(name)
  }
}

pub struct PipelineFactory<R: ResponseHandle> {
  options: PipelineOptions,
  pipelines: Pipelines<R>,
}

impl<R: ResponseHandle> PipelineFactory<R> {
  /// Attaches to `app`. The factory owns one local error reporter, used by
  /// every pipeline it builds when the app registers none.
  ///
  /// Fails with `PipelineError::Configuration` when `options` carries a zero timeout.
  pub fn attach(app: HostApp<R>, options: PipelineOptions) -> PipewrightResult<Self> {
    let options = options.validate()?;
    event!(
      Level::DEBUG,
      app_id = %app.id,
      timeout_ms = options.timeout,
      metrics = app.metrics.is_some(),
      app_error_reporter = app.error_reporter.is_some(),
      file_server = app.file_server.is_some(),
      "Attaching pipeline factory."
    );

    let local_reporter: Arc<dyn ErrorReporter<R>> = Arc::new(DefaultErrorReporter);
    let tokens = app
      .tokens
      .unwrap_or_else(|| Arc::new(UuidTokens) as Arc<dyn TokenGenerator>);
    let base = Arc::new(PipelineBuilder::new(
      app.id,
      options.timeout_duration(),
      app.metrics,
      app.error_reporter,
      local_reporter,
      tokens,
    ));

    Ok(Self {
      options,
      pipelines: Pipelines {
        static_files: StaticPipelineBuilder::new(Arc::clone(&base), app.file_server),
        generic: GenericPipelineBuilder::new(base),
      },
    })
  }

  pub fn pipelines(&self) -> &Pipelines<R> {
    &self.pipelines
  }

  pub fn options(&self) -> &PipelineOptions {
    &self.options
  }
}
