// pipewright/src/factory/standard.rs

//! The standard wiring every factory-built pipeline gets: timeout, error
//! routing, the request-metadata step and per-step logging.

use crate::collaborators::{ErrorReporter, MetricsCollector, TokenGenerator};
use crate::core::context::{RequestContext, ResponseHandle};
use crate::core::results::{Entry, RunMeta};
use crate::core::step::StepContext;
use crate::error::PipelineError;
use crate::pipeline::definition::Pipeline;
use crate::pipeline::hooks::Failure;
use crate::report::FormattedError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{event, Level};

/// Label of step 0, which records the run metadata.
pub const METADATA_STEP: &str = "Register Error Handling";

/// Prefix of the per-pipeline error counter.
pub const ERROR_COUNTER_PREFIX: &str = "pipeline-error-";

/// Builds pipelines carrying the standard wiring. Collaborators are resolved
/// once, when the builder is constructed.
pub struct PipelineBuilder<R: ResponseHandle> {
  app_id: String,
  timeout: Duration,
  metrics: Option<Arc<dyn MetricsCollector>>,
  reporter: Arc<dyn ErrorReporter<R>>,
  tokens: Arc<dyn TokenGenerator>,
}

impl<R: ResponseHandle> PipelineBuilder<R> {
  /// `app_reporter` wins over `local_reporter` when both are present.
  pub fn new(
    app_id: impl Into<String>,
    timeout: Duration,
    metrics: Option<Arc<dyn MetricsCollector>>,
    app_reporter: Option<Arc<dyn ErrorReporter<R>>>,
    local_reporter: Arc<dyn ErrorReporter<R>>,
    tokens: Arc<dyn TokenGenerator>,
  ) -> Self {
    Self {
      app_id: app_id.into(),
      timeout,
      metrics,
      reporter: app_reporter.unwrap_or(local_reporter),
      tokens,
    }
  }

  pub fn timeout(&self) -> Duration {
    self.timeout
  }

  /// Full pipeline name for a logical name: `<app id>-<name>`.
  pub fn pipeline_name(&self, name: &str) -> String {
    format!("{}-{}", self.app_id, name)
  }

  /// Creates a pipeline whose only step is the metadata step.
  pub fn new_pipeline<C>(&self, name: &str) -> Pipeline<C>
  where
    C: RequestContext<Response = R>,
  {
    let pipeline = Pipeline::<C>::create(self.pipeline_name(name)).with_timeout(self.timeout);

    let metrics = self.metrics.clone();
    let reporter = Arc::clone(&self.reporter);
    pipeline.on_error(move |error, failure| {
      route_failure(error, failure, metrics.as_deref(), reporter.as_ref());
    });

    let tokens = Arc::clone(&self.tokens);
    pipeline.use_step(METADATA_STEP, move |ctx: StepContext<C>| {
      let meta = RunMeta {
        request_id: tokens.generate(),
        start: Utc::now(),
        url: ctx.results.context().url().map(str::to_string),
      };
      async move {
        event!(Level::INFO, request_id = %meta.request_id, "Pipeline Start: {:?}", meta);
        Ok(Some(Entry::Meta(meta)))
      }
    });

    pipeline.on_step(|step, results| {
      event!(
        Level::INFO,
        "{}: {}: {}",
        step.pipeline,
        step.step_name,
        results.request_id().unwrap_or("null")
      );
    });

    pipeline
  }
}

/// Counts, logs and, when the request can still be answered, reports a failure.
fn route_failure<C, R>(
  error: &PipelineError,
  failure: &Failure<'_, C>,
  metrics: Option<&dyn MetricsCollector>,
  reporter: &dyn ErrorReporter<R>,
) where
  C: RequestContext<Response = R>,
  R: ResponseHandle,
{
  if let Some(metrics) = metrics {
    metrics.increment(&format!("{}{}", ERROR_COUNTER_PREFIX, failure.pipeline));
  }

  event!(
    Level::ERROR,
    pipeline = failure.pipeline,
    step = failure.step_name.unwrap_or("<none>"),
    current_step = failure.current_step,
    request_id = failure.results.request_id().unwrap_or("null"),
    error = ?error,
    "Pipeline error."
  );

  match failure.results.context().response() {
    Some(res) => {
      let record = FormattedError::new(error, failure);
      reporter.fail(&record, res);
    }
    None => event!(Level::DEBUG, pipeline = failure.pipeline, "No response handle; failure not reported."),
  }
}
