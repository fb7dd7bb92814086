// src/lib.rs

//! Pipewright: a per-request middleware pipeline engine for Rust.
//!
//! A pipeline is an ordered, growable list of async steps run once against a
//! request context, with:
//!  - Strictly sequential steps, each seeing the results accumulated so far.
//!  - Mid-pipeline short-circuiting via `stop()`.
//!  - Steps appended at runtime, including by a running step.
//!  - A whole-run timeout backstop.
//!  - `step` and `error` observers, with failures attributed to a step.
//!  - A factory producing pre-wired pipelines: correlation metadata, per-step
//!    logging, error counting and error reporting, plus a static-file pipeline
//!    that probes a list of locations.

pub mod collaborators;
pub mod core;
pub mod error;
pub mod factory;
pub mod pipeline;
pub mod report;

// --- Re-exports for the Public API ---

pub use crate::core::context::{RequestContext, ResponseHandle};
pub use crate::core::control::PipelineResult;
pub use crate::core::results::{Entry, Results, RunMeta};
pub use crate::core::step::{Handler, StepContext, StepDef, StepResult};

pub use crate::pipeline::definition::{Pipeline, DEFAULT_TIMEOUT};
pub use crate::pipeline::hooks::{Failure, StepEvent};

pub use crate::error::{PipelineError, PipewrightResult, StepError};
pub use crate::report::FormattedError;

pub use crate::collaborators::{
  DefaultErrorReporter, ErrorReporter, FileRequest, FileServer, MetricsCollector, TokenGenerator, UuidTokens,
};

pub use crate::factory::options::PipelineOptions;
pub use crate::factory::standard::PipelineBuilder;
pub use crate::factory::static_files::{StaticPipelineBuilder, StaticRequest};
pub use crate::factory::{GenericPipelineBuilder, HostApp, PipelineFactory, Pipelines};

/*
    Typical use, per incoming request:
    1. At startup, `PipelineFactory::attach(HostApp::new("site").with_file_server(..), options)?`.
    2. Per request, `factory.pipelines().static_files()?` or `.generic::<MyCtx>("checkout")`.
    3. Append application steps with `use_step(label, |ctx| async move { .. })`.
    4. `pipeline.run(initial_context).await`. Failures have already been counted,
       logged and reported by the time `run` returns them.
*/
