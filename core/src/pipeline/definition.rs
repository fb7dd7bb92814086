// pipewright/src/pipeline/definition.rs

//! Contains the `Pipeline<C>` struct, its construction and the operations a
//! running step may perform on it (appending steps, stopping).

use crate::core::results::{Entry, Results};
use crate::core::step::{Handler, StepContext, StepDef, StepResult};
use crate::pipeline::hooks::{ErrorListener, StepListener};
use parking_lot::{Mutex, RwLock};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{event, Level};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Mutable execution state of the single run a pipeline performs.
pub(crate) struct RunState<C> {
  /// Index of the step most recently entered. Never decreases.
  pub(crate) current_step: usize,
  pub(crate) stopped: bool,
  pub(crate) context: Option<Arc<C>>,
  pub(crate) entries: Vec<Entry>,
}

pub(crate) struct Inner<C: Send + Sync + 'static> {
  pub(crate) name: String,
  pub(crate) timeout: RwLock<Duration>,
  /// Growable step list. The engine reads its length at every decision point.
  pub(crate) steps: RwLock<Vec<StepDef<C>>>,
  pub(crate) step_listeners: RwLock<Vec<StepListener<C>>>,
  pub(crate) error_listeners: RwLock<Vec<ErrorListener<C>>>,
  pub(crate) state: Mutex<RunState<C>>,
  pub(crate) started: AtomicBool,
}

/// An ordered, growable sequence of steps run once against a request context.
///
/// `Pipeline` is a cheap handle: clones share the same steps and run state.
/// A fresh instance must be created for every request; `run` refuses to start
/// twice.
pub struct Pipeline<C: Send + Sync + 'static> {
  pub(crate) inner: Arc<Inner<C>>,
}

impl<C: Send + Sync + 'static> Clone for Pipeline<C> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<C: Send + Sync + 'static> std::fmt::Debug for Pipeline<C> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Pipeline")
      .field("name", &self.inner.name)
      .field("timeout", &self.timeout())
      .field("steps", &self.step_names())
      .field("current_step", &self.current_step())
      .field("stopped", &self.is_stopped())
      .finish()
  }
}

impl<C: Send + Sync + 'static> Pipeline<C> {
  /// Creates an empty pipeline with the default 60s timeout.
  pub fn create(name: impl Into<String>) -> Self {
    Self {
      inner: Arc::new(Inner {
        name: name.into(),
        timeout: RwLock::new(DEFAULT_TIMEOUT),
        steps: RwLock::new(Vec::new()),
        step_listeners: RwLock::new(Vec::new()),
        error_listeners: RwLock::new(Vec::new()),
        state: Mutex::new(RunState {
          current_step: 0,
          stopped: false,
          context: None,
          entries: Vec::new(),
        }),
        started: AtomicBool::new(false),
      }),
    }
  }

  pub fn with_timeout(self, timeout: Duration) -> Self {
    self.set_timeout(timeout);
    self
  }

  /// Changes the run timeout. Only effective before `run`.
  pub fn set_timeout(&self, timeout: Duration) {
    *self.inner.timeout.write() = timeout;
  }

  pub fn name(&self) -> &str {
    &self.inner.name
  }

  pub fn timeout(&self) -> Duration {
    *self.inner.timeout.read()
  }

  /// Appends a named step. Returns `self` for chaining.
  ///
  /// May be called while the pipeline is running, including from inside a
  /// step; the new step is entered once sequencing reaches its index.
  pub fn use_step<F, Fut>(&self, label: impl Into<String>, handler_fn: F) -> &Self
  where
    F: Fn(StepContext<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = StepResult> + Send + 'static,
  {
    let handler: Handler<C> = Arc::new(
      move |ctx: StepContext<C>| -> Pin<Box<dyn Future<Output = StepResult> + Send>> { Box::pin(handler_fn(ctx)) },
    );
    let name = label.into();
    let mut steps = self.inner.steps.write();
    event!(Level::TRACE, pipeline = %self.inner.name, step = %name, index = steps.len(), "Step appended.");
    steps.push(StepDef { name, handler });
    self
  }

  /// Appends a step without a label. It is reported as `step <index>`.
  pub fn use_unnamed<F, Fut>(&self, handler_fn: F) -> &Self
  where
    F: Fn(StepContext<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = StepResult> + Send + 'static,
  {
    let label = format!("step {}", self.step_count());
    self.use_step(label, handler_fn)
  }

  /// Prevents the next step from being entered once the current step advances.
  /// The current step itself runs to completion.
  pub fn stop(&self) -> &Self {
    let mut state = self.inner.state.lock();
    if !state.stopped {
      event!(Level::DEBUG, pipeline = %self.inner.name, current_step = state.current_step, "Stop requested.");
    }
    state.stopped = true;
    self
  }

  pub fn is_stopped(&self) -> bool {
    self.inner.state.lock().stopped
  }

  pub fn current_step(&self) -> usize {
    self.inner.state.lock().current_step
  }

  pub fn step_count(&self) -> usize {
    self.inner.steps.read().len()
  }

  pub fn step_names(&self) -> Vec<String> {
    self.inner.steps.read().iter().map(|s| s.name.clone()).collect()
  }

  /// Results of the run so far, or `None` before `run` was called.
  pub fn results(&self) -> Option<Results<C>> {
    let state = self.inner.state.lock();
    state
      .context
      .as_ref()
      .map(|context| Results::new(Arc::clone(context), state.entries.clone()))
  }

  /// Name of the step to blame for a failure: the step at `current_step` when
  /// that is a valid index, otherwise the last step.
  pub(crate) fn blamed_step(&self, current_step: usize) -> Option<String> {
    let steps = self.inner.steps.read();
    steps.get(current_step).or_else(|| steps.last()).map(|s| s.name.clone())
  }
}
