// pipewright/src/core/results.rs

//! The append-only results sequence of a pipeline run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Correlation metadata created once per run by the first wired step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunMeta {
  pub request_id: String,
  pub start: DateTime<Utc>,
  pub url: Option<String>,
}

/// A result appended by a step when it advances.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Entry {
  Meta(RunMeta),
  Value(serde_json::Value),
}

impl Entry {
  pub fn as_meta(&self) -> Option<&RunMeta> {
    match self {
      Entry::Meta(meta) => Some(meta),
      Entry::Value(_) => None,
    }
  }

  pub fn as_value(&self) -> Option<&serde_json::Value> {
    match self {
      Entry::Value(value) => Some(value),
      Entry::Meta(_) => None,
    }
  }
}

impl From<RunMeta> for Entry {
  fn from(meta: RunMeta) -> Self {
    Entry::Meta(meta)
  }
}

impl From<serde_json::Value> for Entry {
  fn from(value: serde_json::Value) -> Self {
    Entry::Value(value)
  }
}

/// Snapshot of the results sequence.
///
/// Index 0 is the initial context. Index 1 is, for wired pipelines, the
/// [`RunMeta`] record. Every later index holds the entry of one advancing step,
/// in insertion order.
#[derive(Debug)]
pub struct Results<C> {
  context: Arc<C>,
  entries: Vec<Entry>,
}

impl<C> Clone for Results<C> {
  fn clone(&self) -> Self {
    Self {
      context: Arc::clone(&self.context),
      entries: self.entries.clone(),
    }
  }
}

impl<C> Results<C> {
  pub(crate) fn new(context: Arc<C>, entries: Vec<Entry>) -> Self {
    Self { context, entries }
  }

  /// Results entry 0.
  pub fn context(&self) -> &C {
    &self.context
  }

  /// Entries appended by steps, starting at results index 1.
  pub fn entries(&self) -> &[Entry] {
    &self.entries
  }

  /// Entry at results index `index`; index 0 is the context and yields `None`.
  pub fn entry(&self, index: usize) -> Option<&Entry> {
    index.checked_sub(1).and_then(|i| self.entries.get(i))
  }

  /// Number of results, counting the context.
  pub fn len(&self) -> usize {
    self.entries.len() + 1
  }

  pub fn meta(&self) -> Option<&RunMeta> {
    self.entry(1).and_then(Entry::as_meta)
  }

  pub fn request_id(&self) -> Option<&str> {
    self.meta().map(|meta| meta.request_id.as_str())
  }
}
