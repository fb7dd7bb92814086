// pipewright/src/factory/options.rs

use crate::error::{PipelineError, PipewrightResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Environment variable read by [`PipelineOptions::from_env`].
pub const TIMEOUT_ENV: &str = "PIPELINE_TIMEOUT_MS";

const DEFAULT_TIMEOUT_MS: u64 = 60_000;

fn default_timeout_ms() -> u64 {
  DEFAULT_TIMEOUT_MS
}

/// Factory options. `timeout` is in milliseconds; every other key is kept in
/// `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
  #[serde(default = "default_timeout_ms")]
  pub timeout: u64,

  #[serde(flatten)]
  pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for PipelineOptions {
  fn default() -> Self {
    Self {
      timeout: DEFAULT_TIMEOUT_MS,
      extra: serde_json::Map::new(),
    }
  }
}

impl PipelineOptions {
  /// Sets the timeout, saturating at `u64::MAX` milliseconds.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    self
  }

  pub fn timeout_duration(&self) -> Duration {
    Duration::from_millis(self.timeout)
  }

  pub fn from_value(value: serde_json::Value) -> PipewrightResult<Self> {
    let options: Self = serde_json::from_value(value).map_err(|e| PipelineError::Configuration {
      message: format!("Invalid pipeline options: {}", e),
    })?;
    options.validate()
  }

  /// Reads the timeout from `PIPELINE_TIMEOUT_MS`, loading a `.env` file first
  /// if one is present. A missing variable keeps the default.
  pub fn from_env() -> PipewrightResult<Self> {
    dotenvy::dotenv().ok();

    let timeout = match env::var(TIMEOUT_ENV) {
      Ok(raw) => raw.trim().parse::<u64>().map_err(|e| PipelineError::Configuration {
        message: format!("Invalid {} value '{}': {}", TIMEOUT_ENV, raw, e),
      })?,
      Err(_) => DEFAULT_TIMEOUT_MS,
    };

    tracing::debug!(timeout_ms = timeout, "Pipeline options loaded from environment.");
    Self {
      timeout,
      ..Self::default()
    }
    .validate()
  }

  pub(crate) fn validate(self) -> PipewrightResult<Self> {
    if self.timeout == 0 {
      return Err(PipelineError::Configuration {
        message: "Pipeline timeout must be greater than zero".to_string(),
      });
    }
    Ok(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn defaults_to_sixty_seconds() {
    let options = PipelineOptions::default();
    assert_eq!(options.timeout_duration(), Duration::from_secs(60));
    assert!(options.extra.is_empty());
  }

  #[test]
  fn unknown_keys_are_passed_through() {
    let options = PipelineOptions::from_value(json!({"timeout": 250, "cacheControl": "no-store"})).unwrap();
    assert_eq!(options.timeout, 250);
    assert_eq!(options.extra.get("cacheControl"), Some(&json!("no-store")));
  }

  #[test]
  fn missing_timeout_uses_default() {
    let options = PipelineOptions::from_value(json!({"other": 1})).unwrap();
    assert_eq!(options.timeout, 60_000);
  }

  #[test]
  fn zero_or_malformed_timeout_is_rejected() {
    assert!(matches!(
      PipelineOptions::from_value(json!({"timeout": 0})),
      Err(PipelineError::Configuration { .. })
    ));
    assert!(matches!(
      PipelineOptions::from_value(json!({"timeout": "soon"})),
      Err(PipelineError::Configuration { .. })
    ));
  }

  #[test]
  fn oversized_timeout_saturates() {
    let options = PipelineOptions::default().with_timeout(Duration::MAX);
    assert_eq!(options.timeout, u64::MAX);
    assert_eq!(
      PipelineOptions::default().with_timeout(Duration::from_millis(1500)).timeout,
      1500
    );
  }
}
