//! Engine tuning and termination configuration.
//!
//! Follows the teacher codebase's `ServerConfig` pattern: a
//! `serde`-deserializable, `validator`-validated struct with an explicit
//! `Default` impl and an `from_env` constructor reading process
//! environment variables.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Errors constructing or validating an [`EngineConfig`] or [`Constraints`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable error for {0}: {1}")]
    EnvVar(&'static str, #[source] std::env::VarError),

    #[error("invalid value for {field}: {value}")]
    Parse { field: &'static str, value: String },

    #[error("validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Tuning knobs for the execution loop (spec.md §4.5).
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rows (or pairs) processed per operator per loop iteration.
    #[validate(range(min = 1, message = "batch_size must be at least 1"))]
    pub batch_size: usize,

    /// Bounded retry count for a single LLM call before the row is left
    /// `Unknown` for this round (spec.md §4.2 Failure model).
    #[validate(range(min = 0, max = 10, message = "llm_retries must be between 0 and 10"))]
    pub llm_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            llm_retries: 3,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("THALAMUSDB_BATCH_SIZE") {
            config.batch_size = raw.parse().map_err(|_| ConfigError::Parse {
                field: "THALAMUSDB_BATCH_SIZE",
                value: raw,
            })?;
        }
        if let Ok(raw) = std::env::var("THALAMUSDB_LLM_RETRIES") {
            config.llm_retries = raw.parse().map_err(|_| ConfigError::Parse {
                field: "THALAMUSDB_LLM_RETRIES",
                value: raw,
            })?;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Termination policy for the execution loop (spec.md §4.6).
///
/// The default policy terminates on *either* an error-threshold or a
/// budget exhaustion. `error_threshold = 0.0` with an unlimited budget
/// degenerates to "error-only" mode; an infinite `error_threshold` with a
/// finite budget degenerates to "budget-only" mode — both are spec.md's
/// named additional modes, expressed here as configurations rather than
/// separate types.
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct Constraints {
    #[validate(range(min = 0.0, max = 1.0, message = "error_threshold must be in [0, 1]"))]
    pub error_threshold: f64,

    /// `None` means no LLM-call budget (error-only mode).
    pub llm_call_budget: Option<u64>,

    /// `None` means no wall-clock budget.
    pub wall_clock_budget_secs: Option<f64>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            error_threshold: 0.1,
            llm_call_budget: None,
            wall_clock_budget_secs: None,
        }
    }
}

impl Constraints {
    pub fn error_only(error_threshold: f64) -> Self {
        Self {
            error_threshold,
            llm_call_budget: None,
            wall_clock_budget_secs: None,
        }
    }

    pub fn budget_only(llm_call_budget: u64) -> Self {
        Self {
            error_threshold: 0.0,
            llm_call_budget: Some(llm_call_budget),
            wall_clock_budget_secs: None,
        }
    }

    /// Decide whether the execution loop should stop.
    ///
    /// Returns `true` on either the error threshold being met or any
    /// configured budget being exhausted (spec.md §4.6).
    pub fn terminate(
        &self,
        counters: &crate::counters::TdbCounters,
        elapsed_secs: f64,
        error: f64,
    ) -> bool {
        if error <= self.error_threshold {
            return true;
        }
        if let Some(budget) = self.llm_call_budget {
            if counters.llm_calls >= budget {
                return true;
            }
        }
        if let Some(budget) = self.wall_clock_budget_secs {
            if elapsed_secs >= budget {
                return true;
            }
        }
        false
    }
}
