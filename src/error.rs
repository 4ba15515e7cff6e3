//! Error taxonomy for the pipeline.
//!
//! Every failure the core can produce is one of these variants. None of
//! them is retried internally; they carry enough context (offending
//! index, parameter value) to diagnose at the call site. Numerical
//! instability in the adversarial and search loops is intentionally not
//! an error: it is surfaced through reported loss values only.

use thiserror::Error;

/// Errors produced by the pipeline core.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or too-short series, or a non-finite value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Inconsistent batch/dimension/bound parameters.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Environment action outside the valid range.
    #[error("invalid action index {index}, expected 0..{count}")]
    InvalidAction { index: usize, count: usize },

    /// `step` called after the episode terminated.
    #[error("episode exhausted at step {step}")]
    EpisodeExhausted { step: usize },

    /// External data source failure. Fatal: the pipeline aborts before
    /// any downstream stage runs.
    #[error("upstream data source failed: {0}")]
    UpstreamData(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::InvalidAction { index: 7, count: 3 };
        assert_eq!(err.to_string(), "invalid action index 7, expected 0..3");

        let err = PipelineError::EpisodeExhausted { step: 10 };
        assert!(err.to_string().contains("10"));
    }
}
