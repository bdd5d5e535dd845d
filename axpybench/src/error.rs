use std::path::PathBuf;

/// Errors that abort a benchmark run.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// Bad mode selector or invalid configuration value, detected before the
    /// graph is compiled.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("missing feed for '{name}' at step {step}")]
    MissingFeed { step: usize, name: String },

    #[error("step {step} failed: {source}")]
    StepExecution {
        step: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to write trace artifact {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl BenchError {
    pub fn configuration(message: impl Into<String>) -> Self {
        BenchError::Configuration(message.into())
    }

    /// Step index attached to the error, if any.
    pub fn step(&self) -> Option<usize> {
        match self {
            BenchError::MissingFeed { step, .. } | BenchError::StepExecution { step, .. } => {
                Some(*step)
            }
            _ => None,
        }
    }
}

pub type BenchResult<T> = std::result::Result<T, BenchError>;
