use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("{step} failed: {command}: {output}")]
    CommandFailed {
        step: String,
        command: String,
        output: String,
    },

    /// One or more of the concurrent repository-state probes failed.
    #[error("{}", join_failures(.failures))]
    StateProbe { failures: Vec<CoreError> },

    #[error("{step} cancelled")]
    Cancelled { step: String },

    #[error("Port error: {source}")]
    Port { source: anyhow::Error },
}

impl CoreError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// True when this error, or any error aggregated inside it, is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled { .. } => true,
            Self::StateProbe { failures } => failures.iter().any(CoreError::is_cancelled),
            _ => false,
        }
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(source: anyhow::Error) -> Self {
        Self::Port { source }
    }
}

fn join_failures(failures: &[CoreError]) -> String {
    failures
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, CoreError>;
