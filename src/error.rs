use std::fmt;
use thiserror::Error;

/// Result of every git, forge and generation operation. Failures are values, never panics.
pub type Outcome<T> = std::result::Result<T, OpError>;

/// Coarse failure class, stable enough for callers to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigurationMissing,
    InvalidInput,
    ProcessSpawn,
    ProcessExecution,
    Network,
    Parse,
}

/// Stage of a composite operation, used to prefix the failure reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Checkout,
    Push,
    PullRequest,
    Commit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Checkout => "checkout",
            Stage::Push => "push",
            Stage::PullRequest => "pull request",
            Stage::Commit => "commit",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum OpError {
    #[error("{0} not configured")]
    ConfigurationMissing(&'static str),

    /// Set, but not usable as given (e.g. a key that cannot go in a header).
    #[error("invalid {0}")]
    InvalidCredential(&'static str),

    #[error("no input: {0}")]
    EmptyInput(&'static str),

    #[error("failed to start {program}: {reason}")]
    ProcessSpawn { program: String, reason: String },

    #[error("{command} failed: {stderr}")]
    ProcessExecution { command: String, stderr: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<OpError>,
    },
}

impl OpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationMissing(_) | Self::InvalidCredential(_) => {
                ErrorKind::ConfigurationMissing
            }
            Self::EmptyInput(_) => ErrorKind::InvalidInput,
            Self::ProcessSpawn { .. } => ErrorKind::ProcessSpawn,
            Self::ProcessExecution { .. } => ErrorKind::ProcessExecution,
            Self::Network(_) | Self::Api { .. } => ErrorKind::Network,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Stage { source, .. } => source.kind(),
        }
    }

    /// Wraps this failure with the composite stage it happened in.
    pub fn in_stage(self, stage: Stage) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The stage a composite operation failed at, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for OpError {
    fn from(error: serde_json::Error) -> Self {
        OpError::Parse(error.to_string())
    }
}

impl From<reqwest::Error> for OpError {
    fn from(error: reqwest::Error) -> Self {
        OpError::Network(error.to_string())
    }
}
