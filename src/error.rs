use std::error::Error;
use std::fmt;
use tokio_cron_scheduler::JobSchedulerError;

/// Custom Error and Result types to unify errors from all sources.
pub type BoardResult<T> = Result<T, BoardError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Network or transport failure reaching the affiliates API.
    UpstreamUnavailable(String),
    /// Affiliates API answered, but not with the expected shape.
    UpstreamMalformed(String),
    Scheduler(String),
    Config(String),
    Server(String),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BoardError::UpstreamUnavailable(s) => write!(f, "Upstream Unavailable: {}", s),
            BoardError::UpstreamMalformed(s) => write!(f, "Upstream Malformed: {}", s),
            BoardError::Scheduler(s) => write!(f, "Scheduler Error: {}", s),
            BoardError::Config(s) => write!(f, "Config Error: {}", s),
            BoardError::Server(s) => write!(f, "Server Error: {}", s),
        }
    }
}

impl Error for BoardError {}

impl From<reqwest::Error> for BoardError {
    fn from(error: reqwest::Error) -> Self {
        // Body arrived but could not be decoded: the transport itself worked.
        if error.is_decode() {
            BoardError::UpstreamMalformed(error.to_string())
        } else {
            BoardError::UpstreamUnavailable(error.to_string())
        }
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(error: serde_json::Error) -> Self {
        BoardError::UpstreamMalformed(error.to_string())
    }
}

impl From<JobSchedulerError> for BoardError {
    fn from(error: JobSchedulerError) -> Self {
        BoardError::Scheduler(error.to_string())
    }
}

impl From<figment::Error> for BoardError {
    fn from(error: figment::Error) -> Self {
        BoardError::Config(error.to_string())
    }
}

impl From<std::io::Error> for BoardError {
    fn from(error: std::io::Error) -> Self {
        BoardError::Server(error.to_string())
    }
}
