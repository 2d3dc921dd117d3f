use thiserror::Error;

/// Supervisor custom errors.
#[derive(Error, Debug)]
pub enum StartupError {
    /// A manual trigger arrived while a run was scheduled or in flight.
    /// Manual triggers are never queued.
    #[error("startup check already running")]
    AlreadyRunning,
    /// Every configured attempt failed; wraps the last underlying error.
    #[error("startup check failed after {attempts} attempt(s): {last_error}")]
    ExhaustedRetries { attempts: u32, last_error: String },
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
