use thiserror::Error;

/// Errors surfaced by the alert event loop and configuration.
///
/// The presentation state machine itself cannot fail; these only cover
/// resource setup and rejected configuration.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] calloop::Error),

    #[error("failed to create wakeup ping: {0}")]
    Wakeup(#[from] std::io::Error),

    #[error("invalid alert configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = AlertError> = std::result::Result<T, E>;
