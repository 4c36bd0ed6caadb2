use thiserror::Error;

/// Failure of an outbound JSON request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetError {
    /// Request did not complete within its timeout
    #[error("request timed out")]
    Timeout,
    /// Connection or protocol failure
    #[error("transport error: {0}")]
    Transport(String),
    /// Server answered with a non-success HTTP status
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    /// Service answered but reported a non-success status in the body
    #[error("service reported status {0:?}")]
    Rejected(String),
    /// Body was not the JSON we expected
    #[error("malformed response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for NetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetError::Timeout
        } else if let Some(status) = err.status() {
            NetError::Status(status.as_u16())
        } else if err.is_decode() {
            NetError::Parse(err.to_string())
        } else {
            NetError::Transport(err.to_string())
        }
    }
}

/// Errors surfaced to callers of the detection pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectError {
    #[error("Client IP not provided")]
    MissingIp,
}
