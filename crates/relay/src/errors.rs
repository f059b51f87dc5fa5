use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("collector answered with status {0}")]
    Status(u16),
    #[error("invalid collector response: {0}")]
    Decode(String),
    #[error("invalid relay configuration: {0}")]
    Config(String),
}

impl RelayError {
    /// Client errors mean the collector refused this payload; sending it
    /// again will not change the answer.
    pub fn is_retryable(&self) -> bool {
        match self {
            RelayError::Status(code) => !(400..500).contains(code),
            RelayError::Config(_) => false,
            _ => true,
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::Timeout
        } else if err.is_decode() {
            RelayError::Decode(err.to_string())
        } else {
            RelayError::Transport(err.to_string())
        }
    }
}
