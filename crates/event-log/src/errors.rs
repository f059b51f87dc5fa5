use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EventLogError {
    #[error("payload rejected: {0}")]
    Rejected(String),
}
