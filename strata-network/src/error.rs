use strata_formats::{EncodeError, RegistryError};
use thiserror::Error;

/// an options or policy object is incomplete or inconsistent
///
/// raised when composing an authentication policy with missing credentials
/// and when a session is asked to bind/connect with incomplete options; in
/// the latter case the session stays unconnected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid configuration: {0}")]
pub struct InvalidConfiguration(String);

impl InvalidConfiguration {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    pub fn reason(&self) -> &str {
        &self.0
    }
}

/// failures of a publisher or subscriber session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidConfiguration(#[from] InvalidConfiguration),

    /// the operation needs a bound/connected session
    #[error("session is not connected")]
    NotConnected,

    /// a blocking send or receive exceeded the configured time out; the
    /// session remains usable
    #[error("operation timed out")]
    Timeout,

    #[error("transport failure")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
