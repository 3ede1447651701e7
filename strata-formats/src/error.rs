use thiserror::Error;

/// a field value was rejected by a setter
///
/// setters validate eagerly: when this error is returned the message is
/// left exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid argument: {0}")]
pub struct InvalidArgument(String);

impl InvalidArgument {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    /// the reason the value was rejected
    pub fn reason(&self) -> &str {
        &self.0
    }
}

/// a message could not be serialized to its wire payload
#[derive(Debug, Error)]
#[error("cannot encode message payload")]
pub struct EncodeError(#[from] ciborium::ser::Error<std::io::Error>);

/// a wire payload could not be decoded into the expected message kind
#[derive(Debug, Error)]
pub enum DecodeError {
    /// the payload is not a well formed CBOR record
    #[error("malformed message payload")]
    Malformed(#[from] ciborium::de::Error<std::io::Error>),

    /// the payload carries a different type tag than the kind it was
    /// decoded into
    #[error("message type mismatch: expected {expected}, found {found}")]
    WrongMessageType { expected: String, found: String },

    /// the payload decoded but a field value violates the kind's
    /// invariants (e.g. a non-positive sampling rate)
    #[error("invalid field in message payload: {0}")]
    InvalidField(String),

    /// there were no bytes to decode
    #[error("message payload is empty")]
    Empty,
}

/// registry level failures, never fatal to the caller
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// a prototype with this type tag is already registered; the registry
    /// is left unchanged
    #[error("message type already registered: {0}")]
    DuplicateType(String),

    /// no prototype with this type tag is registered
    #[error("unknown message type: {0}")]
    UnknownType(String),
}
