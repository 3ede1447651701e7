use crate::{DecodeError, EncodeError};
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use std::{any::Any, fmt};

/// the contract every message kind satisfies
///
/// A message is a self describing value object: its [`message_type`] is a
/// globally unique, stable string tag and its payload is a CBOR record that
/// embeds the tag so a receiver can verify it decoded the right kind.
///
/// The core kinds ([`Text`], [`Failure`], [`DataPacket`], [`Pick`] and
/// [`Heartbeat`]) all implement this trait; user defined kinds implement it
/// the same way and become routable once a prototype is registered with
/// [`Messages`].
///
/// [`message_type`]: Message::message_type
/// [`Text`]: crate::Text
/// [`Failure`]: crate::Failure
/// [`DataPacket`]: crate::DataPacket
/// [`Pick`]: crate::Pick
/// [`Heartbeat`]: crate::Heartbeat
/// [`Messages`]: crate::Messages
pub trait Message: fmt::Debug + Send {
    /// the unique type tag of this kind, constant for every instance and
    /// stable across versions
    fn message_type(&self) -> &str;

    /// serialize this message to its wire payload
    ///
    /// the payload is a snapshot: mutating the message afterwards does not
    /// affect bytes already produced.
    fn to_bytes(&self) -> Result<Bytes, EncodeError>;

    /// replace `self` with the value decoded from `bytes`
    ///
    /// fails on malformed input or when the payload's embedded type tag is
    /// not this kind's tag; on failure `self` is untouched.
    fn from_slice(&mut self, bytes: &[u8]) -> Result<(), DecodeError>;

    /// deep copy of this message, no buffers are shared with the original
    fn clone_boxed(&self) -> Box<dyn Message>;

    /// a fresh, default instance of the same kind
    ///
    /// this is the factory hook the registry uses to materialize incoming
    /// messages.
    fn default_instance(&self) -> Box<dyn Message>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl Clone for Box<dyn Message> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// serialize a wire record to CBOR bytes
pub(crate) fn encode_record<T>(record: &T) -> Result<Bytes, EncodeError>
where
    T: Serialize,
{
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(record, &mut bytes)?;
    Ok(Bytes::from(bytes))
}

/// decode a CBOR wire record
///
/// the caller verifies the record's embedded `MessageType` entry with
/// [`check_message_type`] afterwards.
pub(crate) fn decode_record<T>(bytes: &[u8]) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
{
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(ciborium::de::from_reader(bytes)?)
}

pub(crate) fn check_message_type(expected: &str, found: &str) -> Result<(), DecodeError> {
    if expected == found {
        Ok(())
    } else {
        Err(DecodeError::WrongMessageType {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}

/// reject empty or whitespace-only identifier fields
pub(crate) fn check_not_blank(field: &str, value: &str) -> Result<(), crate::InvalidArgument> {
    if value.chars().all(char::is_whitespace) {
        Err(crate::InvalidArgument::new(format!("{} is empty", field)))
    } else {
        Ok(())
    }
}
