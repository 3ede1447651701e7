use crate::{
    message::{check_message_type, decode_record, encode_record},
    DecodeError, EncodeError, Message,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::any::Any;

const MESSAGE_TYPE: &str = "Strata::MessageFormats::Failure";

/// a failure report from a producer or service
///
/// carried on the same channels as the data so that downstream consumers
/// learn about a producer's problems in-band.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Failure {
    details: String,
}

#[derive(Serialize, Deserialize)]
struct Wire {
    #[serde(rename = "MessageType")]
    message_type: String,
    #[serde(rename = "Details")]
    details: String,
}

impl Failure {
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }

    pub fn set_details(&mut self, details: impl Into<String>) {
        self.details = details.into();
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    /// reset every field to its default
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let wire: Wire = decode_record(bytes)?;
        check_message_type(MESSAGE_TYPE, &wire.message_type)?;
        Ok(Self {
            details: wire.details,
        })
    }
}

impl Message for Failure {
    fn message_type(&self) -> &str {
        MESSAGE_TYPE
    }

    fn to_bytes(&self) -> Result<Bytes, EncodeError> {
        encode_record(&Wire {
            message_type: MESSAGE_TYPE.to_string(),
            details: self.details.clone(),
        })
    }

    fn from_slice(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        *self = Self::decode(bytes)?;
        Ok(())
    }

    fn clone_boxed(&self) -> Box<dyn Message> {
        Box::new(self.clone())
    }

    fn default_instance(&self) -> Box<dyn Message> {
        Box::<Self>::default()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[quickcheck]
    fn round_trip_any_details(details: String) -> bool {
        let failure = Failure::new(details);
        let bytes = failure.to_bytes().unwrap();
        Failure::decode(&bytes).unwrap() == failure
    }

    #[test]
    fn clone_is_deep() {
        let failure = Failure::new("acquisition gap on channel EHZ");
        let copy = failure.clone_boxed();

        let copy = copy.into_any().downcast::<Failure>().unwrap();
        assert_eq!(*copy, failure);
    }
}
