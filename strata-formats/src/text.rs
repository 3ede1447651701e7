use crate::{
    message::{check_message_type, decode_record, encode_record},
    DecodeError, EncodeError, Message,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::any::Any;

const MESSAGE_TYPE: &str = "Strata::MessageFormats::Text";

/// a free form textual notice
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    contents: String,
}

#[derive(Serialize, Deserialize)]
struct Wire {
    #[serde(rename = "MessageType")]
    message_type: String,
    #[serde(rename = "Contents")]
    contents: String,
}

impl Text {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    pub fn set_contents(&mut self, contents: impl Into<String>) {
        self.contents = contents.into();
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// reset every field to its default
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let wire: Wire = decode_record(bytes)?;
        check_message_type(MESSAGE_TYPE, &wire.message_type)?;
        Ok(Self {
            contents: wire.contents,
        })
    }
}

impl Message for Text {
    fn message_type(&self) -> &str {
        MESSAGE_TYPE
    }

    fn to_bytes(&self) -> Result<Bytes, EncodeError> {
        encode_record(&Wire {
            message_type: MESSAGE_TYPE.to_string(),
            contents: self.contents.clone(),
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

    #[test]
    fn round_trip() {
        let text = Text::new("station YFT back online");

        let bytes = text.to_bytes().unwrap();
        let mut back = Text::default();
        back.from_slice(&bytes).unwrap();

        assert_eq!(back, text);
    }

    #[quickcheck]
    fn round_trip_any_contents(contents: String) -> bool {
        let text = Text::new(contents);
        let bytes = text.to_bytes().unwrap();
        Text::decode(&bytes).unwrap() == text
    }

    #[test]
    fn rejects_foreign_payload() {
        let failure = crate::Failure::new("disk full");
        let bytes = failure.to_bytes().unwrap();

        let mut text = Text::new("untouched");
        let error = text.from_slice(&bytes).unwrap_err();

        assert!(matches!(error, DecodeError::WrongMessageType { .. }));
        assert_eq!(text.contents(), "untouched");
    }

    #[test]
    fn rejects_empty_payload() {
        let mut text = Text::default();
        assert!(matches!(
            text.from_slice(&[]).unwrap_err(),
            DecodeError::Empty
        ));
    }
}
