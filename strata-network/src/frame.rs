use bytes::{Buf as _, BufMut as _, Bytes, BytesMut};
use std::io;
use strata_formats::{EncodeError, Message};
use tokio_util::codec::{Decoder, Encoder};

/// the largest frame a session will send or accept
pub const MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

const HEAD_LENGTH: usize = std::mem::size_of::<u32>();
const TAG_HEAD_LENGTH: usize = std::mem::size_of::<u16>();
// a frame carries at least the tag length marker
const MIN_FRAME_LENGTH: usize = TAG_HEAD_LENGTH;

/// the logical two-part structure on the wire: a message's type tag
/// followed by its payload
///
/// the tag travels first so a receiver can pick the right decoder without
/// touching the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    message_type: String,
    payload: Bytes,
}

impl Frame {
    pub fn new(message_type: impl Into<String>, payload: Bytes) -> Self {
        Self {
            message_type: message_type.into(),
            payload,
        }
    }

    /// serialize a message into its frame
    pub fn from_message(message: &dyn Message) -> Result<Self, EncodeError> {
        Ok(Self {
            message_type: message.message_type().to_string(),
            payload: message.to_bytes()?,
        })
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn payload(&self) -> &[u8] {
        self.payload.as_ref()
    }
}

/**
# Codec for session sockets

[tokio codec] turning the byte stream into [`Frame`]s and back. The
encoding is a `u32` frame length, a `u16` tag length, the UTF-8 tag bytes
and the payload bytes. The decoder enforces the frame length boundaries so
a misbehaving peer cannot make a session buffer an arbitrarily large frame.

[tokio codec]: tokio_util::codec
*/
#[derive(Debug, Default)]
pub(crate) struct FrameCodec {
    decode_state: State,
}

/// state of the data being read
///
/// we expect the fixed-size head carrying the frame length, then the
/// frame's data, then a head again.
#[derive(Debug, Default)]
enum State {
    #[default]
    Head,
    Data(usize),
}

impl FrameCodec {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn decode_head(&mut self, src: &mut BytesMut) -> io::Result<Option<usize>> {
        if src.len() < HEAD_LENGTH {
            return Ok(None);
        }

        let n = src.get_u32() as usize;

        if n < MIN_FRAME_LENGTH {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "frame is too short",
            ));
        }

        if n > MAX_FRAME_LENGTH {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "frame is too long",
            ));
        }

        src.reserve(n);

        Ok(Some(n))
    }

    fn decode_data(&mut self, n: usize, src: &mut BytesMut) -> io::Result<Option<Frame>> {
        if src.len() < n {
            return Ok(None);
        }

        let mut bytes = src.split_to(n);

        let tag_length = bytes.get_u16() as usize;
        if TAG_HEAD_LENGTH + tag_length > n {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "frame tag length exceeds the frame",
            ));
        }

        let tag = bytes.split_to(tag_length);
        let message_type = std::str::from_utf8(tag.as_ref())
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?
            .to_string();

        Ok(Some(Frame {
            message_type,
            payload: bytes.freeze(),
        }))
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let n = match self.decode_state {
            State::Head => match self.decode_head(src)? {
                Some(n) => {
                    self.decode_state = State::Data(n);
                    n
                }
                None => return Ok(None),
            },
            State::Data(n) => n,
        };

        match self.decode_data(n, src)? {
            Some(frame) => {
                self.decode_state = State::Head;
                src.reserve(HEAD_LENGTH);
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let tag = item.message_type.as_bytes();

        if tag.len() > u16::MAX as usize {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "message type tag is too long",
            ));
        }

        let n = TAG_HEAD_LENGTH + tag.len() + item.payload.len();
        if n > MAX_FRAME_LENGTH {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "frame is too long",
            ));
        }

        dst.reserve(HEAD_LENGTH + n);
        dst.put_u32(n as u32);
        dst.put_u16(tag.len() as u16);
        dst.put_slice(tag);
        dst.put_slice(item.payload.as_ref());

        Ok(())
    }
}
