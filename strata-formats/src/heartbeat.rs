use crate::{
    message::{check_message_type, decode_record, encode_record},
    DecodeError, EncodeError, Message,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::any::Any;

const MESSAGE_TYPE: &str = "Strata::MessageFormats::Heartbeat";

/// liveness of the module emitting a heartbeat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModuleStatus {
    #[default]
    Unknown,
    Alive,
    /// the module shut down cleanly
    Disconnected,
    /// the module stopped without disconnecting; a restart is likely needed
    Died,
}

impl ModuleStatus {
    fn to_wire(self) -> i8 {
        match self {
            Self::Unknown => 0,
            Self::Alive => 1,
            Self::Disconnected => 2,
            Self::Died => 3,
        }
    }

    fn from_wire(value: i8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Alive),
            2 => Ok(Self::Disconnected),
            3 => Ok(Self::Died),
            other => Err(DecodeError::InvalidField(format!(
                "module status {} is not in 0..=3",
                other
            ))),
        }
    }
}

/// a periodic liveness broadcast from a long-running producer
///
/// monitors subscribe to these to notice modules that stopped sending data
/// without saying goodbye.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heartbeat {
    host_name: String,
    status: ModuleStatus,
    time_stamp: String,
}

#[derive(Serialize, Deserialize)]
struct Wire {
    #[serde(rename = "MessageType")]
    message_type: String,
    #[serde(rename = "HostName")]
    host_name: String,
    #[serde(rename = "Status")]
    status: i8,
    #[serde(rename = "TimeStamp")]
    time_stamp: String,
}

impl Heartbeat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_host_name(&mut self, host_name: impl Into<String>) {
        self.host_name = host_name.into();
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn set_status(&mut self, status: ModuleStatus) {
        self.status = status;
    }

    pub fn status(&self) -> ModuleStatus {
        self.status
    }

    /// UTC time stamp in `YYYY-MM-DD HH:MM:SS` form, set by the producer
    pub fn set_time_stamp(&mut self, time_stamp: impl Into<String>) {
        self.time_stamp = time_stamp.into();
    }

    pub fn time_stamp(&self) -> &str {
        &self.time_stamp
    }

    /// reset every field to its default
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let wire: Wire = decode_record(bytes)?;
        check_message_type(MESSAGE_TYPE, &wire.message_type)?;
        Ok(Self {
            host_name: wire.host_name,
            status: ModuleStatus::from_wire(wire.status)?,
            time_stamp: wire.time_stamp,
        })
    }
}

impl Message for Heartbeat {
    fn message_type(&self) -> &str {
        MESSAGE_TYPE
    }

    fn to_bytes(&self) -> Result<Bytes, EncodeError> {
        encode_record(&Wire {
            message_type: MESSAGE_TYPE.to_string(),
            host_name: self.host_name.clone(),
            status: self.status.to_wire(),
            time_stamp: self.time_stamp.clone(),
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
