use crate::{
    message::{check_message_type, check_not_blank, decode_record, encode_record},
    DecodeError, EncodeError, InvalidArgument, Message,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::any::Any;

const MESSAGE_TYPE: &str = "Strata::MessageFormats::Pick";
const DEFAULT_ALGORITHM: &str = "unspecified";

/// first-motion polarity of a pick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Polarity {
    #[default]
    Unknown,
    Up,
    Down,
}

impl Polarity {
    fn to_wire(self) -> i8 {
        match self {
            Self::Unknown => 0,
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    fn from_wire(value: i8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Up),
            -1 => Ok(Self::Down),
            other => Err(DecodeError::InvalidField(format!(
                "polarity {} is not one of -1, 0, 1",
                other
            ))),
        }
    }
}

/// a phase arrival detected on a single channel
///
/// Picks are produced by detection algorithms watching the packet stream;
/// the identifier lets downstream associators refer back to the pick.
#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    network: String,
    station: String,
    channel: String,
    location_code: String,
    time: f64,
    identifier: i64,
    polarity: Polarity,
    phase_hint: String,
    algorithm: String,
}

#[derive(Serialize, Deserialize)]
struct Wire {
    #[serde(rename = "MessageType")]
    message_type: String,
    #[serde(rename = "Network")]
    network: String,
    #[serde(rename = "Station")]
    station: String,
    #[serde(rename = "Channel")]
    channel: String,
    #[serde(rename = "LocationCode")]
    location_code: String,
    #[serde(rename = "Time")]
    time: f64,
    #[serde(rename = "Identifier")]
    identifier: i64,
    #[serde(rename = "Polarity")]
    polarity: i8,
    #[serde(rename = "PhaseHint")]
    phase_hint: Option<String>,
    #[serde(rename = "Algorithm")]
    algorithm: String,
}

impl Default for Pick {
    fn default() -> Self {
        Self {
            network: String::new(),
            station: String::new(),
            channel: String::new(),
            location_code: String::new(),
            time: 0.0,
            identifier: 0,
            polarity: Polarity::Unknown,
            phase_hint: String::new(),
            algorithm: DEFAULT_ALGORITHM.to_string(),
        }
    }
}

impl Pick {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_network(&mut self, network: &str) -> Result<(), InvalidArgument> {
        check_not_blank("network", network)?;
        self.network = network.to_string();
        Ok(())
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn set_station(&mut self, station: &str) -> Result<(), InvalidArgument> {
        check_not_blank("station", station)?;
        self.station = station.to_string();
        Ok(())
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    pub fn set_channel(&mut self, channel: &str) -> Result<(), InvalidArgument> {
        check_not_blank("channel", channel)?;
        self.channel = channel.to_string();
        Ok(())
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn set_location_code(&mut self, location_code: &str) -> Result<(), InvalidArgument> {
        check_not_blank("location code", location_code)?;
        self.location_code = location_code.to_string();
        Ok(())
    }

    pub fn location_code(&self) -> &str {
        &self.location_code
    }

    /// the arrival time; the unit (epoch seconds or microseconds) is fixed
    /// by producer convention and transported bit-exactly
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_identifier(&mut self, identifier: i64) {
        self.identifier = identifier;
    }

    pub fn identifier(&self) -> i64 {
        self.identifier
    }

    pub fn set_polarity(&mut self, polarity: Polarity) {
        self.polarity = polarity;
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// e.g. `"P"` or `"S"`; may be left empty
    pub fn set_phase_hint(&mut self, phase_hint: impl Into<String>) {
        self.phase_hint = phase_hint.into();
    }

    pub fn phase_hint(&self) -> &str {
        &self.phase_hint
    }

    /// the algorithm that produced the pick; defaults to `"unspecified"`
    pub fn set_algorithm(&mut self, algorithm: impl Into<String>) {
        self.algorithm = algorithm.into();
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// reset every field to its default
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let wire: Wire = decode_record(bytes)?;
        check_message_type(MESSAGE_TYPE, &wire.message_type)?;

        Ok(Self {
            network: wire.network,
            station: wire.station,
            channel: wire.channel,
            location_code: wire.location_code,
            time: wire.time,
            identifier: wire.identifier,
            polarity: Polarity::from_wire(wire.polarity)?,
            phase_hint: wire.phase_hint.unwrap_or_default(),
            algorithm: wire.algorithm,
        })
    }
}

impl Message for Pick {
    fn message_type(&self) -> &str {
        MESSAGE_TYPE
    }

    fn to_bytes(&self) -> Result<Bytes, EncodeError> {
        encode_record(&Wire {
            message_type: MESSAGE_TYPE.to_string(),
            network: self.network.clone(),
            station: self.station.clone(),
            channel: self.channel.clone(),
            location_code: self.location_code.clone(),
            time: self.time,
            identifier: self.identifier,
            polarity: self.polarity.to_wire(),
            phase_hint: (!self.phase_hint.is_empty()).then(|| self.phase_hint.clone()),
            algorithm: self.algorithm.clone(),
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
