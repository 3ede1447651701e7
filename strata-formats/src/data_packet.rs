use crate::{
    message::{check_message_type, check_not_blank, decode_record, encode_record},
    DecodeError, EncodeError, InvalidArgument, Message,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::any::Any;

const MESSAGE_TYPE: &str = "Strata::MessageFormats::DataPacket";
const MICROSECONDS_PER_SECOND: f64 = 1_000_000.0;

/// a fixed-sampling-rate chunk of time-series data
///
/// A packet is identified by its network, station, channel and location
/// code, starts at a given time (microseconds since the epoch) and carries
/// a contiguous run of double-precision samples. The end time is derived
/// from the start time, the sampling rate and the number of samples; it is
/// recomputed on every read so it can never go stale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataPacket {
    network: String,
    station: String,
    channel: String,
    location_code: String,
    sampling_rate: Option<f64>,
    start_time_in_microseconds: i64,
    data: Vec<f64>,
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
    #[serde(rename = "StartTime")]
    start_time: i64,
    #[serde(rename = "SamplingRate")]
    sampling_rate: Option<f64>,
    /// derived, written for readers of the raw record; ignored on decode
    #[serde(rename = "EndTime")]
    end_time: Option<i64>,
    #[serde(rename = "Data")]
    data: Option<Vec<f64>>,
}

impl DataPacket {
    pub fn new() -> Self {
        Self::default()
    }

    /// network code, e.g. `"WY"`; rejects blank values
    pub fn set_network(&mut self, network: &str) -> Result<(), InvalidArgument> {
        check_not_blank("network", network)?;
        self.network = network.to_string();
        Ok(())
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    /// station code, e.g. `"YFT"`; rejects blank values
    pub fn set_station(&mut self, station: &str) -> Result<(), InvalidArgument> {
        check_not_blank("station", station)?;
        self.station = station.to_string();
        Ok(())
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    /// channel code, e.g. `"EHZ"`; rejects blank values
    pub fn set_channel(&mut self, channel: &str) -> Result<(), InvalidArgument> {
        check_not_blank("channel", channel)?;
        self.channel = channel.to_string();
        Ok(())
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// location code, e.g. `"01"`; rejects blank values
    pub fn set_location_code(&mut self, location_code: &str) -> Result<(), InvalidArgument> {
        check_not_blank("location code", location_code)?;
        self.location_code = location_code.to_string();
        Ok(())
    }

    pub fn location_code(&self) -> &str {
        &self.location_code
    }

    /// the sampling rate in Hz, must be positive
    pub fn set_sampling_rate(&mut self, sampling_rate: f64) -> Result<(), InvalidArgument> {
        if !(sampling_rate > 0.0) {
            return Err(InvalidArgument::new(format!(
                "sampling rate {} must be positive",
                sampling_rate
            )));
        }
        self.sampling_rate = Some(sampling_rate);
        Ok(())
    }

    /// the sampling rate in Hz, `None` until set
    pub fn sampling_rate(&self) -> Option<f64> {
        self.sampling_rate
    }

    /// time of the first sample in microseconds since the epoch
    pub fn set_start_time_in_microseconds(&mut self, start_time: i64) {
        self.start_time_in_microseconds = start_time;
    }

    pub fn start_time_in_microseconds(&self) -> i64 {
        self.start_time_in_microseconds
    }

    /// time of the last sample in microseconds since the epoch
    ///
    /// derived from the start time, the sampling rate and the number of
    /// samples; equals the start time while the packet has no samples or
    /// no sampling rate.
    pub fn end_time_in_microseconds(&self) -> i64 {
        match self.sampling_rate {
            Some(rate) if !self.data.is_empty() => {
                let duration =
                    ((self.data.len() - 1) as f64 / rate) * MICROSECONDS_PER_SECOND;
                self.start_time_in_microseconds + duration.round() as i64
            }
            _ => self.start_time_in_microseconds,
        }
    }

    /// copy the given samples into the packet
    ///
    /// the caller's buffer is copied, not aliased, so mutating it after
    /// this call is not observed by the packet.
    pub fn set_data(&mut self, samples: &[f64]) {
        self.data = samples.to_vec();
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn number_of_samples(&self) -> usize {
        self.data.len()
    }

    /// reset every field to its default
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let wire: Wire = decode_record(bytes)?;
        check_message_type(MESSAGE_TYPE, &wire.message_type)?;

        if let Some(rate) = wire.sampling_rate {
            if !(rate > 0.0) {
                return Err(DecodeError::InvalidField(format!(
                    "sampling rate {} must be positive",
                    rate
                )));
            }
        }

        Ok(Self {
            network: wire.network,
            station: wire.station,
            channel: wire.channel,
            location_code: wire.location_code,
            sampling_rate: wire.sampling_rate,
            start_time_in_microseconds: wire.start_time,
            data: wire.data.unwrap_or_default(),
        })
    }
}

impl Message for DataPacket {
    fn message_type(&self) -> &str {
        MESSAGE_TYPE
    }

    fn to_bytes(&self) -> Result<Bytes, EncodeError> {
        let end_time = (self.sampling_rate.is_some() && !self.data.is_empty())
            .then(|| self.end_time_in_microseconds());

        encode_record(&Wire {
            message_type: MESSAGE_TYPE.to_string(),
            network: self.network.clone(),
            station: self.station.clone(),
            channel: self.channel.clone(),
            location_code: self.location_code.clone(),
            start_time: self.start_time_in_microseconds,
            sampling_rate: self.sampling_rate,
            end_time,
            data: (!self.data.is_empty()).then(|| self.data.clone()),
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

    fn packet() -> DataPacket {
        let mut packet = DataPacket::new();
        packet.set_network("WY").unwrap();
        packet.set_station("YFT").unwrap();
        packet.set_channel("EHZ").unwrap();
        packet.set_location_code("01").unwrap();
        packet.set_start_time_in_microseconds(1050);
        packet.set_sampling_rate(100.0).unwrap();
        packet.set_data(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        packet
    }

    #[test]
    fn end_time_is_derived() {
        let packet = packet();

        // 1050 + round(9/100 * 1e6)
        assert_eq!(packet.end_time_in_microseconds(), 91_050);
    }

    #[test]
    fn end_time_tracks_field_updates() {
        let mut packet = packet();

        packet.set_start_time_in_microseconds(1_628_803_598_000_000);
        packet.set_sampling_rate(40.0).unwrap();
        assert_eq!(
            packet.end_time_in_microseconds(),
            1_628_803_598_000_000 + 225_000
        );

        packet.set_data(&[]);
        assert_eq!(
            packet.end_time_in_microseconds(),
            packet.start_time_in_microseconds()
        );
    }

    #[test]
    fn end_time_without_samples_equals_start_time() {
        let mut packet = DataPacket::new();
        packet.set_start_time_in_microseconds(400);

        assert_eq!(packet.end_time_in_microseconds(), 400);
    }

    #[test]
    fn clone_preserves_every_field() {
        let packet = packet();
        let copy = packet.clone();

        assert_eq!(copy.network(), packet.network());
        assert_eq!(copy.station(), packet.station());
        assert_eq!(copy.channel(), packet.channel());
        assert_eq!(copy.location_code(), packet.location_code());
        assert_eq!(copy.sampling_rate(), packet.sampling_rate());
        assert_eq!(
            copy.start_time_in_microseconds(),
            packet.start_time_in_microseconds()
        );
        assert_eq!(
            copy.end_time_in_microseconds(),
            packet.end_time_in_microseconds()
        );
        assert_eq!(copy.data(), packet.data());
    }

    #[test]
    fn round_trip_is_exact() {
        let packet = packet();

        let bytes = packet.to_bytes().unwrap();
        let back = DataPacket::decode(&bytes).unwrap();

        assert_eq!(back, packet);
        assert_eq!(back.end_time_in_microseconds(), 91_050);
    }

    #[quickcheck]
    fn round_trip_any_samples(samples: Vec<f64>) -> bool {
        // NaN never compares equal, skip those inputs
        if samples.iter().any(|s| s.is_nan()) {
            return true;
        }
        let mut packet = packet();
        packet.set_data(&samples);

        let bytes = packet.to_bytes().unwrap();
        DataPacket::decode(&bytes).unwrap() == packet
    }

    #[test]
    fn setters_reject_bad_values() {
        let mut packet = DataPacket::new();

        assert!(packet.set_network("  ").is_err());
        assert!(packet.set_station("").is_err());
        assert!(packet.set_sampling_rate(0.0).is_err());
        assert!(packet.set_sampling_rate(-100.0).is_err());

        // nothing was mutated
        assert_eq!(packet, DataPacket::default());
    }

    #[test]
    fn set_data_copies_the_callers_buffer() {
        let mut samples = vec![1.0, 2.0, 3.0];
        let mut packet = DataPacket::new();
        packet.set_data(&samples);

        samples[0] = -1.0;
        assert_eq!(packet.data(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn clear_resets_to_default() {
        let mut packet = packet();
        packet.clear();

        assert_eq!(packet, DataPacket::default());
        assert_eq!(packet.number_of_samples(), 0);
    }

    #[test]
    fn rejects_non_positive_wire_sampling_rate() {
        let record = Wire {
            message_type: MESSAGE_TYPE.to_string(),
            network: "WY".to_string(),
            station: "YFT".to_string(),
            channel: "EHZ".to_string(),
            location_code: "01".to_string(),
            start_time: 0,
            sampling_rate: Some(-40.0),
            end_time: None,
            data: None,
        };
        let bytes = crate::message::encode_record(&record).unwrap();

        let mut packet = DataPacket::new();
        assert!(matches!(
            packet.from_slice(&bytes).unwrap_err(),
            DecodeError::InvalidField(_)
        ));
    }
}
