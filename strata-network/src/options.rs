use crate::{auth::ZapOptions, InvalidConfiguration};
use std::time::Duration;
use strata_formats::{InvalidArgument, Messages};

/// strip the `tcp://` scheme off an endpoint address
///
/// the sessions speak plain TCP; any other scheme is a configuration
/// error, not a transport failure.
pub(crate) fn tcp_endpoint(address: &str) -> Result<&str, InvalidConfiguration> {
    address.strip_prefix("tcp://").ok_or_else(|| {
        InvalidConfiguration::new(format!(
            "address {:?} must be of the form tcp://host:port",
            address
        ))
    })
}

/// configuration of a [`Publisher`]
///
/// built incrementally; a session takes an immutable copy at bind time and
/// later mutation of the caller's options has no effect on it.
///
/// [`Publisher`]: crate::Publisher
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublisherOptions {
    address: String,
    high_water_mark: usize,
    time_out: Option<Duration>,
    zap_options: ZapOptions,
}

impl PublisherOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// the endpoint to bind, e.g. `tcp://127.0.0.1:8080`; rejects blank
    /// values
    pub fn set_address(&mut self, address: &str) -> Result<(), InvalidArgument> {
        if address.chars().all(char::is_whitespace) {
            return Err(InvalidArgument::new("address is empty"));
        }
        self.address = address.to_string();
        Ok(())
    }

    /// the configured endpoint; `None` until set
    pub fn address(&self) -> Option<&str> {
        if self.address.is_empty() {
            None
        } else {
            Some(&self.address)
        }
    }

    /// maximum number of queued-but-undelivered outbound messages before
    /// sends start blocking; 0 means unbounded queueing
    pub fn set_high_water_mark(&mut self, high_water_mark: usize) {
        self.high_water_mark = high_water_mark;
    }

    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    /// how long a send blocked on back-pressure waits before failing;
    /// `None` (the default) waits forever
    pub fn set_time_out(&mut self, time_out: Option<Duration>) {
        self.time_out = time_out;
    }

    pub fn time_out(&self) -> Option<Duration> {
        self.time_out
    }

    pub fn set_zap_options(&mut self, zap_options: ZapOptions) {
        self.zap_options = zap_options;
    }

    pub fn zap_options(&self) -> &ZapOptions {
        &self.zap_options
    }

    /// reset every field to its default: no address, high-water mark 0,
    /// no time out, grasslands policy
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// configuration of a [`Subscriber`]
///
/// like [`PublisherOptions`] but on the receive side, plus the set of
/// message kinds the subscriber accepts. The registry is copied in and
/// copied out again at connect time, so a session never observes later
/// mutation of the caller's registry.
///
/// [`Subscriber`]: crate::Subscriber
#[derive(Debug, Clone, Default)]
pub struct SubscriberOptions {
    address: String,
    high_water_mark: usize,
    time_out: Option<Duration>,
    zap_options: ZapOptions,
    message_types: Messages,
}

impl SubscriberOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// the endpoint to connect to, e.g. `tcp://127.0.0.1:8080`; rejects
    /// blank values
    pub fn set_address(&mut self, address: &str) -> Result<(), InvalidArgument> {
        if address.chars().all(char::is_whitespace) {
            return Err(InvalidArgument::new("address is empty"));
        }
        self.address = address.to_string();
        Ok(())
    }

    /// the configured endpoint; `None` until set
    pub fn address(&self) -> Option<&str> {
        if self.address.is_empty() {
            None
        } else {
            Some(&self.address)
        }
    }

    /// maximum number of received-but-unread messages the session caches
    /// before it stops reading the socket; 0 means unbounded
    pub fn set_high_water_mark(&mut self, high_water_mark: usize) {
        self.high_water_mark = high_water_mark;
    }

    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    /// how long a receive blocks waiting for a message before failing;
    /// `None` (the default) waits forever
    pub fn set_time_out(&mut self, time_out: Option<Duration>) {
        self.time_out = time_out;
    }

    pub fn time_out(&self) -> Option<Duration> {
        self.time_out
    }

    pub fn set_zap_options(&mut self, zap_options: ZapOptions) {
        self.zap_options = zap_options;
    }

    pub fn zap_options(&self) -> &ZapOptions {
        &self.zap_options
    }

    /// the message kinds to accept; must not be empty
    pub fn set_message_types(&mut self, message_types: Messages) -> Result<(), InvalidArgument> {
        if message_types.is_empty() {
            return Err(InvalidArgument::new("no message types set"));
        }
        self.message_types = message_types;
        Ok(())
    }

    pub fn message_types(&self) -> &Messages {
        &self.message_types
    }

    pub fn have_message_types(&self) -> bool {
        !self.message_types.is_empty()
    }

    /// reset every field to its default: no address, high-water mark 0,
    /// no time out, grasslands policy, empty registry
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
