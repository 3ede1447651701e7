/*!
# Strata message formats

the typed messages moving through a strata sensor network and the registry
a receiver uses to decode them.

Every message kind is self describing: its CBOR payload embeds the kind's
unique type tag, and the tag travels ahead of the payload on the wire so a
receiver can pick the right decoder without inspecting the payload. The
[`Messages`] registry maps tags to prototypes and materializes fresh
instances for incoming messages.

The core kinds are [`Text`] notices, [`Failure`] reports, [`DataPacket`]
time-series chunks, [`Pick`] phase arrivals and [`Heartbeat`] liveness
broadcasts. Applications add their own kinds by implementing [`Message`]
and registering a prototype.
*/

#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

mod data_packet;
mod error;
mod failure;
mod heartbeat;
mod message;
mod messages;
mod pick;
mod text;

pub use self::{
    data_packet::DataPacket,
    error::{DecodeError, EncodeError, InvalidArgument, RegistryError},
    failure::Failure,
    heartbeat::{Heartbeat, ModuleStatus},
    message::Message,
    messages::Messages,
    pick::{Pick, Polarity},
    text::Text,
};
