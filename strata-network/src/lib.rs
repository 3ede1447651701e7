/*!
# Strata pub/sub sessions

this crate implements the session layer of the strata messaging core.

1. A [`Publisher`] binds a TCP endpoint and fans every message out to the
   subscribers connected to it, as a `(type tag, payload)` frame, subject
   to the flow control configured in its [`PublisherOptions`].
2. A [`Subscriber`] connects to a publisher, reads frames, and uses the
   message-type registry from its [`SubscriberOptions`] to materialize the
   typed message behind each tag. Kinds it does not know are logged and
   dropped so a long-lived session survives senders it does not yet
   understand.
3. The [`auth`] module carries the credentials and the ZAP-style policy
   object that parameterize the transport's authentication handshake; the
   core validates them and hands them over, it performs no cryptography
   itself.

Both sessions honor their configured time outs and can be closed from
another task while a send or receive is blocked.
*/

pub mod auth;
mod error;
mod frame;
mod options;
mod publisher;
mod subscriber;

pub use self::{
    error::{InvalidConfiguration, SessionError},
    frame::{Frame, MAX_FRAME_LENGTH},
    options::{PublisherOptions, SubscriberOptions},
    publisher::Publisher,
    subscriber::Subscriber,
};
