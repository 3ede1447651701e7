/*!
authentication credentials and the policy object that selects an
authentication mode

the core performs no cryptography: these types validate and carry the
configuration the transport's handshake layer consumes at bind/connect
time. See [`ZapOptions`] for the mode selection.
*/

mod keys;
mod user_name_and_password;
mod zap;

pub use self::{
    keys::{Keys, KEY_LENGTH},
    user_name_and_password::UserNameAndPassword,
    zap::{SecurityLevel, ZapOptions},
};
