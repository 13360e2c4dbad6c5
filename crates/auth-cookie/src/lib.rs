//! Tamper-evident authentication cookie codec
//!
//! The login gateway keeps no server-side session state: the whole
//! handshake continuation lives in a single browser cookie. This crate
//! owns that cookie's shape and wire format.
//!
//! A cookie value is `base64url(JSON payload) . base64url(HMAC tag)`.
//! The tag is computed with the newest key of a rotating [`Keyring`];
//! verification accepts any key still in the ring, so keys can be
//! retired gradually without logging every user out at once.
//!
//! Decoding is fail-closed: a value that doesn't verify or doesn't
//! match one of the permitted payload shapes degrades to
//! [`AuthCookie::Empty`]. Callers never see an error from a forged or
//! corrupted cookie — it is indistinguishable from no cookie at all.

mod codec;
mod cookie;
mod error;
mod keyring;

pub use codec::{decode, encode};
pub use cookie::AuthCookie;
pub use error::{Error, Result};
pub use keyring::Keyring;
