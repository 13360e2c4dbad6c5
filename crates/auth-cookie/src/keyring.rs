//! Rotating HMAC key set
//!
//! An ordered list of symmetric keys: index 0 is the designated signing
//! key, every key in the list is accepted for verification. Rotation is
//! a config change — prepend the new key, keep the old one around for a
//! grace window, then drop it. Cookies signed with a dropped key stop
//! verifying and decode as empty, forcing a fresh handshake.

use common::Secret;
use ring::hmac;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

/// Ordered set of HMAC-SHA256 keys. Newest signs, all verify.
pub struct Keyring {
    keys: Vec<hmac::Key>,
}

impl Keyring {
    /// Build a keyring from raw key material, newest first.
    ///
    /// Rejects an empty list and empty keys — a gateway with no usable
    /// signing key must fail at startup, not mint unverifiable cookies.
    pub fn new(material: &[Secret<String>]) -> Result<Self> {
        if material.is_empty() {
            return Err(Error::EmptyKeyring);
        }
        let mut keys = Vec::with_capacity(material.len());
        for (index, secret) in material.iter().enumerate() {
            let bytes = secret.expose().as_bytes();
            if bytes.is_empty() {
                return Err(Error::EmptyKey { index });
            }
            keys.push(hmac::Key::new(hmac::HMAC_SHA256, bytes));
        }
        Ok(Self { keys })
    }

    /// Compute the authentication tag for `message` with the newest key.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        hmac::sign(&self.keys[0], message).as_ref().to_vec()
    }

    /// Verify `tag` against every accepted key, constant-time per key.
    ///
    /// Accepts the first match so cookies signed before a rotation stay
    /// valid while the old key remains in the ring.
    pub fn verify(&self, message: &[u8], tag: &[u8]) -> bool {
        self.keys.iter().any(|key| {
            let expected = hmac::sign(key, message);
            expected.as_ref().ct_eq(tag).into()
        })
    }

    /// Number of accepted keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the ring has no keys. Always false for a constructed ring.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
