//! Common types for the login gateway workspace

mod secret;

pub use secret::Secret;
