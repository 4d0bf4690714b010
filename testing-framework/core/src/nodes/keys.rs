use ed25519_dalek::{SECRET_KEY_LENGTH, SigningKey};
use rand::{Rng as _, thread_rng};

/// Produce a fresh ed25519 signing identity. Every call yields a new key.
#[must_use]
pub fn generate_signing_key() -> SigningKey {
    let mut secret = [0u8; SECRET_KEY_LENGTH];
    thread_rng().fill(&mut secret[..]);
    SigningKey::from_bytes(&secret)
}
