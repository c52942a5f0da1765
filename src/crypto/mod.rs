//! Cryptographic primitives for fieldvault.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption of single values (`encryption`)
//! - The `iv::tag::ciphertext` text format (`envelope`)
//! - Master key loading and caching (`keys`)

pub mod encryption;
pub mod envelope;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, KeyManager, ...};
pub use encryption::{decrypt, decrypt_or_passthrough, encrypt};
pub use envelope::Envelope;
pub use keys::{generate_key_hex, KeyManager, MasterKey, DEFAULT_KEY_ENV};
