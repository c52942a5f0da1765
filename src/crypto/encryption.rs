//! AES-256-GCM encryption of single string values.
//!
//! Each call to `encrypt` draws a fresh random 16-byte IV and returns
//! the value as an [`Envelope`] string:
//!   `iv::tag::ciphertext` (lowercase hex)
//!
//! `decrypt` is strict and reports every failure.  The document layer
//! uses `decrypt_or_passthrough` instead, which hands back the input
//! unchanged for legacy plaintext and for values that fail
//! authentication, so one bad field never makes a whole file unusable.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit, OsRng};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use tracing::warn;
use zeroize::Zeroize;

use super::envelope::{Envelope, IV_LEN, TAG_LEN};
use super::keys::MasterKey;
use crate::errors::{FieldVaultError, Result};

/// AES-256-GCM with a 16-byte nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Encrypt `plaintext` with the master key.
pub fn encrypt(key: &MasterKey, plaintext: &str) -> Result<String> {
    let cipher = Aes256Gcm16::new_from_slice(key.as_bytes())
        .map_err(|e| FieldVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    // Never reuse an IV under the same key.
    let nonce = Aes256Gcm16::generate_nonce(&mut OsRng);

    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(&nonce, b"", &mut buffer)
        .map_err(|e| FieldVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&nonce);
    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);

    Ok(Envelope {
        iv,
        tag: tag_bytes,
        ciphertext: buffer,
    }
    .to_string())
}

/// Decrypt an envelope produced by `encrypt`.
///
/// Fails with `InvalidEnvelope` if `text` is not in envelope form and
/// with `DecryptionFailed` if the auth tag does not verify.
pub fn decrypt(key: &MasterKey, text: &str) -> Result<String> {
    let envelope = Envelope::parse(text)?;
    open(key, &envelope)
}

/// Decrypt `text`, falling back to returning it unchanged.
///
/// Input that is not an envelope is legacy plaintext and comes back
/// as-is.  An envelope that fails authentication is logged and also
/// comes back as-is.
pub fn decrypt_or_passthrough(key: &MasterKey, text: &str) -> String {
    let Ok(envelope) = Envelope::parse(text) else {
        return text.to_string();
    };

    match open(key, &envelope) {
        Ok(plaintext) => plaintext,
        Err(e) => {
            warn!(
                error = %e,
                "decryption failed, data may be corrupt or the key incorrect; returning raw value"
            );
            text.to_string()
        }
    }
}

fn open(key: &MasterKey, envelope: &Envelope) -> Result<String> {
    let cipher =
        Aes256Gcm16::new_from_slice(key.as_bytes()).map_err(|_| FieldVaultError::DecryptionFailed)?;

    let mut buffer = envelope.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(&envelope.iv),
            b"",
            &mut buffer,
            GenericArray::from_slice(&envelope.tag),
        )
        .map_err(|_| FieldVaultError::DecryptionFailed)?;

    String::from_utf8(buffer).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        FieldVaultError::DecryptionFailed
    })
}
