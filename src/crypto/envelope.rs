//! Text format of one encrypted value.
//!
//! ```text
//! <iv hex>::<auth tag hex>::<ciphertext hex>
//! ```
//!
//! The iv and tag are 16 bytes each (32 hex chars).  The ciphertext has
//! the same length as the plaintext.  Anything that does not parse is
//! considered legacy plaintext by the callers.

use std::fmt;

use crate::errors::{FieldVaultError, Result};

/// Separator between the three hex segments.
pub const DELIMITER: &str = "::";

/// Size of the GCM initialization vector in bytes.
pub const IV_LEN: usize = 16;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// A parsed `iv::tag::ciphertext` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub iv: [u8; IV_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Parse the three-segment text form.
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(DELIMITER).collect();
        let [iv_hex, tag_hex, ct_hex] = parts.as_slice() else {
            return Err(FieldVaultError::InvalidEnvelope(format!(
                "expected 3 segments, found {}",
                parts.len()
            )));
        };

        let mut iv = [0u8; IV_LEN];
        hex::decode_to_slice(iv_hex, &mut iv)
            .map_err(|e| FieldVaultError::InvalidEnvelope(format!("iv: {e}")))?;

        let mut tag = [0u8; TAG_LEN];
        hex::decode_to_slice(tag_hex, &mut tag)
            .map_err(|e| FieldVaultError::InvalidEnvelope(format!("auth tag: {e}")))?;

        let ciphertext = hex::decode(ct_hex)
            .map_err(|e| FieldVaultError::InvalidEnvelope(format!("ciphertext: {e}")))?;

        Ok(Self {
            iv,
            tag,
            ciphertext,
        })
    }

    /// Returns `true` if `text` is a well-formed envelope.
    pub fn is_envelope(text: &str) -> bool {
        Self::parse(text).is_ok()
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}",
            hex::encode(self.iv),
            hex::encode(self.tag),
            hex::encode(&self.ciphertext)
        )
    }
}
