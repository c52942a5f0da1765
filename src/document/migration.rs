//! Detection of legacy plaintext secrets.

use serde_json::Value;

use super::codec::any_sensitive;
use crate::crypto::Envelope;

/// Returns `true` if any non-empty sensitive string in `doc` is not yet
/// an encrypted envelope.
pub fn needs_migration(doc: &Value) -> bool {
    any_sensitive(doc, |_, value| !value.is_empty() && !Envelope::is_envelope(value))
}
