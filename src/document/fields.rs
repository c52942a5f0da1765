//! Which JSON properties hold secrets.

/// Property names that are sensitive wherever they appear.
const SENSITIVE_FIELDS: &[&str] = &["password", "token"];

/// Object that holds mail server credentials.
const SMTP_SETTINGS: &str = "smtpSettings";

/// Password property inside `smtpSettings`.
const SMTP_PASS: &str = "pass";

/// Returns `true` if the property `key` must be stored encrypted.
///
/// `parent` is the key of the object that contains `key` (`None` at the
/// top level).  It only matters for `smtpSettings.pass`.
pub fn is_sensitive(parent: Option<&str>, key: &str) -> bool {
    SENSITIVE_FIELDS.contains(&key) || (key == SMTP_PASS && parent == Some(SMTP_SETTINGS))
}
