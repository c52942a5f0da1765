//! `fieldvault decrypt` — recover the plaintext of one encrypted value.

use crate::cli::output;
use crate::cli::{key_manager, Cli};
use crate::crypto::decrypt;
use crate::errors::{FieldVaultError, Result};

/// Execute the `decrypt` command.
pub fn execute(cli: &Cli, value: &str, raw: bool) -> Result<()> {
    let keys = key_manager(cli)?;
    let key = keys.get_key()?;

    let plaintext = match decrypt(key, value) {
        Ok(plaintext) => plaintext,
        Err(FieldVaultError::DecryptionFailed) => {
            output::error("Decryption failed. Possible causes:");
            output::hint(
                "the configured encryption secret is not the one this value was encrypted with",
            );
            output::hint("the value is corrupted or was truncated when copied");
            return Err(FieldVaultError::DecryptionFailed);
        }
        Err(e) => return Err(e),
    };

    if raw {
        println!("{plaintext}");
    } else {
        output::success("Decryption successful.");
        println!("{plaintext}");
    }

    Ok(())
}
