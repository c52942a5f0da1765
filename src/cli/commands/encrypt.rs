//! `fieldvault encrypt` — produce an envelope for a single value.

use std::io::{self, IsTerminal, Read};

use crate::cli::output;
use crate::cli::{key_manager, Cli};
use crate::crypto::encrypt;
use crate::errors::{FieldVaultError, Result};

/// Execute the `encrypt` command.
pub fn execute(cli: &Cli, value: Option<&str>) -> Result<()> {
    let plaintext = if let Some(v) = value {
        output::warning("Value provided on command line; it may appear in shell history.");
        v.to_string()
    } else if !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf.trim_end_matches(['\r', '\n']).to_string()
    } else {
        return Err(FieldVaultError::CommandFailed(
            "no value given: pass it as an argument or pipe it on stdin".into(),
        ));
    };

    let keys = key_manager(cli)?;
    let envelope = encrypt(keys.get_key()?, &plaintext)?;
    println!("{envelope}");

    Ok(())
}
