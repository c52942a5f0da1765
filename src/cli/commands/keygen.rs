//! `fieldvault keygen` — print a fresh encryption key for configuration.

use console::style;

use crate::cli::output;
use crate::cli::{resolve_settings, Cli};
use crate::crypto::generate_key_hex;
use crate::errors::Result;

/// Execute the `keygen` command.
pub fn execute(cli: &Cli, raw: bool) -> Result<()> {
    let secret = generate_key_hex();

    if raw {
        println!("{secret}");
        return Ok(());
    }

    let cwd = std::env::current_dir()?;
    let settings = resolve_settings(cli, &cwd)?;

    output::success("Encryption secret generated.");
    output::info(&format!(
        "Add the following line to your {} file:",
        settings.env_file
    ));
    println!();
    println!("{}", style(format!("{}={secret}", settings.key_env)).bold());
    println!();
    output::tip(
        "Keep this key safe and out of version control. Losing it makes encrypted fields unrecoverable.",
    );

    if settings.env_file_path(&cwd).exists() {
        output::warning(&format!(
            "{} already exists. Replace any existing {} value rather than adding a second one.",
            settings.env_file, settings.key_env
        ));
    }

    Ok(())
}
