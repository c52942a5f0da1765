//! `fieldvault migrate` — encrypt legacy plaintext secrets in every
//! collection file of the data directory.
//!
//! Reading a collection through the library migrates it too; this
//! command does it up front for the whole directory and never resets a
//! file it cannot parse.

use crate::cli::output;
use crate::cli::{collection_store, Cli};
use crate::errors::Result;
use crate::store::MigrationOutcome;

/// Execute the `migrate` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let store = collection_store(cli)?;

    // Fail on a bad key before looking at any file.
    store.keys().get_key()?;

    let names = store.list_collections()?;
    let mut results = Vec::with_capacity(names.len());
    for name in names {
        let outcome = store.migrate_file(&name)?;
        results.push((name, outcome));
    }

    output::print_migration_table(&results);

    let migrated = results
        .iter()
        .filter(|(_, o)| *o == MigrationOutcome::Migrated)
        .count();
    let corrupt = results
        .iter()
        .filter(|(_, o)| matches!(o, MigrationOutcome::Corrupt(_)))
        .count();

    if corrupt > 0 {
        output::warning(&format!(
            "{corrupt} file(s) are not valid JSON and were left untouched."
        ));
    }
    output::success(&format!(
        "{migrated} of {} collection file(s) migrated in {}",
        results.len(),
        store.data_dir().display()
    ));

    Ok(())
}
