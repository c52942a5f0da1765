//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::store::MigrationOutcome;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a dim hint on stderr, next to an error.
pub fn hint(msg: &str) {
    eprintln!("  {} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of migration results (File, Status).
pub fn print_migration_table(results: &[(String, MigrationOutcome)]) {
    if results.is_empty() {
        info("No collection files in the data directory yet.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["File", "Status"]);

    for (name, outcome) in results {
        let status = match outcome {
            MigrationOutcome::Migrated => "migrated".to_string(),
            MigrationOutcome::UpToDate => "up to date".to_string(),
            MigrationOutcome::Corrupt(reason) => format!("skipped: invalid JSON ({reason})"),
        };
        table.add_row(vec![name.clone(), status]);
    }

    println!("{table}");
}
