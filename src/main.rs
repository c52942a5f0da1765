use clap::Parser;
use fieldvault::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    // Library warnings (undecryptable fields, reset files) go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "fieldvault=warn".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Keygen { raw } => fieldvault::cli::commands::keygen::execute(&cli, raw),
        Commands::Decrypt { ref value, raw } => {
            fieldvault::cli::commands::decrypt::execute(&cli, value, raw)
        }
        Commands::Encrypt { ref value } => {
            fieldvault::cli::commands::encrypt::execute(&cli, value.as_deref())
        }
        Commands::Migrate => fieldvault::cli::commands::migrate::execute(&cli),
        Commands::Version => fieldvault::cli::commands::version::execute(),
        Commands::Completions { shell } => fieldvault::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        fieldvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
