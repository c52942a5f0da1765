//! Project configuration (`.fieldvault.toml`).

pub mod settings;

pub use settings::Settings;
