//! Store module — encrypted-at-rest JSON collection files.
//!
//! This module provides:
//! - The on-disk file format and atomic writes (`format`)
//! - The high-level `CollectionStore` read/write surface (`collection`)

pub mod collection;
pub mod format;

// Re-export the most commonly used items.
pub use collection::{
    decrypt_document, encrypt_document, migrate_document, CollectionStore, MigrationOutcome,
};
