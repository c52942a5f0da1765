//! JSON document handling: which fields are secret and how to rewrite
//! them.
//!
//! This module provides:
//! - The sensitive-field classifier (`fields`)
//! - The generic sensitive-leaf transform (`codec`)
//! - Legacy plaintext detection (`migration`)

pub mod codec;
pub mod fields;
pub mod migration;

pub use codec::{any_sensitive, transform, try_transform};
pub use fields::is_sensitive;
pub use migration::needs_migration;
