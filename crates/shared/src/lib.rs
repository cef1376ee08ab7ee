//! # rolecheck Shared
//!
//! Common types used by the role registry and the CLI.

pub mod ability;
pub mod config;
pub mod error;
pub mod selector;

// Re-exports
pub use ability::*;
pub use config::*;
pub use error::*;
pub use selector::*;
