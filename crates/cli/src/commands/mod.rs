//! CLI Commands

pub mod check;
pub mod merge;
pub mod roles;

pub use check::CheckCommand;
pub use merge::MergeCommand;
pub use roles::RolesCommand;

use anyhow::Context;
use rbac::{RoleLoader, RoleRegistry};
use std::path::PathBuf;
use tracing::debug;

/// Build a registry from role files, applied in the order given
pub fn load_registry(files: &[PathBuf]) -> anyhow::Result<RoleRegistry> {
    let mut loader = RoleLoader::new();
    for path in files {
        loader
            .load_file(path)
            .with_context(|| format!("Failed to load role file {}", path.display()))?;
    }
    let registry = loader.build_registry()?;
    debug!(
        files = files.len(),
        roles = registry.roles().len(),
        "Built registry from role files"
    );
    Ok(registry)
}
