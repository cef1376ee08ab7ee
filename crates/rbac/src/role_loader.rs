//! RoleLoader - Load declarative role definitions from YAML/JSON files

use crate::role_registry::{RoleRegistry, RoleSource};
use serde::{Deserialize, Serialize};
use shared::{read_document, RegistryConfig, Result, SelectorValue};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A role as written in a role file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDefinition {
    /// Unique role name
    pub name: String,

    /// Role names to inherit from and/or ability maps, merged in order
    #[serde(default)]
    pub sources: Vec<RoleSource>,
}

/// Contents of one role file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleFile {
    /// Registry settings, used when the file builds a fresh registry
    #[serde(default)]
    pub settings: Option<RegistryConfig>,

    /// Initial role selector
    #[serde(default)]
    pub current: Option<SelectorValue>,

    /// Roles, defined in file order
    #[serde(default)]
    pub roles: Vec<RoleDefinition>,
}

impl RoleFile {
    /// Load a role file (`.json` as JSON, anything else as YAML)
    pub fn from_file(path: &Path) -> Result<Self> {
        read_document(path)
    }

    /// Define every role of this file in the registry, then apply `current`.
    /// On error the registry is left as it was.
    pub fn apply(&self, registry: &mut RoleRegistry) -> Result<()> {
        let mut staged = registry.clone();
        self.apply_to(&mut staged)?;
        *registry = staged;
        Ok(())
    }

    fn apply_to(&self, registry: &mut RoleRegistry) -> Result<()> {
        for role in &self.roles {
            registry.define(role.name.clone(), role.sources.iter().cloned())?;
        }

        if let Some(current) = &self.current {
            registry.set_current(current.clone());
        }

        Ok(())
    }

    /// Build a fresh registry configured by `settings`
    pub fn into_registry(self) -> Result<RoleRegistry> {
        let config = self.settings.clone().unwrap_or_default();
        config.validate()?;

        let mut registry = RoleRegistry::with_config(config);
        self.apply_to(&mut registry)?;
        Ok(registry)
    }
}

/// Role file loader
#[derive(Debug, Default)]
pub struct RoleLoader {
    files: Vec<(PathBuf, RoleFile)>,
}

impl RoleLoader {
    /// Create a new RoleLoader
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a single role file
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let file = RoleFile::from_file(path)?;
        debug!(path = %path.display(), roles = file.roles.len(), "Loaded role file");
        self.files.push((path.to_path_buf(), file));
        Ok(())
    }

    /// Load every file matching a glob pattern, in sorted path order.
    /// Returns the number of files loaded.
    pub fn load_glob(&mut self, pattern: &str) -> Result<usize> {
        let mut paths = Vec::new();
        for entry in glob::glob(pattern)? {
            paths.push(entry.map_err(glob::GlobError::into_error)?);
        }
        paths.sort();

        for path in &paths {
            self.load_file(path)?;
        }
        Ok(paths.len())
    }

    /// Load every `*.yaml`, `*.yml` and `*.json` file of a directory
    pub fn load_from_directory(&mut self, dir: &Path) -> Result<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let base = glob::Pattern::escape(&dir.to_string_lossy());
        let mut paths = Vec::new();
        for ext in ["yaml", "yml", "json"] {
            for entry in glob::glob(&format!("{}/*.{}", base, ext))? {
                paths.push(entry.map_err(glob::GlobError::into_error)?);
            }
        }
        paths.sort();

        for path in &paths {
            self.load_file(path)?;
        }
        Ok(paths.len())
    }

    /// Get loaded files
    pub fn files(&self) -> &[(PathBuf, RoleFile)] {
        &self.files
    }

    /// Apply every loaded file to a registry, in load order.
    /// Either every file applies or the registry is left as it was.
    pub fn apply(&self, registry: &mut RoleRegistry) -> Result<()> {
        let mut staged = registry.clone();
        self.apply_to(&mut staged)?;
        *registry = staged;
        Ok(())
    }

    fn apply_to(&self, registry: &mut RoleRegistry) -> Result<()> {
        for (_, file) in &self.files {
            file.apply_to(registry)?;
        }
        Ok(())
    }

    /// Build a registry from all loaded files; settings come from the first
    /// file that declares them
    pub fn build_registry(&self) -> Result<RoleRegistry> {
        let config = self
            .files
            .iter()
            .find_map(|(_, file)| file.settings.clone())
            .unwrap_or_default();
        config.validate()?;

        let mut registry = RoleRegistry::with_config(config);
        self.apply_to(&mut registry)?;
        Ok(registry)
    }
}
