//! RoleRegistry - Role definitions and permission checking

use crate::merge::merge;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{
    AbilityMap, DuplicateRoleError, RegistryConfig, Result, RoleSelector, UnknownRoleError,
};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// One input to [`RoleRegistry::define`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleSource {
    /// Inherit the resolved abilities of an already defined role
    Role(String),
    /// Layer an ability map on top
    Abilities(AbilityMap),
}

impl From<&str> for RoleSource {
    fn from(name: &str) -> Self {
        RoleSource::Role(name.to_string())
    }
}

impl From<String> for RoleSource {
    fn from(name: String) -> Self {
        RoleSource::Role(name)
    }
}

impl From<AbilityMap> for RoleSource {
    fn from(map: AbilityMap) -> Self {
        RoleSource::Abilities(map)
    }
}

/// RoleRegistry owns the resolved ability map of every role and the
/// selector deciding which roles apply when a permission is checked
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    /// Role name -> resolved abilities
    roles: BTreeMap<String, AbilityMap>,
    /// Current role selector
    current: RoleSelector,
    config: RegistryConfig,
}

impl RoleRegistry {
    /// Create an empty registry with the "guest" role selected
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            roles: BTreeMap::new(),
            current: RoleSelector::role(config.default_role.clone()),
            config,
        }
    }

    /// Compose ability maps without touching the registry
    pub fn merge<'a, I>(maps: I) -> AbilityMap
    where
        I: IntoIterator<Item = &'a AbilityMap>,
    {
        merge(maps)
    }

    /// Define a role from ability maps and/or names of existing roles.
    ///
    /// Sources are merged in order, so later ones override earlier ones
    /// (including revocations). Redefining an existing name fails and
    /// leaves the registry untouched.
    pub fn define<I, S>(&mut self, name: impl Into<String>, sources: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<RoleSource>,
    {
        let name = name.into();
        if self.roles.contains_key(&name) {
            return Err(DuplicateRoleError { role: name }.into());
        }

        let sources: Vec<RoleSource> = sources.into_iter().map(Into::into).collect();
        let mut layers: Vec<&AbilityMap> = Vec::with_capacity(sources.len());

        for source in &sources {
            match source {
                RoleSource::Abilities(map) => layers.push(map),
                RoleSource::Role(parent) => match self.roles.get(parent) {
                    Some(map) => layers.push(map),
                    None if self.config.strict_inheritance => {
                        return Err(UnknownRoleError {
                            role: parent.clone(),
                            available_roles: self.roles.keys().cloned().collect(),
                        }
                        .into());
                    }
                    None => {
                        warn!(
                            role = %name,
                            parent = %parent,
                            "Inherited role is not defined, ignoring it"
                        );
                    }
                },
            }
        }

        let resolved = merge(layers);
        debug!(role = %name, entities = resolved.len(), "Defined role");
        self.roles.insert(name, resolved);
        Ok(())
    }

    /// Drop every role and restore the default selector
    pub fn reset(&mut self) {
        debug!(dropped = self.roles.len(), "Resetting role registry");
        self.roles.clear();
        self.current = RoleSelector::role(self.config.default_role.clone());
    }

    /// Check whether any current role allows `action` on `entity`.
    ///
    /// `args` are handed to predicate abilities (typically the object being
    /// accessed). Unknown roles, entities and actions deny; this never fails.
    pub fn can(&self, action: &str, entity: &str, args: &[Value]) -> bool {
        let current = self.current.resolve();
        let granted_by = current
            .iter()
            .find(|role| self.role_allows(role, action, entity, args));

        trace!(
            action,
            entity,
            roles = ?current,
            granted_by = ?granted_by,
            "Permission check"
        );
        granted_by.is_some()
    }

    /// Check a single role regardless of the current selector
    pub fn role_allows(&self, role: &str, action: &str, entity: &str, args: &[Value]) -> bool {
        self.roles
            .get(role)
            .and_then(|abilities| abilities.ability(entity, action))
            .is_some_and(|ability| ability.evaluate(args))
    }

    /// All resolved roles, for inspection
    pub fn roles(&self) -> &BTreeMap<String, AbilityMap> {
        &self.roles
    }

    /// Get a role's resolved abilities
    pub fn role(&self, name: &str) -> Option<&AbilityMap> {
        self.roles.get(name)
    }

    /// Check if role exists
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }

    /// Get all role names, sorted
    pub fn role_names(&self) -> Vec<&str> {
        self.roles.keys().map(|s| s.as_str()).collect()
    }

    pub fn current(&self) -> &RoleSelector {
        &self.current
    }

    /// Replace the current role selector
    pub fn set_current(&mut self, selector: impl Into<RoleSelector>) {
        self.current = selector.into();
    }

    /// Role names the current selector resolves to right now
    pub fn current_roles(&self) -> Vec<String> {
        self.current.resolve()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
