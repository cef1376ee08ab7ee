//! Thread-safe handle around a [`RoleRegistry`]
//!
//! Writers (`define`, `reset`, `set_current`) take the write lock, permission
//! checks take the read lock. A poisoned lock surfaces as [`RbacError::Lock`]
//! for writers and as a denial for `can`.

use crate::role_registry::{RoleRegistry, RoleSource};
use serde_json::Value;
use shared::{AbilityMap, RbacError, RegistryConfig, Result, RoleSelector};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::error;

#[derive(Debug, Clone, Default)]
pub struct SharedRoleRegistry {
    inner: Arc<RwLock<RoleRegistry>>,
}

impl SharedRoleRegistry {
    pub fn new() -> Self {
        Self::from_registry(RoleRegistry::new())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self::from_registry(RoleRegistry::with_config(config))
    }

    pub fn from_registry(registry: RoleRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RoleRegistry>> {
        self.inner
            .read()
            .map_err(|_| RbacError::Lock("Failed to acquire read lock".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, RoleRegistry>> {
        self.inner
            .write()
            .map_err(|_| RbacError::Lock("Failed to acquire write lock".to_string()))
    }

    pub fn define<I, S>(&self, name: impl Into<String>, sources: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<RoleSource>,
    {
        self.write()?.define(name, sources)
    }

    pub fn reset(&self) -> Result<()> {
        self.write()?.reset();
        Ok(())
    }

    pub fn set_current(&self, selector: impl Into<RoleSelector>) -> Result<()> {
        self.write()?.set_current(selector);
        Ok(())
    }

    /// Same as [`RoleRegistry::can`]; denies when the lock is poisoned
    pub fn can(&self, action: &str, entity: &str, args: &[Value]) -> bool {
        match self.read() {
            Ok(registry) => registry.can(action, entity, args),
            Err(err) => {
                error!(action, entity, error = %err, "Permission check failed closed");
                false
            }
        }
    }

    /// Snapshot of a role's resolved abilities
    pub fn role(&self, name: &str) -> Result<Option<AbilityMap>> {
        Ok(self.read()?.role(name).cloned())
    }

    pub fn role_names(&self) -> Result<Vec<String>> {
        Ok(self
            .read()?
            .role_names()
            .into_iter()
            .map(String::from)
            .collect())
    }

    /// Run a closure with shared access to the registry
    pub fn with_registry<T>(&self, f: impl FnOnce(&RoleRegistry) -> T) -> Result<T> {
        Ok(f(&*self.read()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn create_test_registry() -> SharedRoleRegistry {
        let shared = SharedRoleRegistry::new();
        shared
            .define("guest", [AbilityMap::new().grant("books", "read", true)])
            .unwrap();
        shared
            .define(
                "admin",
                [
                    RoleSource::from("guest"),
                    AbilityMap::new().grant("books", "delete", true).into(),
                ],
            )
            .unwrap();
        shared
    }

    #[test]
    fn test_shared_define_and_can() {
        let shared = create_test_registry();

        assert!(shared.can("read", "books", &[]));
        assert!(!shared.can("delete", "books", &[]));

        shared.set_current("admin").unwrap();
        assert!(shared.can("delete", "books", &[]));
    }

    #[test]
    fn test_shared_duplicate_rejected() {
        let shared = create_test_registry();
        let result = shared.define("guest", [AbilityMap::new()]);

        assert!(matches!(result, Err(RbacError::DuplicateRole(_))));
    }

    #[test]
    fn test_shared_reset() {
        let shared = create_test_registry();
        shared.set_current("admin").unwrap();
        shared.reset().unwrap();

        assert!(shared.role_names().unwrap().is_empty());
        let current = shared.with_registry(|r| r.current().clone()).unwrap();
        assert_eq!(current, "guest");
    }

    #[test]
    fn test_shared_across_threads() {
        let shared = create_test_registry();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = shared.clone();
                thread::spawn(move || registry.can("read", "books", &[]))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    #[test]
    fn test_shared_role_snapshot() {
        let shared = create_test_registry();
        let admin = shared.role("admin").unwrap().unwrap();

        assert!(admin.ability("books", "read").is_some());
        assert!(shared.role("missing").unwrap().is_none());
    }

    #[test]
    fn test_poisoned_lock_denies() {
        let shared = create_test_registry();
        let poisoner = shared.clone();

        let _ = thread::spawn(move || {
            let _guard = poisoner.inner.write().unwrap();
            panic!("poison the registry lock");
        })
        .join();

        assert!(!shared.can("read", "books", &[]));
        assert!(matches!(shared.reset(), Err(RbacError::Lock(_))));
    }
}
