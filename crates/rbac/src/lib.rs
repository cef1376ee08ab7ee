//! # rolecheck RBAC
//!
//! Role-Based Access Control over entity/action ability maps.
//!
//! ## Components
//!
//! - `RoleRegistry` - Role definitions and permission checking
//! - `merge` - Two-level ability map composition
//! - `SharedRoleRegistry` - Lock-guarded registry handle for concurrent hosts
//! - `RoleLoader` - Declarative role files (YAML/JSON)
//!
//! ```
//! use rbac::{RoleRegistry, RoleSource};
//! use serde_json::json;
//! use shared::AbilityMap;
//!
//! let mut registry = RoleRegistry::new();
//! registry.define("guest", [AbilityMap::new().grant("books", "read", true)])?;
//! registry.define(
//!     "user",
//!     [
//!         RoleSource::from("guest"),
//!         AbilityMap::new()
//!             .grant_if("books", "update", |args| {
//!                 args.first().is_some_and(|book| book["authorId"] == 1)
//!             })
//!             .into(),
//!     ],
//! )?;
//!
//! registry.set_current("user");
//! assert!(registry.can("read", "books", &[]));
//! assert!(registry.can("update", "books", &[json!({ "authorId": 1 })]));
//! assert!(!registry.can("update", "books", &[json!({ "authorId": 2 })]));
//! # Ok::<(), shared::RbacError>(())
//! ```

pub mod merge;
pub mod role_loader;
pub mod role_registry;
pub mod shared_registry;

pub use merge::merge;
pub use role_loader::{RoleDefinition, RoleFile, RoleLoader};
pub use role_registry::{RoleRegistry, RoleSource};
pub use shared_registry::SharedRoleRegistry;
