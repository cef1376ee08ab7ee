//! Current-role selector

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Role name used when no selector has been configured
pub const DEFAULT_ROLE: &str = "guest";

/// Closure producing the role names that apply at check time
pub type SelectorFn = Arc<dyn Fn() -> Vec<String> + Send + Sync>;

/// Determines which role(s) apply to the acting principal
#[derive(Clone)]
pub enum RoleSelector {
    /// A fixed, ordered list of role names
    Fixed(Vec<String>),
    /// Re-resolved on every permission check, never cached
    Dynamic(SelectorFn),
}

impl RoleSelector {
    /// Selector for a single role name
    pub fn role(name: impl Into<String>) -> Self {
        RoleSelector::Fixed(vec![name.into()])
    }

    /// Selector backed by a closure (e.g. reading the current session)
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn() -> Vec<String> + Send + Sync + 'static,
    {
        RoleSelector::Dynamic(Arc::new(f))
    }

    /// Resolve the role names as of now
    pub fn resolve(&self) -> Vec<String> {
        match self {
            RoleSelector::Fixed(roles) => roles.clone(),
            RoleSelector::Dynamic(source) => source(),
        }
    }
}

impl Default for RoleSelector {
    fn default() -> Self {
        RoleSelector::role(DEFAULT_ROLE)
    }
}

impl fmt::Debug for RoleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleSelector::Fixed(roles) => f.debug_tuple("Fixed").field(roles).finish(),
            RoleSelector::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

impl PartialEq for RoleSelector {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RoleSelector::Fixed(a), RoleSelector::Fixed(b)) => a == b,
            (RoleSelector::Dynamic(a), RoleSelector::Dynamic(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq<&str> for RoleSelector {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, RoleSelector::Fixed(roles) if roles.len() == 1 && roles[0] == *other)
    }
}

impl From<&str> for RoleSelector {
    fn from(name: &str) -> Self {
        RoleSelector::role(name)
    }
}

impl From<String> for RoleSelector {
    fn from(name: String) -> Self {
        RoleSelector::role(name)
    }
}

impl From<Vec<String>> for RoleSelector {
    fn from(names: Vec<String>) -> Self {
        RoleSelector::Fixed(names)
    }
}

impl From<Vec<&str>> for RoleSelector {
    fn from(names: Vec<&str>) -> Self {
        RoleSelector::Fixed(names.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RoleSelector {
    fn from(names: [&str; N]) -> Self {
        RoleSelector::Fixed(names.into_iter().map(String::from).collect())
    }
}

/// Declarative selector as written in role files: a single name or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorValue {
    One(String),
    Many(Vec<String>),
}

impl From<SelectorValue> for RoleSelector {
    fn from(value: SelectorValue) -> Self {
        match value {
            SelectorValue::One(name) => RoleSelector::role(name),
            SelectorValue::Many(names) => RoleSelector::Fixed(names),
        }
    }
}
