//! Ability map types
//!
//! An [`AbilityMap`] is a two-level tree: entity name -> action name -> [`Ability`].
//! Entity entries may also be [`EntityAbilities::Revoked`], which only has meaning
//! while layering maps together: it erases whatever was accumulated for that entity.

use serde::de::Deserializer;
use serde::ser::{Error as _, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Dynamic grant rule, invoked with the subject arguments passed to `can`
pub type Predicate = Arc<dyn Fn(&[Value]) -> bool + Send + Sync>;

/// Grant rule for a single (entity, action) pair
#[derive(Clone)]
pub enum Ability {
    /// Fixed grant or denial
    Static(bool),
    /// Grant decided per call from the subject arguments
    Predicate(Predicate),
}

impl Ability {
    /// Wrap a closure as a predicate ability
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> bool + Send + Sync + 'static,
    {
        Ability::Predicate(Arc::new(f))
    }

    /// Resolve the grant for the given subject arguments
    pub fn evaluate(&self, args: &[Value]) -> bool {
        match self {
            Ability::Static(granted) => *granted,
            Ability::Predicate(predicate) => predicate(args),
        }
    }

    pub fn is_predicate(&self) -> bool {
        matches!(self, Ability::Predicate(_))
    }
}

impl From<bool> for Ability {
    fn from(granted: bool) -> Self {
        Ability::Static(granted)
    }
}

impl fmt::Debug for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ability::Static(granted) => f.debug_tuple("Static").field(granted).finish(),
            Ability::Predicate(_) => f.write_str("Predicate(<fn>)"),
        }
    }
}

impl PartialEq for Ability {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Ability::Static(a), Ability::Static(b)) => a == b,
            (Ability::Predicate(a), Ability::Predicate(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Serialize for Ability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Ability::Static(granted) => serializer.serialize_bool(*granted),
            Ability::Predicate(_) => Err(S::Error::custom(
                "predicate abilities cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Ability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // null behaves like a missing grant
        let granted = Option::<bool>::deserialize(deserializer)?;
        Ok(Ability::Static(granted.unwrap_or(false)))
    }
}

/// Action name -> ability
pub type Actions = BTreeMap<String, Ability>;

/// Abilities held for one entity
#[derive(Debug, Clone, PartialEq)]
pub enum EntityAbilities {
    /// Erase every ability accumulated so far for this entity
    Revoked,
    /// Per-action grant rules
    Granted(Actions),
}

impl EntityAbilities {
    pub fn actions(&self) -> Option<&Actions> {
        match self {
            EntityAbilities::Revoked => None,
            EntityAbilities::Granted(actions) => Some(actions),
        }
    }
}

impl Serialize for EntityAbilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EntityAbilities::Revoked => serializer.serialize_bool(false),
            EntityAbilities::Granted(actions) => actions.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntityAbilities {
    Flag(Option<bool>),
    Actions(Actions),
}

impl<'de> Deserialize<'de> for EntityAbilities {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawEntityAbilities::deserialize(deserializer)? {
            RawEntityAbilities::Flag(Some(true)) => EntityAbilities::Granted(Actions::new()),
            RawEntityAbilities::Flag(_) => EntityAbilities::Revoked,
            RawEntityAbilities::Actions(actions) => EntityAbilities::Granted(actions),
        })
    }
}

/// Entity name -> abilities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityMap {
    entities: BTreeMap<String, EntityAbilities>,
}

impl AbilityMap {
    /// Create an empty ability map
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a static or predicate ability
    pub fn grant(
        mut self,
        entity: impl Into<String>,
        action: impl Into<String>,
        ability: impl Into<Ability>,
    ) -> Self {
        self.extend_actions(entity, [(action.into(), ability.into())]);
        self
    }

    /// Builder: set a predicate ability
    pub fn grant_if<F>(self, entity: impl Into<String>, action: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> bool + Send + Sync + 'static,
    {
        self.grant(entity, action, Ability::predicate(f))
    }

    /// Builder: mark an entity as revoked
    pub fn revoke(mut self, entity: impl Into<String>) -> Self {
        self.entities.insert(entity.into(), EntityAbilities::Revoked);
        self
    }

    /// Shallow-merge actions into an entity, replacing a revocation marker
    /// or creating the entry when absent
    pub fn extend_actions<I>(&mut self, entity: impl Into<String>, actions: I)
    where
        I: IntoIterator<Item = (String, Ability)>,
    {
        let slot = self
            .entities
            .entry(entity.into())
            .or_insert(EntityAbilities::Revoked);

        let mut merged = match std::mem::replace(slot, EntityAbilities::Revoked) {
            EntityAbilities::Granted(existing) => existing,
            EntityAbilities::Revoked => Actions::new(),
        };
        merged.extend(actions);
        *slot = EntityAbilities::Granted(merged);
    }

    /// Drop an entity entirely
    pub fn remove(&mut self, entity: &str) -> Option<EntityAbilities> {
        self.entities.remove(entity)
    }

    pub fn get(&self, entity: &str) -> Option<&EntityAbilities> {
        self.entities.get(entity)
    }

    pub fn actions(&self, entity: &str) -> Option<&Actions> {
        self.get(entity).and_then(EntityAbilities::actions)
    }

    /// Look up the rule for an (entity, action) pair
    pub fn ability(&self, entity: &str, action: &str) -> Option<&Ability> {
        self.actions(entity).and_then(|actions| actions.get(action))
    }

    pub fn contains_entity(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EntityAbilities)> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Whether every ability in the map is static (i.e. the map can be serialized)
    pub fn is_static(&self) -> bool {
        self.entities
            .values()
            .filter_map(EntityAbilities::actions)
            .all(|actions| actions.values().all(|a| !a.is_predicate()))
    }
}

impl FromIterator<(String, EntityAbilities)> for AbilityMap {
    fn from_iter<I: IntoIterator<Item = (String, EntityAbilities)>>(iter: I) -> Self {
        Self {
            entities: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, EntityAbilities>> for AbilityMap {
    fn from(entities: BTreeMap<String, EntityAbilities>) -> Self {
        Self { entities }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ============== Ability Tests ==============

    #[test]
    fn test_static_ability_evaluate() {
        assert!(Ability::Static(true).evaluate(&[]));
        assert!(!Ability::Static(false).evaluate(&[json!({"id": 1})]));
    }

    #[test]
    fn test_predicate_ability_receives_args() {
        let ability = Ability::predicate(|args| {
            args.first().and_then(|book| book["authorId"].as_i64()) == Some(1)
        });

        assert!(ability.evaluate(&[json!({"authorId": 1})]));
        assert!(!ability.evaluate(&[json!({"authorId": 2})]));
        assert!(!ability.evaluate(&[]));
    }

    #[test]
    fn test_predicate_equality_is_identity() {
        let a = Ability::predicate(|_| true);
        let b = Ability::predicate(|_| true);

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_ne!(a, Ability::Static(true));
    }

    #[test]
    fn test_predicate_debug() {
        let ability = Ability::predicate(|_| false);
        assert_eq!(format!("{:?}", ability), "Predicate(<fn>)");
        assert_eq!(format!("{:?}", Ability::Static(true)), "Static(true)");
    }

    // ============== AbilityMap Builder Tests ==============

    #[test]
    fn test_builder_grants() {
        let map = AbilityMap::new()
            .grant("books", "read", true)
            .grant("books", "update", false)
            .grant("users", "read", true);

        assert_eq!(map.len(), 2);
        assert_eq!(map.ability("books", "read"), Some(&Ability::Static(true)));
        assert_eq!(map.ability("books", "update"), Some(&Ability::Static(false)));
        assert!(map.ability("books", "delete").is_none());
        assert!(map.ability("authors", "read").is_none());
    }

    #[test]
    fn test_builder_revoke_then_grant() {
        let map = AbilityMap::new().revoke("books").grant("books", "read", true);

        assert_eq!(map.ability("books", "read"), Some(&Ability::Static(true)));
    }

    #[test]
    fn test_revoked_entity_has_no_actions() {
        let map = AbilityMap::new().grant("books", "read", true).revoke("books");

        assert!(map.contains_entity("books"));
        assert!(map.actions("books").is_none());
        assert!(map.ability("books", "read").is_none());
    }

    #[test]
    fn test_extend_actions_keeps_existing() {
        let mut map = AbilityMap::new().grant("books", "read", true);
        map.extend_actions(
            "books",
            [
                ("update".to_string(), Ability::Static(true)),
                ("read".to_string(), Ability::Static(false)),
            ],
        );

        assert_eq!(map.ability("books", "read"), Some(&Ability::Static(false)));
        assert_eq!(map.ability("books", "update"), Some(&Ability::Static(true)));
    }

    #[test]
    fn test_extend_actions_replaces_revocation() {
        let mut map = AbilityMap::new().revoke("books");
        map.extend_actions("books", Vec::new());

        assert_eq!(map.get("books"), Some(&EntityAbilities::Granted(Actions::new())));
    }

    #[test]
    fn test_is_static() {
        let plain = AbilityMap::new().grant("books", "read", true);
        let dynamic = plain.clone().grant_if("books", "update", |_| true);

        assert!(plain.is_static());
        assert!(!dynamic.is_static());
    }

    // ============== Serde Tests ==============

    #[test]
    fn test_deserialize_json_map() {
        let map: AbilityMap = serde_json::from_value(json!({
            "books": { "read": true, "update": false, "delete": null },
            "users": false,
            "authors": null,
            "tags": true
        }))
        .unwrap();

        assert_eq!(map.ability("books", "read"), Some(&Ability::Static(true)));
        assert_eq!(map.ability("books", "delete"), Some(&Ability::Static(false)));
        assert_eq!(map.get("users"), Some(&EntityAbilities::Revoked));
        assert_eq!(map.get("authors"), Some(&EntityAbilities::Revoked));
        assert_eq!(
            map.get("tags"),
            Some(&EntityAbilities::Granted(Actions::new()))
        );
    }

    #[test]
    fn test_deserialize_yaml_map() {
        let yaml = r#"
books:
  read: true
  update: false
users: ~
"#;
        let map: AbilityMap = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(map.ability("books", "read"), Some(&Ability::Static(true)));
        assert_eq!(map.get("users"), Some(&EntityAbilities::Revoked));
    }

    #[test]
    fn test_deserialize_rejects_non_boolean_action() {
        let result: Result<AbilityMap, _> =
            serde_json::from_value(json!({ "books": { "read": "yes" } }));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_static_map() {
        let map = AbilityMap::new().grant("books", "read", true).revoke("users");
        let value = serde_json::to_value(&map).unwrap();

        assert_eq!(value, json!({ "books": { "read": true }, "users": false }));
    }

    #[test]
    fn test_serialize_predicate_fails() {
        let map = AbilityMap::new().grant_if("books", "update", |_| true);
        assert!(serde_json::to_value(&map).is_err());
    }
}
