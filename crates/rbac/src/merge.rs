//! Two-level ability map composition

use shared::{AbilityMap, EntityAbilities};

/// Fold ability maps left to right into a fresh map.
///
/// For every entity in each layer:
/// - a revoked entity (`false` / `null`) erases everything accumulated for it so far
/// - otherwise the layer's actions are shallow-merged over the accumulated ones,
///   so later layers win per action and unmentioned actions survive
///
/// Nothing below the action level is inspected. Inputs are not modified.
pub fn merge<'a, I>(maps: I) -> AbilityMap
where
    I: IntoIterator<Item = &'a AbilityMap>,
{
    maps.into_iter().fold(AbilityMap::new(), |mut result, layer| {
        apply_layer(&mut result, layer);
        result
    })
}

fn apply_layer(result: &mut AbilityMap, layer: &AbilityMap) {
    for (entity, abilities) in layer.iter() {
        match abilities {
            EntityAbilities::Revoked => {
                result.remove(entity);
            }
            EntityAbilities::Granted(actions) => {
                result.extend_actions(entity.as_str(), actions.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Ability, Actions};

    fn guest() -> AbilityMap {
        AbilityMap::new()
            .grant("books", "read", true)
            .grant("books", "update", false)
    }

    fn admin() -> AbilityMap {
        AbilityMap::new()
            .grant("books", "update", true)
            .grant("users", "read", true)
            .grant("users", "update", true)
    }

    #[test]
    fn test_two_level_merge() {
        let merged = merge([&guest(), &AbilityMap::new().grant("books", "update", true)]);

        assert_eq!(
            merged,
            AbilityMap::new()
                .grant("books", "read", true)
                .grant("books", "update", true)
        );
    }

    #[test]
    fn test_merge_adds_new_actions() {
        let merged = merge([
            &AbilityMap::new().grant("books", "read", true),
            &AbilityMap::new().grant("books", "update", true),
        ]);

        assert_eq!(merged.ability("books", "read"), Some(&Ability::Static(true)));
        assert_eq!(merged.ability("books", "update"), Some(&Ability::Static(true)));
    }

    #[test]
    fn test_revoked_entity_is_removed() {
        let admin = admin();
        let merged = merge([&admin, &AbilityMap::new().revoke("books")]);

        assert!(!merged.contains_entity("books"));
        assert_eq!(merged.actions("users"), admin.actions("users"));
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_regrant_after_revoke() {
        let merged = merge([
            &admin(),
            &AbilityMap::new().revoke("books"),
            &AbilityMap::new().grant("books", "read", true),
        ]);

        let actions = merged.actions("books").unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions.get("read"), Some(&Ability::Static(true)));
    }

    #[test]
    fn test_revoke_of_absent_entity_is_noop() {
        let merged = merge([&guest(), &AbilityMap::new().revoke("users")]);
        assert_eq!(merged, guest());
    }

    #[test]
    fn test_merge_output_never_contains_revocations() {
        let merged = merge([&AbilityMap::new().revoke("books")]);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_empty_action_layer_creates_entity() {
        let layer: AbilityMap = [("tags".to_string(), EntityAbilities::Granted(Actions::new()))]
            .into_iter()
            .collect();
        let merged = merge([&layer]);

        assert_eq!(merged.actions("tags"), Some(&Actions::new()));
    }

    #[test]
    fn test_merge_of_nothing_is_empty() {
        assert!(merge(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_inputs_untouched() {
        let base = guest();
        let layer = AbilityMap::new().revoke("books");
        let _ = merge([&base, &layer]);

        assert_eq!(base, guest());
        assert_eq!(layer, AbilityMap::new().revoke("books"));
    }

    #[test]
    fn test_predicate_carried_through() {
        let layer = AbilityMap::new().grant_if("books", "update", |_| true);
        let merged = merge([&guest(), &layer]);

        assert_eq!(
            merged.ability("books", "update"),
            layer.ability("books", "update")
        );
    }
}
