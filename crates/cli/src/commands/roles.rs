//! rolecheck roles command

use super::load_registry;
use clap::Args;
use console::style;
use shared::{Ability, AbilityMap};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RolesCommand {
    /// Only show this role
    pub name: Option<String>,
}

impl RolesCommand {
    pub fn run(&self, files: &[PathBuf], json: bool) -> anyhow::Result<()> {
        let registry = load_registry(files)?;

        let selected: Vec<(&String, &AbilityMap)> = match &self.name {
            Some(name) => {
                let (key, abilities) = registry
                    .roles()
                    .get_key_value(name.as_str())
                    .ok_or_else(|| anyhow::anyhow!("Role '{}' is not defined", name))?;
                vec![(key, abilities)]
            }
            None => registry.roles().iter().collect(),
        };

        if json {
            let output = roles_to_json(selected)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Current: [{}]", registry.current_roles().join(", "));
        for (name, abilities) in selected {
            println!();
            print!("{}", render_role(name, abilities));
        }
        Ok(())
    }
}

/// JSON object of role name -> abilities; conditional abilities have no JSON form
pub fn roles_to_json<'a>(
    roles: impl IntoIterator<Item = (&'a String, &'a AbilityMap)>,
) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    let mut output = serde_json::Map::new();
    for (name, abilities) in roles {
        if !abilities.is_static() {
            anyhow::bail!(
                "Role '{}' has conditional abilities and cannot be printed as JSON",
                name
            );
        }
        output.insert(name.clone(), serde_json::to_value(abilities)?);
    }
    Ok(output)
}

/// Human-readable listing of one role
pub fn render_role(name: &str, abilities: &AbilityMap) -> String {
    let mut out = format!("{}\n", style(name).bold());
    if abilities.is_empty() {
        out.push_str("  (no abilities)\n");
    }

    for (entity, entry) in abilities.iter() {
        let Some(actions) = entry.actions() else {
            continue;
        };
        for (action, ability) in actions {
            let verdict = match ability {
                Ability::Static(true) => style("allow").green().to_string(),
                Ability::Static(false) => style("deny").red().to_string(),
                Ability::Predicate(_) => style("conditional").yellow().to_string(),
            };
            out.push_str(&format!("  {}.{} = {}\n", entity, action, verdict));
        }
    }
    out
}
