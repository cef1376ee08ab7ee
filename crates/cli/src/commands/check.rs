//! rolecheck check command

use super::load_registry;
use clap::Args;
use console::style;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Action to check (e.g. read, update)
    pub action: String,

    /// Entity the action applies to (e.g. books)
    pub entity: String,

    /// Role(s) to check as; defaults to the role files' current selector
    #[arg(short, long = "role")]
    pub roles: Vec<String>,
}

impl CheckCommand {
    /// Returns whether the action is allowed
    pub fn run(&self, files: &[PathBuf], json: bool) -> anyhow::Result<bool> {
        let mut registry = load_registry(files)?;
        if !self.roles.is_empty() {
            registry.set_current(self.roles.clone());
        }

        let roles = registry.current_roles();
        let allowed = registry.can(&self.action, &self.entity, &[]);
        debug!(
            action = %self.action,
            entity = %self.entity,
            roles = ?roles,
            allowed,
            "Checked permission"
        );

        if json {
            println!("{}", serde_json::to_string_pretty(&self.report(&roles, allowed))?);
        } else {
            let verdict = if allowed {
                style("allowed").green().bold()
            } else {
                style("denied").red().bold()
            };
            println!(
                "{} {} on {} as [{}]",
                verdict,
                self.action,
                self.entity,
                roles.join(", ")
            );
        }

        Ok(allowed)
    }

    /// JSON verdict printed with `--json`
    pub fn report(&self, roles: &[String], allowed: bool) -> serde_json::Value {
        serde_json::json!({
            "action": self.action,
            "entity": self.entity,
            "roles": roles,
            "allowed": allowed,
        })
    }
}
