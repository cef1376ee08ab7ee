//! rolecheck merge command

use anyhow::Context;
use clap::Args;
use shared::{read_document, AbilityMap};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct MergeCommand {
    /// Ability map files, merged left to right
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

impl MergeCommand {
    pub fn run(&self, json: bool) -> anyhow::Result<()> {
        let merged = self.merged()?;

        if json {
            println!("{}", serde_json::to_string_pretty(&merged)?);
        } else {
            print!("{}", serde_yaml::to_string(&merged)?);
        }
        Ok(())
    }

    pub fn merged(&self) -> anyhow::Result<AbilityMap> {
        let maps = self
            .inputs
            .iter()
            .map(|path| {
                read_document::<AbilityMap>(path)
                    .with_context(|| format!("Failed to read ability map {}", path.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(rbac::merge(&maps))
    }
}
