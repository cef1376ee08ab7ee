//! Interactive REPL mode

use crate::commands::roles::render_role;
use console::style;
use rbac::RoleRegistry;
use std::io::{self, Write};

/// Interactive CLI for trying permission checks against a registry
pub struct InteractiveCli {
    registry: RoleRegistry,
    /// Verdict of the most recent /can
    last_verdict: Option<bool>,
}

impl InteractiveCli {
    pub fn new(registry: RoleRegistry) -> Self {
        Self {
            registry,
            last_verdict: None,
        }
    }

    /// Run the interactive REPL
    pub fn run(&mut self) -> anyhow::Result<()> {
        println!("rolecheck Interactive Mode");
        println!("Type /help for commands, /quit to exit");
        println!();

        loop {
            print!("[{}] > ", self.registry.current_roles().join(","));
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                break;
            }
            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            match self.handle_command(input) {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => println!("Error: {}", e),
            }
        }

        Ok(())
    }

    fn handle_command(&mut self, input: &str) -> anyhow::Result<bool> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");

        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Goodbye!");
                return Ok(true);
            }
            "/help" | "/h" => {
                println!("Commands:");
                println!("  /role <name>...         - Switch current role(s)");
                println!("  /can <action> <entity>  - Check a permission");
                println!("  /roles [name]           - Show defined roles");
                println!("  /status                 - Show current roles");
                println!("  /quit                   - Exit");
            }
            "/role" => {
                if parts.len() < 2 {
                    anyhow::bail!("Usage: /role <name>...");
                }
                let roles: Vec<String> = parts[1..].iter().map(|s| s.to_string()).collect();
                for role in roles.iter().filter(|r| !self.registry.has_role(r)) {
                    println!("Warning: role '{}' is not defined", role);
                }
                self.registry.set_current(roles);
            }
            "/can" => {
                let (action, entity) = match parts.as_slice() {
                    [_, action, entity] => (*action, *entity),
                    _ => anyhow::bail!("Usage: /can <action> <entity>"),
                };
                let allowed = self.registry.can(action, entity, &[]);
                self.last_verdict = Some(allowed);
                if allowed {
                    println!("{}", style("allowed").green());
                } else {
                    println!("{}", style("denied").red());
                }
            }
            "/roles" => match parts.get(1) {
                Some(name) => match self.registry.role(name) {
                    Some(abilities) => print!("{}", render_role(name, abilities)),
                    None => anyhow::bail!("Role '{}' is not defined", name),
                },
                None => {
                    println!("Available roles:");
                    for name in self.registry.role_names() {
                        println!("  {}", name);
                    }
                }
            },
            "/status" => {
                println!("Status:");
                println!("  Roles: [{}]", self.registry.current_roles().join(", "));
                println!("  Defined: {}", self.registry.roles().len());
                match self.last_verdict {
                    Some(true) => println!("  Last check: allowed"),
                    Some(false) => println!("  Last check: denied"),
                    None => {}
                }
            }
            _ => {
                println!("Unknown command: {}", cmd);
            }
        }

        Ok(false)
    }
}

impl Default for InteractiveCli {
    fn default() -> Self {
        Self::new(RoleRegistry::new())
    }
}
