//! Command building
//!
//! Turns an abstract intent (category, action, package names) into a
//! concrete argv for whichever backend the detected system provides.
//! Building is pure: the same snapshot and inputs always produce the
//! same argv, and nothing here spawns a process.

use super::detect::SystemInfo;
use super::registry::Registry;
use crate::error::BuildError;
use crate::types::{Action, Category};

/// Builds argv vectors against one detected system
#[derive(Debug, Clone)]
pub struct CommandBuilder<'a> {
    info: &'a SystemInfo,
    registry: Registry,
    use_sudo: bool,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(info: &'a SystemInfo) -> Self {
        Self {
            info,
            registry: Registry::default(),
            use_sudo: true,
        }
    }

    /// Use a custom set of backends instead of the built-in registry
    #[cfg(test)]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Whether root-only verbs get a `sudo` prefix when not running as root
    pub fn with_sudo(mut self, use_sudo: bool) -> Self {
        self.use_sudo = use_sudo;
        self
    }

    /// Name of the backend that would serve `category`, if any
    pub fn backend_name(&self, category: Category) -> Option<&'static str> {
        self.registry
            .lookup(category, self.info)
            .ok()
            .map(|spec| spec.name)
    }

    /// Build the argv for one action over names of a single category
    ///
    /// Order: [sudo] program, fixed flags, verb tokens, package names.
    /// AUR helpers treat flag position as meaningful, so this order is
    /// part of the contract.
    pub fn build(
        &self,
        category: Category,
        action: Action,
        names: &[String],
    ) -> Result<Vec<String>, BuildError> {
        let spec = self.registry.lookup(category, self.info)?;
        let template = spec
            .template(action)
            .ok_or(BuildError::UnsupportedAction {
                backend: spec.name,
                action,
            })?;

        if names.is_empty() && !action.allows_empty() {
            return Err(BuildError::MissingPackages(action));
        }

        let elevate = template.needs_root && self.use_sudo && !self.info.is_root;
        let mut argv = Vec::with_capacity(
            1 + usize::from(elevate) + spec.flags.len() + template.verb.len() + names.len(),
        );

        if elevate {
            argv.push("sudo".to_string());
        }
        argv.push(spec.program.to_string());
        argv.extend(spec.flags.iter().map(|f| f.to_string()));
        argv.extend(template.verb.iter().map(|v| v.to_string()));
        argv.extend(names.iter().cloned());

        Ok(argv)
    }
}

/// Render an argv for display in confirmations and dry runs
pub fn preview(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                format!("'{}'", arg)
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
