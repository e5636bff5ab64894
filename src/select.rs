//! Choosing which configured instance to run against.

use dialoguer::{Select, theme::ColorfulTheme};

use crate::config::Config;
use crate::{GitlabStatsError, Result};

const QUIT_ITEM: &str = "Quit";

/// Outcome of asking the user for an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Instance(String),
    Quit,
}

/// Strategy for picking an instance when none was given on the command line.
pub trait InstanceSelector {
    /// # Errors
    /// Returns an error if no instance can be selected.
    fn select(&self, instances: &[String]) -> Result<Selection>;
}

/// Prompts with an arrow-key list of instances followed by "Quit".
#[derive(Debug, Default, Clone, Copy)]
pub struct InteractiveSelector;

impl InstanceSelector for InteractiveSelector {
    fn select(&self, instances: &[String]) -> Result<Selection> {
        let mut items: Vec<&str> = instances.iter().map(String::as_str).collect();
        items.push(QUIT_ITEM);

        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Choose an instance")
            .items(&items)
            .default(0)
            .interact_opt()
            .map_err(|e| GitlabStatsError::Config(format!("Instance selection failed: {e}")))?;

        Ok(selection_from_index(choice, instances))
    }
}

/// Prints the available instances and refuses to guess.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticListSelector;

impl InstanceSelector for StaticListSelector {
    fn select(&self, instances: &[String]) -> Result<Selection> {
        eprintln!("Non-interactive terminal detected. Please run with the instance argument.");
        eprintln!("Available instances: {}", format_instance_list(instances));
        Err(GitlabStatsError::Config(
            "No instance given and no terminal to choose one from".to_string(),
        ))
    }
}

/// Map a prompt result onto a selection. Escape and the trailing "Quit"
/// entry both quit.
#[must_use]
pub fn selection_from_index(index: Option<usize>, instances: &[String]) -> Selection {
    index
        .and_then(|i| instances.get(i))
        .map_or(Selection::Quit, |name| Selection::Instance(name.clone()))
}

#[must_use]
pub fn format_instance_list(instances: &[String]) -> String {
    instances.join(", ")
}

/// Pick the instance to run: the command-line name if given, otherwise
/// whatever `selector` returns.
///
/// # Errors
/// Returns a config error if the named instance does not exist or the
/// selector cannot choose one.
pub fn resolve_instance(
    cli_instance: Option<&str>,
    config: &Config,
    selector: &dyn InstanceSelector,
) -> Result<Selection> {
    if let Some(name) = cli_instance {
        config.instance(name)?;
        return Ok(Selection::Instance(name.to_string()));
    }
    selector.select(&config.instance_names())
}

#[cfg(test)]
#[path = "select_tests.rs"]
mod tests;
