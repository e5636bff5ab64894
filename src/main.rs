use std::io::{self, IsTerminal};
use std::path::Path;

use clap::Parser;

use gitlab_stats::cli::Cli;
use gitlab_stats::config::{Config, ConfigLoader, FileConfigLoader, InstanceConfig, RunConfig};
use gitlab_stats::select::{
    InstanceSelector, InteractiveSelector, Selection, StaticListSelector, resolve_instance,
};
use gitlab_stats::{EXIT_SUCCESS, logging, pipeline};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let exit_code = match run(&cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> gitlab_stats::Result<i32> {
    let config = load_config(cli.config.as_deref())?;

    let selector: &dyn InstanceSelector = if io::stdin().is_terminal() {
        &InteractiveSelector
    } else {
        &StaticListSelector
    };
    let name = match resolve_instance(cli.instance.as_deref(), &config, selector)? {
        Selection::Instance(name) => name,
        Selection::Quit => {
            eprintln!("Exiting...");
            return Ok(EXIT_SUCCESS);
        }
    };

    let mut raw = config.instance(&name)?.clone();
    apply_cli_overrides(&mut raw, cli);

    let run_config = RunConfig::resolve(&name, &raw, std::env::var("GITLAB_TOKEN").ok())?;
    pipeline::execute(&run_config, cli.progress)?;
    Ok(EXIT_SUCCESS)
}

fn load_config(config_path: Option<&Path>) -> gitlab_stats::Result<Config> {
    let loader = FileConfigLoader::new();
    config_path.map_or_else(|| loader.load(), |path| loader.load_from_path(path))
}

fn apply_cli_overrides(raw: &mut InstanceConfig, cli: &Cli) {
    if let Some(from_project_id) = cli.from_project_id {
        raw.from_project_id = Some(from_project_id);
    }

    if let Some(output_dir) = &cli.output_dir {
        raw.output_dir = Some(output_dir.clone());
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
