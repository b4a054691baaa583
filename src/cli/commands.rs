//! Command dispatch

use std::fs;
use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{treefile, ApplicationError};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{Diagnostics, TextTreeConvert, TreeQuery};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `wikiclade --help`".into(),
        ));
    };

    match command {
        Commands::Fetch {
            term,
            outfile,
            nhx,
            depth,
        } => {
            let settings = Settings::load(cli.config.as_deref())?;
            fetch(settings, term, outfile.as_deref(), *nhx, *depth)
        }
        Commands::Show { file } => show(file),
        Commands::Config { command } => config(cli, command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

#[instrument(level = "debug", skip(settings))]
fn fetch(
    settings: Settings,
    term: &str,
    outfile: Option<&Path>,
    nhx: bool,
    depth: Option<usize>,
) -> CliResult<()> {
    let query = TreeQuery::parse(term)?;
    if nhx && outfile.is_none() {
        return Err(CliError::InvalidArgs("--nhx needs an OUTFILE".into()));
    }
    // reject bad output paths before touching the network
    let options = outfile
        .map(|path| treefile::output_options(path, nhx))
        .transpose()?;
    let max_depth = depth.unwrap_or(settings.max_depth);
    debug!("query {:?}, max_depth {}", query, max_depth);

    let container = ServiceContainer::new(settings)?;
    let service = container.clade_service();

    let mut diag = Diagnostics::new();
    let trees = service.fetch_trees(&query, max_depth, &mut diag)?;

    if trees.is_empty() {
        output::warning(&format!("no phylogenetic tree found for {:?}", query.term));
        return Ok(());
    }

    match (outfile, options) {
        (Some(path), Some(options)) => {
            for written in treefile::write_trees(&trees, path, options)? {
                output::written(&written);
            }
        }
        _ => {
            for (i, tree) in trees.iter().enumerate() {
                if trees.len() > 1 {
                    output::tree_header(i + 1, trees.len());
                }
                output::info(&tree.to_text_tree());
            }
        }
    }

    if !diag.is_empty() {
        output::warning(&format!("{} issue(s) while reading the page", diag.len()));
    }
    Ok(())
}

fn show(file: &Path) -> CliResult<()> {
    let mut diag = Diagnostics::new();
    let tree = treefile::read_tree(file, &mut diag)?;
    output::info(&tree.to_text_tree());
    Ok(())
}

fn config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => {
                return Err(ApplicationError::Config {
                    message: "cannot determine config directory".into(),
                }
                .into())
            }
        },
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| ApplicationError::Config {
                message: "cannot determine config directory".into(),
            })?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} already exists, use --force to overwrite",
                    path.display()
                )));
            }
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)
                    .map_err(|e| InfraError::io("create config dir", dir, e))?;
            }
            fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io("write config", &path, e))?;
            output::written(&path);
        }
    }
    Ok(())
}
