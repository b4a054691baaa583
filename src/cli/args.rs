//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Convert Wikipedia cladograms into Newick trees
#[derive(Parser, Debug)]
#[command(name = "wikiclade")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search a term (or open a URL) and convert its clade tables
    Fetch {
        /// Search term or page URL; append #N to select the Nth table
        term: String,

        /// Output file (.nwk, .newick, .nw, .tree, .txt); prints a text tree if omitted
        #[arg(value_hint = ValueHint::FilePath)]
        outfile: Option<PathBuf>,

        /// Write NHX annotations (support, notes, links, images)
        #[arg(long)]
        nhx: bool,

        /// Levels of linked pages to follow for leaf expansion
        #[arg(long, value_name = "N")]
        depth: Option<usize>,
    },

    /// Print a Newick file as a text tree
    Show {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the global config file location
    Path,
    /// Write a commented template to the global config location
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
