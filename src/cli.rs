use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "class-map")]
#[command(about = "Build the class map cache for a source tree and resolve class names against it")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Source tree to scan (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR", env = crate::config::ROOT_ENV)]
    pub root: Option<PathBuf>,

    /// Recognized source extension; repeat for several (defaults to php, php4, php5, mphp, phpm)
    #[arg(long = "ext", global = true, value_name = "EXT")]
    pub ext: Vec<String>,

    /// Never rescan the tree on a class map miss
    #[arg(long, global = true)]
    pub no_rebuild: bool,

    #[arg(short = 'f', long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Drop the cache and rescan the tree (the default)
    Rebuild,
    /// Resolve a class name to its source file
    Resolve { class_name: String },
    /// Print the whole class map
    List,
    Stats,
    /// Delete the cache file
    Clear,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
