use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cmr", about = "CMR in-memory content repository", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Repository configuration (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the type hierarchy
    Types(TypesArgs),
    /// Execute a script of repository commands
    Run(RunArgs),
    /// Read repository commands from stdin
    Shell(ShellArgs),
}

#[derive(Args)]
pub struct TypesArgs {
    /// Only show types below this one
    pub root: Option<String>,
    /// Include property definitions
    #[arg(short, long)]
    pub properties: bool,
}

#[derive(Args)]
pub struct RunArgs {
    pub script: PathBuf,
    /// Principal the script starts as
    #[arg(short, long, default_value = "admin")]
    pub user: String,
    /// Keep going after a failing command
    #[arg(long)]
    pub keep_going: bool,
}

#[derive(Args)]
pub struct ShellArgs {
    #[arg(short, long, default_value = "admin")]
    pub user: String,
}
