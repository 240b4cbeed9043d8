//! Command-line definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::infection::InfectionType;
use crate::output::OutputFormat;

/// Spread a version upgrade through a population of related users.
#[derive(Debug, Parser)]
#[command(name = "infect")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a graph file and run an infection over it
    Run(RunArgs),

    /// Write a random population file
    Generate(GenerateArgs),
}

#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Infection type: total, limited, exact or admin
    #[arg(short = 't', long = "type")]
    pub kind: Option<InfectionType>,

    /// Graph file, one `user user weight` relationship per line (EX: Dan Jesse 5)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// User to start the infection from (total, limited and exact)
    #[arg(short, long)]
    pub infect: Option<String>,

    /// Number of users to infect (limited and exact)
    #[arg(short, long)]
    pub max: Option<usize>,

    /// Seed for randomly weighted relationships
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the infected graph as Graphviz DOT
    #[arg(long)]
    pub dot: Option<PathBuf>,

    /// Render the DOT output to this PNG with Graphviz (requires --dot)
    #[arg(long, requires = "dot")]
    pub png: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// TOML file with defaults for any of the options above
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Number of users
    #[arg(short, long, default_value_t = 140)]
    pub users: usize,

    /// Number of relationship lines
    #[arg(short, long, default_value_t = 500)]
    pub relationships: usize,

    /// Fraction of users flagged as admins
    #[arg(short, long, default_value_t = 0.05)]
    pub admin_ratio: f64,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    Text,
    Json,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Text => OutputFormat::Text,
            CliFormat::Json => OutputFormat::Json,
        }
    }
}
