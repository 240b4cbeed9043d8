use clap::Parser;
use tracing_subscriber::EnvFilter;
use version_infection::cli::{Cli, Command};
use version_infection::commands::{self, RunPlan};
use version_infection::output::{Formatter, OutputFormat};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(e) = run() {
        let formatter = Formatter::new(OutputFormat::Text, true);
        eprintln!("{}", formatter.error(&format!("Error: {}", e)));
        std::process::exit(1);
    }
}

fn run() -> version_infection::Result<()> {
    let cli = Cli::parse();

    let report = match cli.command {
        Command::Run(args) => commands::execute_run(&RunPlan::resolve(args)?)?,
        Command::Generate(args) => commands::execute_generate(args)?,
    };
    println!("{}", report);
    Ok(())
}
