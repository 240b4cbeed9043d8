//! Command handlers behind the `infect` binary.

use std::path::PathBuf;
use tracing::info;

use crate::cli::{GenerateArgs, RunArgs};
use crate::config::Config;
use crate::dot;
use crate::error::{InfectionError, Result};
use crate::generator::{Population, generate_population_file};
use crate::infection::{Policy, run_infection};
use crate::loader::load_graph;
use crate::output::{Formatter, OutputFormat};

/// Everything a run needs once flags and config defaults are merged.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub policy: Policy,
    pub data: PathBuf,
    pub seed: Option<u64>,
    pub dot: Option<PathBuf>,
    pub png: Option<PathBuf>,
    pub format: OutputFormat,
    pub color: bool,
}

impl RunPlan {
    /// Merges flags over config values and checks the policy before any
    /// file is read.
    pub fn resolve(args: RunArgs) -> Result<Self> {
        let config = match &args.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        let settings = config.run;

        let kind = args.kind.or(settings.kind).ok_or_else(|| {
            InfectionError::Config("You must select a type of infection to run".to_string())
        })?;
        let data = args
            .data
            .or_else(|| settings.data.map(PathBuf::from))
            .ok_or_else(|| InfectionError::Config("You must specify a file to load from".to_string()))?;

        let policy = Policy {
            kind,
            seed: args.infect.or(settings.infect),
            max_count: args.max.or(settings.max),
        };
        policy.validate()?;

        Ok(RunPlan {
            policy,
            data,
            seed: args.seed.or(settings.seed),
            dot: args.dot,
            png: args.png,
            format: args.format.map(Into::into).unwrap_or(settings.format),
            color: !args.no_color && settings.color,
        })
    }
}

/// Loads the graph, runs the infection and returns the rendered report.
pub fn execute_run(plan: &RunPlan) -> Result<String> {
    let mut graph = load_graph(&plan.data, plan.seed)?;
    let infected = run_infection(&mut graph, &plan.policy)?;

    if let Some(dot_path) = &plan.dot {
        dot::save_graph_to_dot(&graph, dot_path)?;
        info!(path = %dot_path.display(), "wrote graphviz file");
        if let Some(png_path) = &plan.png {
            dot::render_png(dot_path, png_path)?;
        }
    }

    let formatter = Formatter::new(plan.format, plan.color);
    formatter.format_report(&graph, plan.policy.kind, &infected)
}

pub fn execute_generate(args: GenerateArgs) -> Result<String> {
    let population = Population {
        users: args.users,
        relationships: args.relationships,
        admin_ratio: args.admin_ratio,
        seed: args.seed,
    };
    let written = generate_population_file(&population, &args.output)?;

    let formatter = Formatter::new(OutputFormat::Text, true);
    Ok(formatter.success(&format!(
        "Wrote {} relationship(s) to {}",
        written,
        args.output.display()
    )))
}
