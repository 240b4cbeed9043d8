//! Report formatting for infection runs.

use colored::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::RelationshipGraph;
use crate::infection::{Infected, InfectionType};
use crate::user::User;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per user (default)
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

#[derive(Serialize)]
struct Report<'a> {
    strategy: InfectionType,
    infected: &'a Infected,
    users: Vec<&'a User>,
}

pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Formats the outcome of a run: every user with its version, then a
    /// summary.
    pub fn format_report<R: Rng>(
        &self,
        graph: &RelationshipGraph<R>,
        kind: InfectionType,
        infected: &Infected,
    ) -> Result<String> {
        let mut users: Vec<&User> = graph.all_users().collect();
        users.sort_by(|a, b| a.identity().cmp(b.identity()));

        match self.format {
            OutputFormat::Json => {
                let report = Report {
                    strategy: kind,
                    infected,
                    users,
                };
                Ok(serde_json::to_string_pretty(&report)?)
            }
            OutputFormat::Text => Ok(self.format_text(&users, kind, infected)),
        }
    }

    fn format_text(&self, users: &[&User], kind: InfectionType, infected: &Infected) -> String {
        let mut lines: Vec<String> = users
            .iter()
            .map(|user| {
                let role = if user.is_admin() { " [admin]" } else { "" };
                let line = format!("{}{} v{}", user.identity(), role, user.version());
                if user.is_infected() {
                    self.colorize(&line, "green")
                } else {
                    self.colorize(&line, "red")
                }
            })
            .collect();

        let summary = format!(
            "{} infection reached {} of {} user(s)",
            kind,
            infected.len(),
            users.len()
        );
        lines.push(String::new());
        lines.push(self.colorize(&summary, "bold"));
        lines.join("\n")
    }

    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "bold" => text.bold().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infection::total_infection;

    fn infected_graph() -> (RelationshipGraph, Infected) {
        let mut graph = RelationshipGraph::with_seed(1);
        graph.add_admin("Sal");
        graph.add_user("Dan", false);
        graph.add_user("Kim", false);
        graph.add_relationship("Sal", "Dan", Some(2)).unwrap();
        let infected = total_infection(&mut graph, "Sal").unwrap();
        (graph, infected)
    }

    #[test]
    fn test_text_report() {
        let (graph, infected) = infected_graph();
        let formatter = Formatter::new(OutputFormat::Text, false);
        let output = formatter
            .format_report(&graph, InfectionType::Total, &infected)
            .unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Dan v2");
        assert_eq!(lines[1], "Kim v1");
        assert_eq!(lines[2], "Sal [admin] v2");
        assert!(output.ends_with("total infection reached 2 of 3 user(s)"));
    }

    #[test]
    fn test_json_report() {
        let (graph, infected) = infected_graph();
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter
            .format_report(&graph, InfectionType::Total, &infected)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["strategy"], "total");
        assert_eq!(value["infected"], serde_json::json!(["Dan", "Sal"]));
        assert_eq!(value["users"][1]["identity"], "Kim");
        assert_eq!(value["users"][1]["version"], 1);
        assert_eq!(value["users"][2]["is_admin"], true);
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Text, false);
        assert_eq!(formatter.success("done"), "✓ done");
        assert_eq!(formatter.error("failed"), "✗ failed");
    }
}
