use petgraph::dot::{Config, Dot};
use petgraph::visit::EdgeRef;
use rand::Rng;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use crate::error::{InfectionError, Result};
use crate::graph::RelationshipGraph;

const INFECTED_FILL: &str = "0.33 0.5 0.8";
const HEALTHY_FILL: &str = "0.0 0.5 0.8";

/// Renders the graph in Graphviz DOT, colouring users by version.
pub fn to_dot<R: Rng>(graph: &RelationshipGraph<R>) -> String {
    let (pg, _) = graph.to_petgraph();
    let users: HashMap<&str, (bool, u32, bool)> = graph
        .all_users()
        .map(|u| (u.identity(), (u.is_infected(), u.version(), u.is_admin())))
        .collect();

    format!(
        "{:?}",
        Dot::with_attr_getters(
            &pg,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &|_, edge| format!("label=\"{}\"", edge.weight()),
            &|_, (_, identity)| node_attributes(identity, users.get(identity.as_str()).copied()),
        )
    )
}

fn node_attributes(identity: &str, state: Option<(bool, u32, bool)>) -> String {
    let (infected, version, admin) = state.unwrap_or((false, 1, false));
    let fill = if infected { INFECTED_FILL } else { HEALTHY_FILL };
    let peripheries = if admin { 2 } else { 1 };
    format!(
        "label=\"{} (v{})\", style=filled, fillcolor=\"{}\", peripheries={}",
        identity, version, fill, peripheries
    )
}

pub fn save_graph_to_dot<R: Rng>(graph: &RelationshipGraph<R>, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path, to_dot(graph))?;
    Ok(())
}

/// Renders a DOT file to PNG with the Graphviz `dot` binary.
pub fn render_png(dot_file: impl AsRef<Path>, output_image: impl AsRef<Path>) -> Result<()> {
    let status = Command::new("dot")
        .arg("-Tpng")
        .arg(dot_file.as_ref())
        .arg("-o")
        .arg(output_image.as_ref())
        .status()?;

    if !status.success() {
        return Err(InfectionError::Io(std::io::Error::other(format!(
            "graphviz exited with {status}"
        ))));
    }
    Ok(())
}
