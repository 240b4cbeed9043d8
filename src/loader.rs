//! Loading relationship graphs from text files.
//!
//! Each line holds one relationship: `user1 user2 weight`, separated by
//! spaces or tabs. A user token is either a bare name or `name:role` where
//! role is `default` or `admin`:
//!
//! ```text
//! Sal:admin Dan 5
//! Dan Jesse 3
//! Jesse Kim:default 12
//! ```
//!
//! Any malformed line fails the whole load.

use csv::{ReaderBuilder, StringRecord};
use rand::Rng;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{InfectionError, Result};
use crate::graph::RelationshipGraph;

const FIELDS_PER_RECORD: usize = 3;

/// Loads a graph file. `seed` fixes the random source used for any later
/// relationship added without a weight.
pub fn load_graph(path: impl AsRef<Path>, seed: Option<u64>) -> Result<RelationshipGraph> {
    let path = path.as_ref();
    let graph = match seed {
        Some(seed) => RelationshipGraph::with_seed(seed),
        None => RelationshipGraph::new(),
    };
    let graph = read_graph(File::open(path)?, graph)?;
    info!(
        path = %path.display(),
        users = graph.size(),
        "loaded relationship graph"
    );
    Ok(graph)
}

/// Reads relationship records into `graph`. On error the partially built
/// graph is dropped.
pub fn read_graph<Rd: Read, R: Rng>(
    source: Rd,
    mut graph: RelationshipGraph<R>,
) -> Result<RelationshipGraph<R>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(source);

    let mut relationships = 0usize;
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let tokens: Vec<&str> = record.iter().flat_map(str::split_whitespace).collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() != FIELDS_PER_RECORD {
            return Err(format_error(
                line,
                format!(
                    "expected `user user weight`, found {} field(s)",
                    tokens.len()
                ),
            ));
        }

        let a = add_user_token(&mut graph, tokens[0], line)?;
        let b = add_user_token(&mut graph, tokens[1], line)?;
        let weight = parse_weight(tokens[2], line)?;
        graph
            .add_relationship(&a, &b, Some(weight))
            .map_err(|e| format_error(line, e.to_string()))?;
        relationships += 1;
    }

    debug!(relationships, users = graph.size(), "parsed relationship records");
    Ok(graph)
}

/// Convenience wrapper over [`read_graph`] for in-memory text.
pub fn parse_graph<R: Rng>(text: &str, graph: RelationshipGraph<R>) -> Result<RelationshipGraph<R>> {
    read_graph(text.as_bytes(), graph)
}

fn add_user_token<R: Rng>(graph: &mut RelationshipGraph<R>, token: &str, line: u64) -> Result<String> {
    let mut parts = token.split(':');
    let name = parts.next().unwrap_or_default();
    let role = parts.next();
    if parts.next().is_some() {
        return Err(format_error(line, format!("too many `:` in user `{token}`")));
    }
    if name.is_empty() {
        return Err(format_error(line, format!("empty user name in `{token}`")));
    }

    let user = match role {
        None | Some("default") => graph.add_user(name, false),
        Some("admin") => graph.add_admin(name),
        Some(other) => {
            return Err(format_error(
                line,
                format!("unknown role `{other}`, expected `default` or `admin`"),
            ));
        }
    };
    Ok(user.identity().to_string())
}

fn parse_weight(token: &str, line: u64) -> Result<u32> {
    let weight: i64 = token
        .parse()
        .map_err(|_| format_error(line, format!("weight `{token}` is not an integer")))?;
    match u32::try_from(weight) {
        Ok(weight) if weight > 0 => Ok(weight),
        _ => Err(format_error(line, InfectionError::InvalidWeight(weight).to_string())),
    }
}

fn format_error(line: u64, reason: String) -> InfectionError {
    InfectionError::LoadFormat { line, reason }
}
