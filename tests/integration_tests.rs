//! Integration tests for loading graph files and running infections end to end.

use std::io::Write;
use tempfile::NamedTempFile;
use version_infection::commands::{RunPlan, execute_run};
use version_infection::infection::Policy;
use version_infection::loader::load_graph;
use version_infection::output::OutputFormat;
use version_infection::{InfectionError, InfectionType, run_infection};

const CLASSROOM: &str = "\
Sal:admin Dan 8
Dan Jesse 5
Dan Kim 2
Jesse Lee 9
Kim Lee 1
Ann Bo:default 3
";

fn graph_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn plan(file: &NamedTempFile, policy: Policy) -> RunPlan {
    RunPlan {
        policy,
        data: file.path().to_path_buf(),
        seed: Some(1),
        dot: None,
        png: None,
        format: OutputFormat::Json,
        color: false,
    }
}

#[test]
fn test_load_and_total_infection() {
    let file = graph_file(CLASSROOM);
    let mut graph = load_graph(file.path(), Some(1)).unwrap();
    assert_eq!(graph.size(), 7);

    let policy = Policy::new(InfectionType::Total).with_seed("Kim");
    let infected = run_infection(&mut graph, &policy).unwrap();
    let names: Vec<&str> = infected.iter().map(String::as_str).collect();
    assert_eq!(names, vec!["Dan", "Jesse", "Kim", "Lee", "Sal"]);
    assert!(!graph.get_user("Ann").unwrap().is_infected());
    assert!(!graph.get_user("Bo").unwrap().is_infected());
}

#[test]
fn test_admin_infection_from_file() {
    let file = graph_file(CLASSROOM);
    let mut graph = load_graph(file.path(), None).unwrap();
    let infected = run_infection(&mut graph, &Policy::new(InfectionType::Admin)).unwrap();
    assert_eq!(infected.len(), 5);
    assert!(!infected.contains("Ann"));
}

#[test]
fn test_limited_infection_follows_heavy_relationships() {
    let file = graph_file(CLASSROOM);
    let mut graph = load_graph(file.path(), Some(1)).unwrap();
    // Dan(0) -> Sal(-8), Jesse(-5), Kim(-2); Sal pops next, then Jesse.
    let policy = Policy::new(InfectionType::Limited)
        .with_seed("Dan")
        .with_max_count(3);
    let infected = run_infection(&mut graph, &policy).unwrap();
    let names: Vec<&str> = infected.iter().map(String::as_str).collect();
    assert_eq!(names, vec!["Dan", "Jesse", "Sal"]);
}

#[test]
fn test_exact_infection_errors_leave_graph_untouched() {
    let file = graph_file(CLASSROOM);
    let mut graph = load_graph(file.path(), Some(1)).unwrap();

    let too_many = Policy::new(InfectionType::Exact).with_seed("Ann").with_max_count(15);
    let err = run_infection(&mut graph, &too_many).unwrap_err();
    assert!(matches!(err, InfectionError::GraphTooSmall { size: 7, requested: 15 }));

    let short = Policy::new(InfectionType::Exact).with_seed("Ann").with_max_count(3);
    let err = run_infection(&mut graph, &short).unwrap_err();
    assert!(matches!(
        err,
        InfectionError::InsufficientConnections { reached: 2, requested: 3 }
    ));
    assert_eq!(graph.infected_users().count(), 0);
}

#[test]
fn test_malformed_file_fails_to_load() {
    for contents in ["Dan Jesse\n", "Dan:coach Jesse 5\n", "Dan Jesse five\n"] {
        let file = graph_file(contents);
        let err = load_graph(file.path(), None).unwrap_err();
        assert!(
            matches!(err, InfectionError::LoadFormat { line: 1, .. }),
            "unexpected error for {contents:?}: {err}"
        );
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load_graph("/nonexistent/graph.txt", None).unwrap_err();
    assert!(matches!(err, InfectionError::Io(_)));
}

#[test]
fn test_execute_run_reports_json() {
    let file = graph_file(CLASSROOM);
    let policy = Policy::new(InfectionType::Exact).with_seed("Ann").with_max_count(2);
    let report = execute_run(&plan(&file, policy)).unwrap();

    let value: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(value["strategy"], "exact");
    assert_eq!(value["infected"], serde_json::json!(["Ann", "Bo"]));
    let versions: Vec<u64> = value["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["version"].as_u64().unwrap())
        .collect();
    assert_eq!(versions.iter().filter(|v| **v == 2).count(), 2);
}

#[test]
fn test_execute_run_writes_dot() {
    let file = graph_file(CLASSROOM);
    let dir = tempfile::tempdir().unwrap();
    let dot_path = dir.path().join("graph.dot");

    let mut run = plan(&file, Policy::new(InfectionType::Admin));
    run.dot = Some(dot_path.clone());
    execute_run(&run).unwrap();

    let dot = std::fs::read_to_string(dot_path).unwrap();
    assert!(dot.contains("label=\"Sal (v2)\""));
    assert!(dot.contains("label=\"Ann (v1)\""));
}
