//! Spreading a site version upgrade ("infection") through a population of
//! users joined by weighted, undirected relationships.
//!
//! Build a [`RelationshipGraph`] (directly or with [`loader::load_graph`]),
//! then run one of the strategies in [`infection`] over it.

pub mod cli;
pub mod commands;
pub mod config;
pub mod dot;
pub mod error;
pub mod generator;
pub mod graph;
pub mod infection;
pub mod loader;
pub mod output;
pub mod user;

pub use error::{InfectionError, Result};
pub use graph::RelationshipGraph;
pub use infection::{
    Infected, InfectionType, Policy, admin_infection, exact_infection, limited_infection,
    run_infection, total_infection,
};
pub use user::User;
