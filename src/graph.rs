use petgraph::graph::{NodeIndex, UnGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{InfectionError, Result};
use crate::user::{self, User};

/// Undirected, weighted relationship graph keyed by user identity.
///
/// Every relationship is stored as two symmetric entries with the same
/// weight, one on each endpoint. The random source is only consulted when a
/// relationship is added without an explicit weight; inject a seeded one with
/// [`RelationshipGraph::with_seed`] or [`RelationshipGraph::with_rng`] for
/// reproducible runs.
#[derive(Debug)]
pub struct RelationshipGraph<R = StdRng> {
    users: HashMap<String, User>,
    rng: R,
}

impl RelationshipGraph<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RelationshipGraph<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RelationshipGraph<R> {
    pub fn with_rng(rng: R) -> Self {
        RelationshipGraph {
            users: HashMap::new(),
            rng,
        }
    }

    pub fn size(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Adds a user unless one with `identity` already exists, in which case
    /// the existing user is returned unchanged (an existing non-admin is not
    /// promoted).
    pub fn add_user(&mut self, identity: &str, is_admin: bool) -> &User {
        self.users
            .entry(identity.to_string())
            .or_insert_with(|| User::new(identity, is_admin))
    }

    pub fn add_admin(&mut self, identity: &str) -> &User {
        self.add_user(identity, true)
    }

    pub fn get_user(&self, identity: &str) -> Option<&User> {
        self.users.get(identity)
    }

    pub(crate) fn get_user_mut(&mut self, identity: &str) -> Option<&mut User> {
        self.users.get_mut(identity)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.users.contains_key(identity)
    }

    pub fn all_users(&self) -> impl Iterator<Item = &User> + '_ {
        self.users.values()
    }

    pub fn admin_users(&self) -> impl Iterator<Item = &User> + '_ {
        self.all_users().filter(|user| user.is_admin())
    }

    pub fn infected_users(&self) -> impl Iterator<Item = &User> + '_ {
        self.all_users().filter(|user| user.is_infected())
    }

    /// Removes a user and both halves of every relationship touching it.
    pub fn remove_user(&mut self, identity: &str) -> Result<User> {
        let removed = self
            .users
            .remove(identity)
            .ok_or_else(|| InfectionError::InvalidUser(identity.to_string()))?;

        for (neighbor, _) in removed.relationships() {
            if let Some(other) = self.users.get_mut(neighbor) {
                other.remove_relationship(identity);
            }
        }
        debug!(user = identity, degree = removed.degree(), "removed user");
        Ok(removed)
    }

    /// Connects two existing users with a single weight applied to both ends.
    ///
    /// Connecting users that are already related keeps the original weight.
    pub fn add_relationship(&mut self, a: &str, b: &str, weight: Option<u32>) -> Result<()> {
        self.check_connection(a, b)?;
        if weight == Some(0) {
            return Err(InfectionError::InvalidWeight(0));
        }
        if self.users.get(a).is_some_and(|user| user.is_related_to(b)) {
            return Ok(());
        }

        let weight = weight.unwrap_or_else(|| user::random_weight(&mut self.rng));
        for (from, to) in [(a, b), (b, a)] {
            if let Some(user) = self.users.get_mut(from) {
                user.add_relationship(to, Some(weight), &mut self.rng)?;
            }
        }
        Ok(())
    }

    pub fn remove_relationship(&mut self, a: &str, b: &str) -> Result<()> {
        self.check_connection(a, b)?;
        for (from, to) in [(a, b), (b, a)] {
            if let Some(user) = self.users.get_mut(from) {
                user.remove_relationship(to);
            }
        }
        Ok(())
    }

    fn check_connection(&self, a: &str, b: &str) -> Result<()> {
        if a == b || !self.contains(a) || !self.contains(b) {
            return Err(InfectionError::InvalidConnection(a.to_string(), b.to_string()));
        }
        Ok(())
    }
}

impl<R> RelationshipGraph<R> {
    /// Snapshot of the graph as a petgraph `UnGraph`, one edge per
    /// relationship. Nodes are added in identity order.
    pub fn to_petgraph(&self) -> (UnGraph<String, u32>, HashMap<String, NodeIndex>) {
        let mut identities: Vec<&String> = self.users.keys().collect();
        identities.sort();

        let mut graph = UnGraph::with_capacity(identities.len(), 0);
        let node_indices: HashMap<String, NodeIndex> = identities
            .into_iter()
            .map(|identity| (identity.clone(), graph.add_node(identity.clone())))
            .collect();

        for user in self.users.values() {
            for (neighbor, weight) in user.relationships() {
                if user.identity() < neighbor {
                    if let (Some(&a), Some(&b)) =
                        (node_indices.get(user.identity()), node_indices.get(neighbor))
                    {
                        graph.add_edge(a, b, weight);
                    }
                }
            }
        }

        (graph, node_indices)
    }
}
