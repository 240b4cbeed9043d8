use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::error::{InfectionError, Result};

/// Version every user starts on.
pub const BASE_VERSION: u32 = 1;
/// Version an infected user is moved to.
pub const UPGRADED_VERSION: u32 = 2;

/// Range random relationship weights are drawn from when none is given.
const RANDOM_WEIGHT_RANGE: std::ops::Range<u32> = 1..50;

/// A member of the population.
///
/// Relationships are stored by neighbor identity so that the graph stays the
/// sole owner of every `User`. Equality and hashing use the identity only.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    identity: String,
    is_admin: bool,
    version: u32,
    #[serde(skip)]
    relationships: HashMap<String, u32>,
}

impl User {
    pub fn new(identity: impl Into<String>, is_admin: bool) -> Self {
        User {
            identity: identity.into(),
            is_admin,
            version: BASE_VERSION,
            relationships: HashMap::new(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_infected(&self) -> bool {
        self.version == UPGRADED_VERSION
    }

    /// Moves the user onto the upgraded version. Returns `false` if the user
    /// was already infected.
    pub fn infect(&mut self) -> bool {
        if self.is_infected() {
            return false;
        }
        self.version = UPGRADED_VERSION;
        true
    }

    /// Records a one-sided relationship to `other`.
    ///
    /// An existing relationship is left untouched, weight included. Without
    /// an explicit weight one is drawn from `rng`. The graph is responsible
    /// for calling this on both endpoints.
    pub fn add_relationship<R: Rng>(
        &mut self,
        other: &str,
        weight: Option<u32>,
        rng: &mut R,
    ) -> Result<()> {
        if weight == Some(0) {
            return Err(InfectionError::InvalidWeight(0));
        }
        if self.relationships.contains_key(other) {
            return Ok(());
        }
        let weight = weight.unwrap_or_else(|| random_weight(rng));
        self.relationships.insert(other.to_string(), weight);
        Ok(())
    }

    pub fn remove_relationship(&mut self, other: &str) {
        self.relationships.remove(other);
    }

    /// Iterates over `(neighbor identity, weight)` pairs in no particular order.
    pub fn relationships(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.relationships
            .iter()
            .map(|(name, weight)| (name.as_str(), *weight))
    }

    pub fn degree(&self) -> usize {
        self.relationships.len()
    }

    pub fn weight_to(&self, other: &User) -> Option<u32> {
        self.weight_to_identity(&other.identity)
    }

    pub fn weight_to_identity(&self, other: &str) -> Option<u32> {
        self.relationships.get(other).copied()
    }

    pub fn is_related_to(&self, other: &str) -> bool {
        self.relationships.contains_key(other)
    }
}

pub(crate) fn random_weight<R: Rng>(rng: &mut R) -> u32 {
    rng.gen_range(RANDOM_WEIGHT_RANGE)
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "User: {}", self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_new_user_starts_on_base_version() {
        let user = User::new("Dan", false);
        assert_eq!(user.version(), BASE_VERSION);
        assert!(!user.is_infected());
        assert_eq!(user.degree(), 0);
    }

    #[test]
    fn test_infect_is_idempotent() {
        let mut user = User::new("Dan", false);
        assert!(user.infect());
        assert!(!user.infect());
        assert_eq!(user.version(), UPGRADED_VERSION);
    }

    #[test]
    fn test_zero_weight_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut user = User::new("Dan", false);
        let err = user.add_relationship("Jesse", Some(0), &mut rng).unwrap_err();
        assert!(matches!(err, InfectionError::InvalidWeight(0)));
        assert_eq!(user.degree(), 0);
    }

    #[test]
    fn test_existing_relationship_keeps_weight() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut user = User::new("Dan", false);
        user.add_relationship("Jesse", Some(5), &mut rng).unwrap();
        user.add_relationship("Jesse", Some(9), &mut rng).unwrap();
        assert_eq!(user.weight_to_identity("Jesse"), Some(5));
        assert_eq!(user.degree(), 1);
    }

    #[test]
    fn test_random_weight_is_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut user = User::new("Dan", false);
        for i in 0..100 {
            user.add_relationship(&format!("peer{i}"), None, &mut rng).unwrap();
        }
        assert!(user.relationships().all(|(_, w)| (1..50).contains(&w)));
    }

    #[test]
    fn test_remove_relationship() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut user = User::new("Dan", false);
        user.add_relationship("Jesse", Some(3), &mut rng).unwrap();
        user.remove_relationship("Jesse");
        user.remove_relationship("Nobody");
        assert_eq!(user.weight_to_identity("Jesse"), None);
        assert_eq!(user.degree(), 0);
    }

    #[test]
    fn test_relationships_iterator_restarts() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut user = User::new("Dan", false);
        user.add_relationship("A", Some(1), &mut rng).unwrap();
        user.add_relationship("B", Some(2), &mut rng).unwrap();
        let first: u32 = user.relationships().map(|(_, w)| w).sum();
        let second: u32 = user.relationships().map(|(_, w)| w).sum();
        assert_eq!(first, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_equality_uses_identity() {
        let mut admin = User::new("Dan", true);
        admin.infect();
        assert_eq!(admin, User::new("Dan", false));
        assert_ne!(admin, User::new("Jesse", true));
    }
}
