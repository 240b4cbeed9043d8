//! Infection strategies.
//!
//! Each strategy first works out which users it reaches by reading the graph,
//! then moves those users onto the upgraded version. Users reached by a run
//! are returned sorted by identity.
//!
//! | Strategy | Roots | Traversal | Bound |
//! |----------|-------|-----------|-------|
//! | Total    | seed        | breadth-first | whole component |
//! | Admin    | every admin | breadth-first | union of components |
//! | Limited  | seed        | weight-ranked | at most `max_count`, best effort |
//! | Exact    | seed        | weight-ranked | exactly `max_count` or an error |

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, VecDeque};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{InfectionError, Result};
use crate::graph::RelationshipGraph;

/// Identities of the users reached by one infection run.
pub type Infected = BTreeSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfectionType {
    Total,
    Limited,
    Exact,
    Admin,
}

impl InfectionType {
    pub const ALL: [InfectionType; 4] = [
        InfectionType::Total,
        InfectionType::Limited,
        InfectionType::Exact,
        InfectionType::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InfectionType::Total => "total",
            InfectionType::Limited => "limited",
            InfectionType::Exact => "exact",
            InfectionType::Admin => "admin",
        }
    }

    pub fn requires_seed(&self) -> bool {
        !matches!(self, InfectionType::Admin)
    }

    pub fn requires_max_count(&self) -> bool {
        matches!(self, InfectionType::Limited | InfectionType::Exact)
    }
}

impl fmt::Display for InfectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InfectionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        InfectionType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = InfectionType::ALL.iter().map(|k| k.as_str()).collect();
                format!("Infection type should be one of {}", names.join(", "))
            })
    }
}

/// Parameters for a single infection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub kind: InfectionType,
    pub seed: Option<String>,
    pub max_count: Option<usize>,
}

impl Policy {
    pub fn new(kind: InfectionType) -> Self {
        Policy {
            kind,
            seed: None,
            max_count: None,
        }
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// Checks that the parameters the strategy needs are present.
    pub fn validate(&self) -> Result<()> {
        if self.kind.requires_seed() && self.seed.is_none() {
            return Err(InfectionError::MissingParameter {
                kind: self.kind.as_str(),
                parameter: "a user to infect",
            });
        }
        if self.kind.requires_max_count() && self.max_count.is_none() {
            return Err(InfectionError::MissingParameter {
                kind: self.kind.as_str(),
                parameter: "a maximum number of users to infect",
            });
        }
        Ok(())
    }
}

/// Runs the strategy selected by `policy`.
pub fn run_infection<R: Rng>(graph: &mut RelationshipGraph<R>, policy: &Policy) -> Result<Infected> {
    policy.validate()?;
    let seed = policy.seed.as_deref().unwrap_or_default();
    let max_count = policy.max_count.unwrap_or_default();

    match policy.kind {
        InfectionType::Total => total_infection(graph, seed),
        InfectionType::Limited => limited_infection(graph, seed, max_count),
        InfectionType::Exact => exact_infection(graph, seed, max_count),
        InfectionType::Admin => admin_infection(graph),
    }
}

/// Infects the seed and everyone transitively related to it.
pub fn total_infection<R: Rng>(graph: &mut RelationshipGraph<R>, seed: &str) -> Result<Infected> {
    require_user(graph, seed)?;
    let infected = breadth_first(graph, [seed.to_string()]);
    commit(graph, &infected, InfectionType::Total);
    Ok(infected)
}

/// Infects every admin and everyone transitively related to an admin.
pub fn admin_infection<R: Rng>(graph: &mut RelationshipGraph<R>) -> Result<Infected> {
    let roots: Vec<String> = graph
        .admin_users()
        .map(|user| user.identity().to_string())
        .collect();
    debug!(admins = roots.len(), "seeding admin infection");

    let infected = breadth_first(graph, roots);
    commit(graph, &infected, InfectionType::Admin);
    Ok(infected)
}

/// Infects up to `max_count` users, favouring heavy relationships found early.
///
/// Running out of reachable users before `max_count` is not an error; the
/// infection simply stays smaller.
pub fn limited_infection<R: Rng>(
    graph: &mut RelationshipGraph<R>,
    seed: &str,
    max_count: usize,
) -> Result<Infected> {
    require_user(graph, seed)?;
    let traversal = ranked_traversal(graph, seed, max_count);
    if traversal.exhausted {
        info!(
            reached = traversal.infected.len(),
            requested = max_count,
            "limited infection ran out of connections"
        );
    }
    commit(graph, &traversal.infected, InfectionType::Limited);
    Ok(traversal.infected)
}

/// Infects exactly `max_count` users or fails without changing any version.
pub fn exact_infection<R: Rng>(
    graph: &mut RelationshipGraph<R>,
    seed: &str,
    max_count: usize,
) -> Result<Infected> {
    require_user(graph, seed)?;
    if graph.size() < max_count {
        return Err(InfectionError::GraphTooSmall {
            size: graph.size(),
            requested: max_count,
        });
    }

    let traversal = ranked_traversal(graph, seed, max_count);
    if traversal.exhausted {
        return Err(InfectionError::InsufficientConnections {
            reached: traversal.infected.len(),
            requested: max_count,
        });
    }
    commit(graph, &traversal.infected, InfectionType::Exact);
    Ok(traversal.infected)
}

fn require_user<R: Rng>(graph: &RelationshipGraph<R>, identity: &str) -> Result<()> {
    if graph.contains(identity) {
        Ok(())
    } else {
        Err(InfectionError::UserNotFound(identity.to_string()))
    }
}

fn breadth_first<R: Rng>(
    graph: &RelationshipGraph<R>,
    roots: impl IntoIterator<Item = String>,
) -> Infected {
    let mut infected = Infected::new();
    let mut queue: VecDeque<String> = roots.into_iter().collect();

    while let Some(identity) = queue.pop_front() {
        if infected.contains(&identity) {
            continue;
        }
        let Some(user) = graph.get_user(&identity) else {
            continue;
        };
        queue.extend(
            user.relationships()
                .filter(|(neighbor, _)| !infected.contains(*neighbor))
                .map(|(neighbor, _)| neighbor.to_string()),
        );
        infected.insert(identity);
    }

    infected
}

struct Traversal {
    infected: Infected,
    /// The queue emptied before `max_count` users were reached.
    exhausted: bool,
}

/// Weight-ranked traversal shared by limited and exact infection.
///
/// Candidates sit in a min-heap keyed by `-(multiplier * weight)`, where the
/// multiplier grows by one on every dequeue, stale entries included. Every
/// neighbor of a newly reached user is queued, already reached ones too, so a
/// user may sit in the queue once per relationship. Entries for users already
/// reached are dropped when dequeued. Equal keys pop in identity order.
fn ranked_traversal<R: Rng>(graph: &RelationshipGraph<R>, seed: &str, max_count: usize) -> Traversal {
    let mut infected = Infected::new();
    let mut queue = BinaryHeap::new();
    queue.push(Reverse((0i64, seed.to_string())));
    let mut multiplier: i64 = 1;

    while infected.len() < max_count {
        let Some(Reverse((_, identity))) = queue.pop() else {
            return Traversal {
                infected,
                exhausted: true,
            };
        };

        if !infected.contains(&identity) {
            if let Some(user) = graph.get_user(&identity) {
                for (neighbor, weight) in user.relationships() {
                    let key = -multiplier * i64::from(weight);
                    queue.push(Reverse((key, neighbor.to_string())));
                }
            }
            infected.insert(identity);
        }

        multiplier += 1;
    }

    Traversal {
        infected,
        exhausted: false,
    }
}

fn commit<R: Rng>(graph: &mut RelationshipGraph<R>, infected: &Infected, kind: InfectionType) {
    let mut upgraded = 0usize;
    for identity in infected {
        if let Some(user) = graph.get_user_mut(identity) {
            if user.infect() {
                debug!(user = %identity, "infected");
                upgraded += 1;
            }
        }
    }
    info!(
        strategy = %kind,
        reached = infected.len(),
        upgraded,
        "infection complete"
    );
}
