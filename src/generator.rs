use csv::WriterBuilder;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng, thread_rng};
use rayon::prelude::*;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};

use crate::error::{InfectionError, Result};

const MAX_BATCHES: usize = 16;

pub struct UsernameGenerator {
    prefixes: Vec<&'static str>,
    suffixes: Vec<&'static str>,
    used_names: Mutex<HashSet<String>>,
    seed: u64,
}

impl UsernameGenerator {
    pub fn new(seed: u64) -> Self {
        UsernameGenerator {
            prefixes: vec![
                "coach", "tutor", "mentor", "learner", "scholar", "pupil", "teacher", "reader",
                "quiet", "bright", "eager", "curious", "steady", "clever", "patient",
            ],
            suffixes: vec![
                "fox", "owl", "otter", "heron", "badger", "lynx", "wren", "falcon", "hare",
                "panda", "koala", "raven", "bison", "moose", "seal",
            ],
            used_names: Mutex::new(HashSet::new()),
            seed,
        }
    }

    /// Generates up to `count` names not handed out before. Each index draws
    /// from its own seeded source, so a given seed always yields the same
    /// batch.
    pub fn generate_unique_batch(&self, count: usize, batch: usize) -> Vec<String> {
        let candidates: Vec<String> = (0..count)
            .into_par_iter()
            .map(|i| {
                let mut rng = indexed_rng(self.seed, batch, i);
                let prefix = self.prefixes.choose(&mut rng).copied().unwrap_or("user");
                let suffix = self.suffixes.choose(&mut rng).copied().unwrap_or("");
                let num = rng.gen_range(1..999);
                format!("{}{}{}", prefix, suffix, num)
            })
            .collect();

        // Dedup sequentially so the surviving order does not depend on thread scheduling.
        let mut used = match self.used_names.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        candidates
            .into_iter()
            .filter(|name| used.insert(name.clone()))
            .collect()
    }

    /// Keeps generating batches until `count` unique names exist or the name
    /// space looks exhausted.
    pub fn generate_unique(&self, count: usize) -> Vec<String> {
        let mut names = Vec::with_capacity(count);
        for batch in 0..MAX_BATCHES {
            if names.len() >= count {
                break;
            }
            names.extend(self.generate_unique_batch(count - names.len(), batch));
        }
        if names.len() < count {
            warn!(requested = count, generated = names.len(), "ran out of unique usernames");
        }
        names
    }
}

fn indexed_rng(seed: u64, batch: usize, index: usize) -> StdRng {
    let mix = (batch as u64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(index as u64);
    StdRng::seed_from_u64(seed ^ mix.wrapping_mul(0xBF58_476D_1CE4_E5B9))
}

/// Parameters for a synthetic population.
#[derive(Debug, Clone)]
pub struct Population {
    pub users: usize,
    pub relationships: usize,
    /// Fraction of users flagged as admins, in `[0, 1]`.
    pub admin_ratio: f64,
    pub seed: Option<u64>,
}

/// Writes a random population as relationship records in the loader format.
pub fn write_population<W: Write>(population: &Population, writer: W) -> Result<usize> {
    if !(0.0..=1.0).contains(&population.admin_ratio) {
        return Err(InfectionError::Config(format!(
            "admin ratio must be between 0 and 1, got {}",
            population.admin_ratio
        )));
    }

    let seed = population.seed.unwrap_or_else(|| thread_rng().r#gen());
    let names = UsernameGenerator::new(seed).generate_unique(population.users);
    if names.len() < 2 {
        return Err(InfectionError::Config(
            "a population needs at least two users".to_string(),
        ));
    }

    let admins = ((names.len() as f64) * population.admin_ratio).round() as usize;
    let tokens: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i < admins {
                format!("{name}:admin")
            } else {
                name.clone()
            }
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut writer = WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .from_writer(writer);

    let mut written = 0usize;
    while written < population.relationships {
        let a = rng.gen_range(0..tokens.len());
        let b = rng.gen_range(0..tokens.len());
        if a == b {
            continue;
        }
        let weight = rng.gen_range(1..=20u32).to_string();
        writer.write_record([tokens[a].as_str(), tokens[b].as_str(), weight.as_str()])?;
        written += 1;
    }
    writer.flush()?;

    info!(users = tokens.len(), admins, relationships = written, "generated population");
    Ok(written)
}

pub fn generate_population_file(population: &Population, path: impl AsRef<Path>) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    write_population(population, std::io::BufWriter::new(file))
}
