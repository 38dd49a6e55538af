//! One evolutionary round: a ranked set of genomes and the breeding rules
//! that derive the next population from it.

use rand::Rng;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{NeuroError, Result};
use crate::genome::Genome;
use crate::network::Snapshot;

#[derive(Debug, Clone, Default)]
pub struct Generation {
    /// Sorted by score, best first
    genomes: Vec<Genome>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping the descending order. A genome ranks ahead of existing
    /// genomes with an equal score.
    pub fn add_genome(&mut self, genome: Genome) {
        let pos = self
            .genomes
            .iter()
            .position(|g| g.score() <= genome.score())
            .unwrap_or(self.genomes.len());
        self.genomes.insert(pos, genome);
    }

    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    pub fn best(&self) -> Option<&Genome> {
        self.genomes.first()
    }

    pub fn mean_score(&self) -> Option<f64> {
        if self.genomes.is_empty() {
            return None;
        }
        let total: f64 = self.genomes.iter().map(Genome::score).sum();
        Some(total / self.genomes.len() as f64)
    }

    pub(crate) fn release_networks(&mut self) {
        for genome in &mut self.genomes {
            genome.release_network();
        }
    }

    /// Uniform crossover of `a` into a copy of `b`, followed by point mutation.
    ///
    /// Each weight is taken from `a` with probability `1 - convergence`, then
    /// shifted by a value in `[-mutation_range, mutation_range]` with
    /// probability `mutation_rate`. Neither parent is modified.
    pub fn breed<R: Rng + ?Sized>(
        a: &Snapshot,
        b: &Snapshot,
        config: &EngineConfig,
        rng: &mut R,
    ) -> Snapshot {
        let mut child = b.clone();

        for (weight, &donor) in child.weights.iter_mut().zip(a.weights.iter()) {
            if rng.gen_bool(1.0 - config.convergence) {
                *weight = donor;
            }
        }

        let range = config.mutation_range;
        for weight in child.weights.iter_mut() {
            if rng.gen_bool(config.mutation_rate) {
                *weight += rng.gen_range(-range..=range);
            }
        }

        child
    }

    /// Build the next population: elites, then random reseeds, then
    /// `population - 1` children of the best genome.
    ///
    /// The breeding pass is not capped, so the result is longer than
    /// `population` whenever the first two passes contributed entries.
    pub fn next_population<R: Rng + ?Sized>(
        &self,
        config: &EngineConfig,
        rng: &mut R,
    ) -> Result<Vec<Snapshot>> {
        // Only genomes still carrying a network can parent the next population.
        let networks: Vec<&Snapshot> = self.genomes.iter().map_while(Genome::network).collect();
        let required = config.required_genomes().max(1);
        if networks.len() < required {
            return Err(NeuroError::IncompleteGeneration {
                scored: networks.len(),
                required,
            });
        }
        let best = networks[0];

        let target = config.population;
        let mut next = Vec::with_capacity(target + target.saturating_sub(1));

        for network in networks.iter().take(config.elite_count()) {
            if next.len() < target {
                next.push((*network).clone());
            }
        }
        let elites = next.len();

        for _ in 0..config.random_count() {
            let fresh = best.randomized(rng);
            if next.len() < target {
                next.push(fresh);
            }
        }
        let reseeded = next.len() - elites;

        for parent in networks.iter().take(target.saturating_sub(1)) {
            next.push(Self::breed(parent, best, config, rng));
        }

        debug!(
            elites,
            reseeded,
            children = next.len() - elites - reseeded,
            best_score = self.genomes[0].score(),
            "Bred next population"
        );

        Ok(next)
    }
}
