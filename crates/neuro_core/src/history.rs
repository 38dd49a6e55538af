//! Bounded record of generations over time.
//!
//! At most two generations are held: the previous round, kept for its
//! scores once its networks have been released, and the current round,
//! which collects scores for the batch most recently handed out.

use std::collections::VecDeque;

use rand::Rng;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::genome::Genome;
use crate::generation::Generation;
use crate::network::{Network, Snapshot};

const MAX_DEPTH: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct GenerationHistory {
    generations: VecDeque<Generation>,
}

impl GenerationHistory {
    pub fn new() -> Self {
        Self {
            generations: VecDeque::with_capacity(MAX_DEPTH + 1),
        }
    }

    /// `population` fresh random snapshots, plus an empty generation to
    /// collect their scores.
    pub fn first_population<R: Rng + ?Sized>(
        &mut self,
        config: &EngineConfig,
        rng: &mut R,
    ) -> Vec<Snapshot> {
        let population = (0..config.population)
            .map(|_| Network::random(&config.topology, rng).export())
            .collect();
        self.generations.push_back(Generation::new());
        population
    }

    /// Breed from the current generation and open a new one for the
    /// returned batch. History is left untouched on error.
    pub fn next_population<R: Rng + ?Sized>(
        &mut self,
        config: &EngineConfig,
        rng: &mut R,
    ) -> Result<Vec<Snapshot>> {
        let Some(current) = self.generations.back() else {
            return Ok(self.first_population(config, rng));
        };
        let population = current.next_population(config, rng)?;
        self.generations.push_back(Generation::new());
        Ok(population)
    }

    /// Record a score in the current generation. Ignored before the first
    /// population exists.
    pub fn add_genome(&mut self, genome: Genome) {
        if let Some(current) = self.generations.back_mut() {
            current.add_genome(genome);
        }
    }

    /// Release networks of the generation just bred from and drop anything
    /// older than it.
    pub fn compact(&mut self) {
        let len = self.generations.len();
        if len >= 2 {
            if let Some(previous) = self.generations.get_mut(len - 2) {
                previous.release_networks();
            }
        }
        while self.generations.len() > MAX_DEPTH {
            self.generations.pop_front();
        }

        debug_assert!(self.generations.len() <= MAX_DEPTH);
        debug_assert!(self
            .generations
            .iter()
            .rev()
            .skip(1)
            .all(|g| g.genomes().iter().all(|genome| genome.network().is_none())));
        debug!(depth = self.generations.len(), "History compacted");
    }

    /// Generation collecting scores for the latest batch.
    pub fn current(&self) -> Option<&Generation> {
        self.generations.back()
    }

    /// Last fully scored generation, with networks released.
    pub fn previous(&self) -> Option<&Generation> {
        let len = self.generations.len();
        if len >= 2 {
            self.generations.get(len - 2)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Generation> {
        self.generations.iter()
    }
}
