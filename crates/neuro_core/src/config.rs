use serde::{Deserialize, Serialize};

use crate::error::{NeuroError, Result};

/// Layer sizes of every network the engine breeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTopology {
    /// Input layer size
    pub inputs: usize,
    /// Hidden layer sizes, in order (may be empty)
    #[serde(default)]
    pub hidden: Vec<usize>,
    /// Output layer size
    pub outputs: usize,
}

impl NetworkTopology {
    pub fn new(inputs: usize, hidden: Vec<usize>, outputs: usize) -> Self {
        Self {
            inputs,
            hidden,
            outputs,
        }
    }

    /// Neuron count per layer, input layer first.
    pub fn neuron_counts(&self) -> Vec<usize> {
        let mut counts = Vec::with_capacity(self.hidden.len() + 2);
        counts.push(self.inputs);
        counts.extend_from_slice(&self.hidden);
        counts.push(self.outputs);
        counts
    }
}

impl Default for NetworkTopology {
    fn default() -> Self {
        Self {
            inputs: 3,
            hidden: vec![15],
            outputs: 1,
        }
    }
}

/// Engine configuration, fixed for the lifetime of an [`crate::Engine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub topology: NetworkTopology,
    /// Networks per generation
    #[serde(default = "default_population")]
    pub population: usize,
    /// Share of the population carried over unchanged
    #[serde(default = "default_elitism")]
    pub elitism: f64,
    /// Share of the population reseeded with fresh random weights
    #[serde(default = "default_random_behavior")]
    pub random_behavior: f64,
    /// Per-weight mutation probability
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Mutations add a value drawn from [-mutation_range, mutation_range]
    #[serde(default = "default_mutation_range")]
    pub mutation_range: f64,
    /// Probability of keeping the stronger parent's weight during crossover
    #[serde(default = "default_convergence")]
    pub convergence: f64,
    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_population() -> usize {
    50
}
fn default_elitism() -> f64 {
    0.2
}
fn default_random_behavior() -> f64 {
    0.1
}
fn default_mutation_rate() -> f64 {
    0.2
}
fn default_mutation_range() -> f64 {
    0.5
}
fn default_convergence() -> f64 {
    0.7
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(NetworkTopology::default(), default_population())
    }
}

impl EngineConfig {
    /// Configuration with the given topology and population and default rates.
    pub fn new(topology: NetworkTopology, population: usize) -> Self {
        Self {
            topology,
            population,
            elitism: default_elitism(),
            random_behavior: default_random_behavior(),
            mutation_rate: default_mutation_rate(),
            mutation_range: default_mutation_range(),
            convergence: default_convergence(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        // A single network leaves no children to breed, so the second batch
        // would be empty and the third could never be produced.
        if self.population < 2 {
            return Err(NeuroError::InvalidConfig(format!(
                "population must be at least 2, got {}",
                self.population
            )));
        }
        if self.topology.inputs == 0 || self.topology.outputs == 0 {
            return Err(NeuroError::InvalidConfig(
                "input and output layers need at least one neuron".into(),
            ));
        }
        if let Some(pos) = self.topology.hidden.iter().position(|&n| n == 0) {
            return Err(NeuroError::InvalidConfig(format!(
                "hidden layer {pos} has no neurons"
            )));
        }

        let rates = [
            ("elitism", self.elitism),
            ("random_behavior", self.random_behavior),
            ("mutation_rate", self.mutation_rate),
            ("convergence", self.convergence),
        ];
        for (name, rate) in rates {
            if !(0.0..=1.0).contains(&rate) {
                return Err(NeuroError::InvalidConfig(format!(
                    "{name} must lie in [0, 1], got {rate}"
                )));
            }
        }
        // Mutation samples from a span of width 2 * mutation_range.
        if !(2.0 * self.mutation_range).is_finite() || self.mutation_range < 0.0 {
            return Err(NeuroError::InvalidConfig(format!(
                "mutation_range must be non-negative with a finite span, got {}",
                self.mutation_range
            )));
        }
        Ok(())
    }

    /// Number of elite slots: `round(elitism * population)`, capped at the population.
    pub fn elite_count(&self) -> usize {
        ((self.elitism * self.population as f64).round() as usize).min(self.population)
    }

    /// Number of random reseed slots requested: `round(random_behavior * population)`.
    pub fn random_count(&self) -> usize {
        (self.random_behavior * self.population as f64).round() as usize
    }

    /// Genomes a generation must hold before it can produce the next population.
    pub fn required_genomes(&self) -> usize {
        self.elite_count().max(self.population.saturating_sub(1))
    }
}
