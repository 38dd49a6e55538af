//! Top-level orchestration between the breeding machinery and an external
//! fitness environment.
//!
//! The environment asks for a batch of networks, runs them, and reports one
//! score per network. The next call to [`Engine::next_generation`] breeds from
//! those scores. Calls must be serialized: evaluate networks on as many
//! threads as needed, but route `set_score` through a single owner or a mutex.

use std::ops::Range;

use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{NeuroError, Result};
use crate::genome::Genome;
use crate::history::GenerationHistory;
use crate::network::{Network, NetworkHandle, Snapshot};

pub struct Engine {
    config: EngineConfig,
    history: GenerationHistory,
    rng: ChaCha12Rng,
    /// Distinguishes handles issued by different engines
    id: u64,
    next_serial: u64,
    /// Serials issued with the latest batch
    batch: Range<u64>,
    round: u64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::from_entropy(),
        };

        info!(
            topology = ?config.topology.neuron_counts(),
            population = config.population,
            seed = ?config.seed,
            "Neuroevolution engine initialized"
        );

        Ok(Self {
            config,
            history: GenerationHistory::new(),
            rng,
            id: rand::random(),
            next_serial: 0,
            batch: 0..0,
            round: 0,
        })
    }

    /// Produce the next batch of networks to evaluate.
    ///
    /// The first call yields `population` random networks. Later calls breed
    /// from the scores recorded since the previous call and fail with
    /// [`NeuroError::IncompleteGeneration`] if too few were recorded.
    pub fn next_generation(&mut self) -> Result<Vec<Network>> {
        let snapshots = self
            .history
            .next_population(&self.config, &mut self.rng)?;

        let start = self.next_serial;
        let networks = snapshots
            .iter()
            .enumerate()
            .map(|(i, snapshot)| {
                Network::from_snapshot(snapshot).map(|net| {
                    net.with_handle(NetworkHandle {
                        engine: self.id,
                        serial: start + i as u64,
                    })
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.next_serial = start + networks.len() as u64;
        self.batch = start..self.next_serial;
        self.history.compact();
        self.round += 1;

        info!(
            round = self.round,
            networks = networks.len(),
            previous_best = ?self.history.previous().and_then(|g| g.best()).map(Genome::score),
            "Generation issued"
        );

        Ok(networks)
    }

    /// Record the fitness of a network from the latest batch.
    pub fn set_score(&mut self, network: &Network, score: f64) -> Result<()> {
        let issued = network
            .handle()
            .is_some_and(|h| h.engine == self.id && self.batch.contains(&h.serial));
        if !issued {
            warn!(handle = ?network.handle(), "Score for unknown network rejected");
            return Err(NeuroError::UnknownNetworkHandle);
        }
        if score.is_nan() {
            warn!("NaN score rejected");
            return Err(NeuroError::InvalidScore(score));
        }

        debug!(score, "Genome recorded");
        self.history.add_genome(Genome::new(score, network.export()));
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &GenerationHistory {
        &self.history
    }

    /// Number of batches issued so far.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Best snapshot scored so far in the current round.
    pub fn best_snapshot(&self) -> Option<&Snapshot> {
        self.history
            .current()
            .and_then(|g| g.best())
            .and_then(Genome::network)
    }
}
