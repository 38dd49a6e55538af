use serde::{Deserialize, Serialize};

use crate::network::Snapshot;

/// A scored network snapshot.
///
/// The network is released once the generation it belongs to has been bred
/// from; only the score survives after that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    score: f64,
    network: Option<Snapshot>,
}

impl Genome {
    pub fn new(score: f64, network: Snapshot) -> Self {
        Self {
            score,
            network: Some(network),
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// `None` once the network has been released by history compaction.
    pub fn network(&self) -> Option<&Snapshot> {
        self.network.as_ref()
    }

    pub(crate) fn release_network(&mut self) {
        self.network = None;
    }
}
