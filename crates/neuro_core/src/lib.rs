//! Neuroevolution engine.
//!
//! Evolves populations of small feed-forward networks with a genetic
//! algorithm. Fitness comes from outside: an environment pulls a batch with
//! [`Engine::next_generation`], drives each [`Network`] through
//! [`Network::compute`], and reports results with [`Engine::set_score`].
//!
//! Each round the ranked scores are turned into the next population by
//! elitism, random reseeding, and crossover with the best genome followed by
//! point mutation.

pub mod config;
pub mod engine;
pub mod error;
pub mod generation;
pub mod genome;
pub mod history;
pub mod network;

pub use config::{EngineConfig, NetworkTopology};
pub use engine::Engine;
pub use error::{NeuroError, Result};
pub use generation::Generation;
pub use genome::Genome;
pub use history::GenerationHistory;
pub use network::{Layer, Network, NetworkHandle, Neuron, Snapshot};
