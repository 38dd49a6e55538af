use thiserror::Error;

/// Errors surfaced by the neuroevolution engine.
///
/// Every failure is reported synchronously; nothing is retried internally.
#[derive(Debug, Error)]
pub enum NeuroError {
    /// Population or topology sizes are not positive, or a rate is outside [0, 1].
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A flat weight snapshot cannot fill the layers it declares.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// `set_score` received a network this engine did not issue for the current batch.
    #[error("network was not issued by this engine for the current batch")]
    UnknownNetworkHandle,

    /// The current generation has too few scored genomes to breed from.
    #[error("generation has {scored} scored genomes, {required} required to breed the next population")]
    IncompleteGeneration { scored: usize, required: usize },

    /// NaN scores cannot be ranked.
    #[error("score {0} cannot be ranked")]
    InvalidScore(f64),

    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, NeuroError>;
