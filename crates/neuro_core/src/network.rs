//! Layered feed-forward networks and their flat weight snapshots.
//!
//! A network is a sequence of fully connected layers. Layer 0 is the input
//! layer and holds no weights; every neuron of layer `i > 0` holds exactly one
//! weight per neuron of layer `i - 1`. Activation is the logistic function, so
//! every computed value lies in (0, 1).

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::NetworkTopology;
use crate::error::{NeuroError, Result};

/// Uniform weight in [-1, 1).
pub fn random_weight<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(-1.0..1.0)
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Flat, serializable form of a network.
///
/// `weights` concatenates every non-input neuron's weights in layer order,
/// then neuron order, then weight order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "neuronCounts")]
    pub neuron_counts: Vec<usize>,
    pub weights: Vec<f64>,
}

impl Snapshot {
    /// Flat weight length implied by a list of layer sizes, `None` on overflow.
    pub fn weight_count_for(neuron_counts: &[usize]) -> Option<usize> {
        neuron_counts
            .windows(2)
            .try_fold(0usize, |total, w| total.checked_add(w[0].checked_mul(w[1])?))
    }

    /// Same layout, every weight redrawn from [-1, 1).
    pub fn randomized<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        Self {
            neuron_counts: self.neuron_counts.clone(),
            weights: self.weights.iter().map(|_| random_weight(rng)).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    /// Output of the last compute pass
    pub value: f64,
    /// One weight per neuron of the previous layer
    pub weights: Vec<f64>,
}

impl Neuron {
    fn with_weights(weights: Vec<f64>) -> Self {
        Self { value: 0.0, weights }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub index: usize,
    pub neurons: Vec<Neuron>,
}

/// Identifies a network issued by a specific engine in a specific batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkHandle {
    pub(crate) engine: u64,
    pub(crate) serial: u64,
}

#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
    handle: Option<NetworkHandle>,
}

impl Network {
    /// Fresh network with uniform random weights.
    pub fn random<R: Rng + ?Sized>(topology: &NetworkTopology, rng: &mut R) -> Self {
        let counts = topology.neuron_counts();
        let mut layers = Vec::with_capacity(counts.len());
        let mut previous = 0;

        for (index, &count) in counts.iter().enumerate() {
            let neurons = (0..count)
                .map(|_| Neuron::with_weights((0..previous).map(|_| random_weight(rng)).collect()))
                .collect();
            layers.push(Layer { index, neurons });
            previous = count;
        }

        Self {
            layers,
            handle: None,
        }
    }

    /// Rebuild a network from its flat form.
    ///
    /// Weights are consumed strictly in order; values past the required
    /// length are ignored.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self> {
        let counts = &snapshot.neuron_counts;
        // With two or more non-empty layers every layer size is bounded by
        // the weight count, so nothing is allocated beyond the supplied data.
        if counts.len() < 2 {
            return Err(NeuroError::MalformedSnapshot(format!(
                "{} layers declared, an input and an output layer are required",
                counts.len()
            )));
        }
        if let Some(pos) = counts.iter().position(|&n| n == 0) {
            return Err(NeuroError::MalformedSnapshot(format!(
                "layer {pos} declares zero neurons"
            )));
        }

        let required = Snapshot::weight_count_for(counts).ok_or_else(|| {
            NeuroError::MalformedSnapshot(format!("weight count of layers {counts:?} overflows"))
        })?;
        if snapshot.weights.len() < required {
            return Err(NeuroError::MalformedSnapshot(format!(
                "{} weights supplied, {required} required by layers {counts:?}",
                snapshot.weights.len()
            )));
        }

        let mut flat = snapshot.weights.iter().copied();
        let mut layers = Vec::with_capacity(counts.len());
        let mut previous = 0;

        for (index, &count) in counts.iter().enumerate() {
            let neurons = (0..count)
                .map(|_| Neuron::with_weights(flat.by_ref().take(previous).collect()))
                .collect();
            layers.push(Layer { index, neurons });
            previous = count;
        }

        Ok(Self {
            layers,
            handle: None,
        })
    }

    pub(crate) fn with_handle(mut self, handle: NetworkHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn handle(&self) -> Option<NetworkHandle> {
        self.handle
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn neuron_counts(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.neurons.len()).collect()
    }

    /// Forward pass.
    ///
    /// Inputs beyond the input layer are ignored and missing inputs read as 0,
    /// so the result depends only on the weights and the supplied slice.
    pub fn compute(&mut self, inputs: &[f64]) -> Vec<f64> {
        let Some((input, rest)) = self.layers.split_first_mut() else {
            return Vec::new();
        };
        for (i, neuron) in input.neurons.iter_mut().enumerate() {
            neuron.value = inputs.get(i).copied().unwrap_or(0.0);
        }

        let mut previous: Vec<f64> = input.neurons.iter().map(|n| n.value).collect();
        for layer in rest.iter_mut() {
            for neuron in layer.neurons.iter_mut() {
                let sum: f64 = neuron
                    .weights
                    .iter()
                    .zip(previous.iter())
                    .map(|(w, v)| w * v)
                    .sum();
                neuron.value = sigmoid(sum);
            }
            previous.clear();
            previous.extend(layer.neurons.iter().map(|n| n.value));
        }

        previous
    }

    /// Flatten into a [`Snapshot`].
    pub fn export(&self) -> Snapshot {
        let neuron_counts = self.neuron_counts();
        let mut weights =
            Vec::with_capacity(Snapshot::weight_count_for(&neuron_counts).unwrap_or_default());
        for neuron in self.layers.iter().flat_map(|l| l.neurons.iter()) {
            weights.extend_from_slice(&neuron.weights);
        }
        Snapshot {
            neuron_counts,
            weights,
        }
    }
}
