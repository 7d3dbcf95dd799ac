//! A `FeedforwardNetwork` is a layered, fully-connected network
//! whose shape is fixed at construction.
//!
//! Each neuron of layer `l > 0` computes
//! `tanh(bias + Σ weight × activation)` over every neuron of
//! layer `l - 1`. Layer 0 simply holds the inputs; it carries
//! biases for symmetry with the persisted format, but they never
//! take part in any computation.
mod errors;
mod mutation;
mod persistence;

pub use errors::{PersistenceError, ShapeError};

use rand::Rng;

use std::fmt;

/// Minimum number of layers: input, at least one hidden, output.
pub const MIN_LAYERS: usize = 3;

/// Initial weights and biases are drawn uniformly from
/// `[-INITIAL_PARAMETER_BOUND, INITIAL_PARAMETER_BOUND]`.
pub const INITIAL_PARAMETER_BOUND: f64 = 0.5;

/// A fixed-shape feedforward neural network.
#[derive(Clone, Debug)]
pub struct FeedforwardNetwork {
    layer_sizes: Box<[usize]>,
    activations: Box<[Box<[f64]>]>,
    biases: Box<[Box<[f64]>]>,
    // Row-major per destination layer: weights[l - 1][neuron * layer_sizes[l - 1] + source].
    weights: Box<[Box<[f64]>]>,
    fitness: f32,
}

impl FeedforwardNetwork {
    /// Creates a network with the given layer sizes, with every
    /// weight and (non-input) bias drawn uniformly from
    /// `[-0.5, 0.5]`.
    ///
    /// # Errors
    /// Returns an error if fewer than [`MIN_LAYERS`] layers are
    /// given, or if any layer is empty.
    ///
    /// # Examples
    /// ```
    /// use neuroflap_nn::networks::FeedforwardNetwork;
    ///
    /// let network = FeedforwardNetwork::new(&[3, 4, 1], &mut rand::thread_rng()).unwrap();
    /// assert_eq!(network.layer_sizes(), &[3, 4, 1]);
    ///
    /// assert!(FeedforwardNetwork::new(&[3, 1], &mut rand::thread_rng()).is_err());
    /// ```
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        rng: &mut R,
    ) -> Result<FeedforwardNetwork, ShapeError> {
        let mut network = FeedforwardNetwork::zeroed(layer_sizes)?;
        let bound = INITIAL_PARAMETER_BOUND;
        for bias in network.biases.iter_mut().skip(1).flat_map(|l| l.iter_mut()) {
            *bias = rng.gen_range(-bound..=bound);
        }
        for weight in network.weights.iter_mut().flat_map(|l| l.iter_mut()) {
            *weight = rng.gen_range(-bound..=bound);
        }
        Ok(network)
    }

    /// Creates a network with the given layer sizes and every
    /// parameter set to zero. Such a network outputs exactly `0.0`
    /// for any input.
    ///
    /// # Errors
    /// Same as [`FeedforwardNetwork::new`].
    pub fn zeroed(layer_sizes: &[usize]) -> Result<FeedforwardNetwork, ShapeError> {
        validate_shape(layer_sizes)?;
        let per_layer = || {
            layer_sizes
                .iter()
                .map(|&size| vec![0.0; size].into_boxed_slice())
                .collect::<Box<[_]>>()
        };
        Ok(FeedforwardNetwork {
            layer_sizes: layer_sizes.into(),
            activations: per_layer(),
            biases: per_layer(),
            weights: layer_sizes
                .windows(2)
                .map(|pair| vec![0.0; pair[0] * pair[1]].into_boxed_slice())
                .collect(),
            fitness: 0.0,
        })
    }

    /// Propagates `inputs` through the network and returns the
    /// activations of the output layer.
    ///
    /// The result depends only on the inputs and the network's
    /// parameters: the activation buffers are fully overwritten
    /// on every call.
    ///
    /// # Panics
    /// Panics if `inputs.len()` differs from the size of the
    /// input layer.
    ///
    /// # Examples
    /// ```
    /// use neuroflap_nn::networks::FeedforwardNetwork;
    ///
    /// let mut network = FeedforwardNetwork::zeroed(&[2, 2, 1]).unwrap();
    /// network.set_weight(1, 0, 0, 1.0);
    /// network.set_weight(2, 0, 0, 1.0);
    ///
    /// let output = network.feed_forward(&[0.5, -3.0])[0];
    /// assert_eq!(output, 0.5f64.tanh().tanh());
    /// ```
    pub fn feed_forward(&mut self, inputs: &[f64]) -> &[f64] {
        assert_eq!(
            inputs.len(),
            self.layer_sizes[0],
            "input count does not match the network's input layer"
        );
        self.activations[0].copy_from_slice(inputs);

        for layer in 1..self.layer_sizes.len() {
            let (computed, remaining) = self.activations.split_at_mut(layer);
            let previous = &computed[layer - 1];
            let width = previous.len();
            let weights = &self.weights[layer - 1];
            for (neuron, (activation, bias)) in remaining[0]
                .iter_mut()
                .zip(self.biases[layer].iter())
                .enumerate()
            {
                let sum: f64 = weights[neuron * width..(neuron + 1) * width]
                    .iter()
                    .zip(previous.iter())
                    .map(|(weight, input)| weight * input)
                    .sum();
                *activation = (sum + bias).tanh();
            }
        }

        self.outputs()
    }

    /// Returns the output layer's activations from the last
    /// call to [`feed_forward`](Self::feed_forward).
    pub fn outputs(&self) -> &[f64] {
        &self.activations[self.activations.len() - 1]
    }

    /// A cheap fingerprint of the network: the sum of every weight
    /// and every non-input bias. Equal networks hash equally, but
    /// distinct networks may collide.
    pub fn hash(&self) -> f64 {
        let mut result = 0.0;
        for layer in 1..self.layer_sizes.len() {
            let width = self.layer_sizes[layer - 1];
            for (neuron, bias) in self.biases[layer].iter().enumerate() {
                for weight in &self.weights[layer - 1][neuron * width..(neuron + 1) * width] {
                    result += weight;
                }
                result += bias;
            }
        }
        result
    }

    /// Overwrites this network's weights and biases with those
    /// of `other`. Fitness is left untouched.
    ///
    /// # Errors
    /// Returns an error, without modifying anything, if the two
    /// networks have different shapes.
    pub fn copy_parameters_from(&mut self, other: &FeedforwardNetwork) -> Result<(), ShapeError> {
        if self.layer_sizes != other.layer_sizes {
            return Err(ShapeError::Mismatch {
                expected: self.layer_sizes.to_vec(),
                found: other.layer_sizes.to_vec(),
            });
        }
        for (to, from) in self.biases.iter_mut().zip(other.biases.iter()) {
            to.copy_from_slice(from);
        }
        for (to, from) in self.weights.iter_mut().zip(other.weights.iter()) {
            to.copy_from_slice(from);
        }
        Ok(())
    }

    /// Returns whether both networks have the same shape, biases
    /// and weights (bit-for-bit). Fitness and activations are ignored.
    pub fn same_parameters(&self, other: &FeedforwardNetwork) -> bool {
        self.layer_sizes == other.layer_sizes
            && self.biases == other.biases
            && self.weights == other.weights
    }

    /// Number of parameters that take part in inference: every
    /// weight plus the biases of all layers but the input one.
    pub fn parameter_count(&self) -> usize {
        self.biases[1..].iter().map(|l| l.len()).sum::<usize>()
            + self.weights.iter().map(|l| l.len()).sum::<usize>()
    }

    /// Returns the size of every layer, input first.
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    /// Returns the activations of `layer` as of the last inference.
    ///
    /// # Panics
    /// Panics if `layer` is out of range.
    pub fn activations(&self, layer: usize) -> &[f64] {
        &self.activations[layer]
    }

    /// Returns the biases of `layer`.
    ///
    /// # Panics
    /// Panics if `layer` is out of range.
    pub fn biases(&self, layer: usize) -> &[f64] {
        &self.biases[layer]
    }

    /// Returns the weight of the connection from neuron `source`
    /// of layer `layer - 1` to neuron `neuron` of layer `layer`.
    ///
    /// # Panics
    /// Panics if `layer` is 0 or any index is out of range.
    pub fn weight(&self, layer: usize, neuron: usize, source: usize) -> f64 {
        self.weights[layer - 1][self.weight_index(layer, neuron, source)]
    }

    /// Sets a single weight. Indices follow [`weight`](Self::weight).
    ///
    /// # Panics
    /// Panics if `layer` is 0 or any index is out of range.
    pub fn set_weight(&mut self, layer: usize, neuron: usize, source: usize, value: f64) {
        let index = self.weight_index(layer, neuron, source);
        self.weights[layer - 1][index] = value;
    }

    /// Sets the bias of `neuron` in `layer`.
    ///
    /// # Panics
    /// Panics if any index is out of range.
    pub fn set_bias(&mut self, layer: usize, neuron: usize, value: f64) {
        self.biases[layer][neuron] = value;
    }

    fn weight_index(&self, layer: usize, neuron: usize, source: usize) -> usize {
        let width = self.layer_sizes[layer - 1];
        assert!(
            neuron < self.layer_sizes[layer] && source < width,
            "weight index ({}, {}, {}) out of range",
            layer,
            neuron,
            source
        );
        neuron * width + source
    }

    /// Sets the network's fitness value.
    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Returns the network's fitness value.
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

fn validate_shape(layer_sizes: &[usize]) -> Result<(), ShapeError> {
    if layer_sizes.len() < MIN_LAYERS {
        return Err(ShapeError::TooFewLayers(layer_sizes.len()));
    }
    match layer_sizes.iter().position(|&size| size == 0) {
        Some(layer) => Err(ShapeError::EmptyLayer(layer)),
        None => Ok(()),
    }
}

impl fmt::Display for FeedforwardNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FeedforwardNetwork {:?} (fitness {}, hash {:.6})",
            self.layer_sizes,
            self.fitness,
            self.hash()
        )
    }
}
