//! # neuroflap-NN
//! Fixed-topology feedforward neural networks used as the "brains" of the
//! agents evolved by the [`neuroflap`](../neuroflap/index.html) trainer.
//!
//! A [`FeedforwardNetwork`] is a stack of fully-connected layers with
//! `tanh` activations. Its shape is chosen once at construction and never
//! changes; evolution only touches the numbers inside it, through
//! [`mutate`] and [`copy_parameters_from`]. Networks can be written to and
//! read from a plain-text, one-value-per-line format.
//!
//! [`FeedforwardNetwork`]: crate::networks::FeedforwardNetwork
//! [`mutate`]: crate::networks::FeedforwardNetwork::mutate
//! [`copy_parameters_from`]: crate::networks::FeedforwardNetwork::copy_parameters_from
//!
//! # Example usage
//! ```
//! use neuroflap_nn::networks::FeedforwardNetwork;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! // 9 inputs, one hidden layer of 9 neurons, a single output.
//! let mut parent = FeedforwardNetwork::new(&[9, 9, 1], &mut rng).unwrap();
//! let mut child = FeedforwardNetwork::zeroed(&[9, 9, 1]).unwrap();
//!
//! child.copy_parameters_from(&parent).unwrap();
//! assert!(child.same_parameters(&parent));
//!
//! // Mutation always changes something.
//! child.mutate(25, 0.5, &mut rng);
//! assert!(!child.same_parameters(&parent));
//!
//! let output = parent.feed_forward(&[0.0; 9])[0];
//! assert!((-1.0..=1.0).contains(&output));
//! ```

pub mod networks;
