use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Configuration data for population generation
/// and selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Size of the population.
    pub size: NonZeroUsize,
    /// Sizes of the hidden layers between the input
    /// layer and the single output neuron.
    pub hidden_layers: Vec<usize>,
    /// Chance, in percent, that each parameter of
    /// a replaced network is perturbed.
    pub mutation_chance: u8,
    /// Largest perturbation applied to a parameter.
    pub mutation_magnitude: f64,
}

impl Default for PopulationConfig {
    /// Returns the reference tuning.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::PopulationConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = PopulationConfig {
    ///     size: NonZeroUsize::new(50).unwrap(),
    ///     // Default the rest...
    ///     ..PopulationConfig::default()
    /// };
    /// assert_eq!(config.hidden_layers, vec![9]);
    /// ```
    fn default() -> PopulationConfig {
        PopulationConfig {
            // SAFETY: 24 is a valid NonZeroUsize.
            size: unsafe { NonZeroUsize::new_unchecked(24) },
            hidden_layers: vec![9],
            mutation_chance: 25,
            mutation_magnitude: 0.5,
        }
    }
}

impl PopulationConfig {
    /// Returns the layer sizes of the population's networks
    /// for `input_count` inputs.
    pub fn layer_sizes(&self, input_count: usize) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(input_count);
        sizes.extend_from_slice(&self.hidden_layers);
        sizes.push(1);
        sizes
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.mutation_chance > 100 {
            return Err(format!("mutation chance {}% exceeds 100%", self.mutation_chance));
        }
        if !(self.mutation_magnitude.is_finite() && self.mutation_magnitude >= 0.0) {
            return Err(format!(
                "mutation magnitude {} must be finite and not negative",
                self.mutation_magnitude
            ));
        }
        Ok(())
    }
}
