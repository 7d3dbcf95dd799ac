use super::FeedforwardNetwork;

use rand::Rng;
use tracing::warn;

/// Passes that drew perturbations without changing a parameter,
/// after which `mutate` gives up.
const STALLED_PASS_LIMIT: usize = 16;

impl FeedforwardNetwork {
    /// Nudges the network's weights and biases at random.
    ///
    /// Every weight and every non-input bias independently has a
    /// `percent_chance`% chance of receiving a perturbation drawn
    /// uniformly from `[-magnitude, magnitude]`. Whole passes are
    /// repeated until at least one parameter has actually changed,
    /// so a mutated network never stays identical to its original.
    ///
    /// Returns the number of parameters changed by the final pass.
    ///
    /// A `percent_chance` of 0, or a `magnitude` that is not a
    /// positive finite number, can never change anything: the call
    /// is then a no-op returning 0. So is a `magnitude` too small
    /// to move any parameter, detected once several passes
    /// have drawn perturbations without changing anything. Chances
    /// above 100 are treated as 100.
    ///
    /// # Examples
    /// ```
    /// use neuroflap_nn::networks::FeedforwardNetwork;
    ///
    /// let mut rng = rand::thread_rng();
    /// let original = FeedforwardNetwork::new(&[4, 4, 1], &mut rng).unwrap();
    ///
    /// let mut mutant = original.clone();
    /// assert!(mutant.mutate(25, 0.5, &mut rng) > 0);
    /// assert!(!mutant.same_parameters(&original));
    ///
    /// let mut unchanged = original.clone();
    /// assert_eq!(unchanged.mutate(100, 0.0, &mut rng), 0);
    /// assert!(unchanged.same_parameters(&original));
    /// ```
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        percent_chance: u8,
        magnitude: f64,
        rng: &mut R,
    ) -> usize {
        if percent_chance == 0 || !magnitude.is_finite() || magnitude <= 0.0 {
            return 0;
        }
        let chance = f64::from(percent_chance.min(100)) / 100.0;
        let mut stalled = 0;
        loop {
            let (drawn, changed) = self.mutation_pass(chance, magnitude, rng);
            if changed > 0 {
                return changed;
            }
            if drawn > 0 {
                stalled += 1;
                if stalled == STALLED_PASS_LIMIT {
                    warn!(magnitude, "mutation magnitude too small to change any parameter");
                    return 0;
                }
            }
        }
    }

    /// Single pass over every mutable parameter. Returns how many
    /// perturbations were drawn and how many of them changed a value.
    fn mutation_pass<R: Rng + ?Sized>(
        &mut self,
        chance: f64,
        magnitude: f64,
        rng: &mut R,
    ) -> (usize, usize) {
        let parameters = self
            .biases
            .iter_mut()
            .skip(1)
            .chain(self.weights.iter_mut())
            .flat_map(|layer| layer.iter_mut());

        let mut drawn = 0;
        let mut changed = 0;
        for parameter in parameters {
            if rng.gen_bool(chance) {
                drawn += 1;
                let before = *parameter;
                *parameter += rng.gen_range(-magnitude..=magnitude);
                if *parameter != before {
                    changed += 1;
                }
            }
        }
        (drawn, changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn changed_parameters(a: &FeedforwardNetwork, b: &FeedforwardNetwork) -> usize {
        let biases = a.biases.iter().zip(b.biases.iter());
        let weights = a.weights.iter().zip(b.weights.iter());
        biases
            .chain(weights)
            .map(|(x, y)| x.iter().zip(y.iter()).filter(|(x, y)| x != y).count())
            .sum()
    }

    #[test]
    fn always_changes_something() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for chance in [1, 5, 25, 50, 100] {
            let original = FeedforwardNetwork::new(&[2, 1, 1], &mut rng).unwrap();
            for _ in 0..50 {
                let mut mutant = original.clone();
                let reported = mutant.mutate(chance, 0.5, &mut rng);
                let actual = changed_parameters(&original, &mutant);
                assert!(actual > 0);
                assert_eq!(reported, actual);
            }
        }
    }

    #[test]
    fn certain_chance_touches_everything() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let original = FeedforwardNetwork::new(&[3, 3, 2], &mut rng).unwrap();
        let mut mutant = original.clone();
        let changed = mutant.mutate(100, 0.5, &mut rng);
        assert_eq!(changed, original.parameter_count());
    }

    #[test]
    fn perturbation_bounded_by_magnitude() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let original = FeedforwardNetwork::zeroed(&[5, 5, 1]).unwrap();
        let mut mutant = original.clone();
        mutant.mutate(100, 0.25, &mut rng);
        for layer in mutant.weights.iter().chain(mutant.biases.iter()) {
            assert!(layer.iter().all(|p| (-0.25..=0.25).contains(p)));
        }
    }

    #[test]
    fn input_biases_never_mutate() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let mut network = FeedforwardNetwork::zeroed(&[6, 2, 1]).unwrap();
        for _ in 0..20 {
            network.mutate(100, 1.0, &mut rng);
        }
        assert!(network.biases[0].iter().all(|b| *b == 0.0));
    }

    #[test]
    fn no_op_escapes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let original = FeedforwardNetwork::new(&[3, 3, 1], &mut rng).unwrap();
        for (chance, magnitude) in [
            (0, 0.5),
            (100, 0.0),
            (100, -1.0),
            (100, f64::NAN),
            (100, f64::INFINITY),
        ] {
            let mut network = original.clone();
            assert_eq!(network.mutate(chance, magnitude, &mut rng), 0);
            assert!(network.same_parameters(&original));
        }
    }

    #[test]
    fn negligible_magnitude_gives_up() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let original = FeedforwardNetwork::new(&[2, 1, 1], &mut rng).unwrap();
        let mut network = original.clone();
        assert_eq!(network.mutate(25, 1e-30, &mut rng), 0);
        assert!(network.same_parameters(&original));
    }

    #[test]
    fn seeded_mutation_reproducible() {
        let base = FeedforwardNetwork::new(&[4, 4, 1], &mut ChaCha8Rng::seed_from_u64(4)).unwrap();
        let mut a = base.clone();
        let mut b = base.clone();
        a.mutate(25, 0.5, &mut ChaCha8Rng::seed_from_u64(99));
        b.mutate(25, 0.5, &mut ChaCha8Rng::seed_from_u64(99));
        assert!(a.same_parameters(&b));
    }
}
