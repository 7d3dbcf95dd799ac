//! A Population is a fixed, id-keyed collection of
//! networks, one per agent slot, evolved by truncation
//! selection at every generation boundary.
mod config;
mod errors;
pub mod logging;

pub use config::PopulationConfig;
pub use errors::PopulationError;

use neuroflap_nn::networks::{FeedforwardNetwork, PersistenceError, ShapeError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Stable identifier linking a network to its agent slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetworkId(pub usize);

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The outcome of a selection pass.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionReport {
    /// Ids in ascending fitness order, as ranked before selection.
    pub ranking: Vec<NetworkId>,
    /// Every `(replaced, parent)` pair: the first network was
    /// overwritten with a mutated copy of the second.
    pub replaced: Vec<(NetworkId, NetworkId)>,
    /// Total number of parameters changed by mutation.
    pub mutations: usize,
}

/// The outcome of loading a whole population.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<NetworkId>,
    /// Networks with no file, left as they were.
    pub missing: Vec<NetworkId>,
    /// Networks whose file could not be used, left as they were.
    pub failed: Vec<(NetworkId, PersistenceError)>,
}

impl LoadReport {
    /// Whether every network was loaded.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }
}

/// A population of networks.
///
/// Networks are stored by id; ids `0..size` never change and
/// selection only ever rewrites network parameters in place.
#[derive(Clone, Debug)]
pub struct Population {
    config: PopulationConfig,
    networks: Vec<FeedforwardNetwork>,
}

impl Population {
    /// Creates a population of randomly initialized networks
    /// taking `input_count` inputs.
    ///
    /// # Errors
    /// Returns an error if the configured layers do not form a
    /// valid network.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::{Population, PopulationConfig};
    ///
    /// let population = Population::new(PopulationConfig::default(), 9, &mut rand::thread_rng()).unwrap();
    /// assert_eq!(population.len(), 24);
    /// ```
    pub fn new<R: Rng + ?Sized>(
        config: PopulationConfig,
        input_count: usize,
        rng: &mut R,
    ) -> Result<Population, ShapeError> {
        let layer_sizes = config.layer_sizes(input_count);
        let networks = (0..config.size.get())
            .map(|_| FeedforwardNetwork::new(&layer_sizes, rng))
            .collect::<Result<_, _>>()?;
        Ok(Population { config, networks })
    }

    /// Creates a population from existing networks; the network at
    /// index `i` gets id `i`.
    ///
    /// # Errors
    /// Returns an error if the number of networks differs from the
    /// configured size, or if the networks do not all share the
    /// same shape.
    pub fn from_networks(
        config: PopulationConfig,
        networks: Vec<FeedforwardNetwork>,
    ) -> Result<Population, PopulationError> {
        if networks.len() != config.size.get() {
            return Err(PopulationError::SizeMismatch {
                expected: config.size.get(),
                found: networks.len(),
            });
        }
        let expected = networks[0].layer_sizes();
        if let Some(odd) = networks.iter().find(|n| n.layer_sizes() != expected) {
            return Err(ShapeError::Mismatch {
                expected: expected.to_vec(),
                found: odd.layer_sizes().to_vec(),
            }
            .into());
        }
        Ok(Population { config, networks })
    }

    /// Replaces every network with a freshly randomized one of
    /// the same shape.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), ShapeError> {
        for network in &mut self.networks {
            *network = FeedforwardNetwork::new(network.layer_sizes(), rng)?;
        }
        Ok(())
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Layer sizes shared by every network.
    pub fn layer_sizes(&self) -> &[usize] {
        self.networks[0].layer_sizes()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn get(&self, id: NetworkId) -> Option<&FeedforwardNetwork> {
        self.networks.get(id.0)
    }

    pub fn get_mut(&mut self, id: NetworkId) -> Option<&mut FeedforwardNetwork> {
        self.networks.get_mut(id.0)
    }

    /// Iterates over all ids, in order.
    pub fn ids(&self) -> impl Iterator<Item = NetworkId> {
        (0..self.networks.len()).map(NetworkId)
    }

    /// Iterates over all networks, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NetworkId, &FeedforwardNetwork)> {
        self.networks.iter().enumerate().map(|(i, n)| (NetworkId(i), n))
    }

    /// All networks, indexed by id.
    pub(crate) fn networks_mut(&mut self) -> &mut [FeedforwardNetwork] {
        &mut self.networks
    }

    /// Returns all ids in ascending fitness order. Networks with
    /// equal fitness keep their id order.
    pub fn ranking(&self) -> Vec<NetworkId> {
        let mut ranking: Vec<NetworkId> = self.ids().collect();
        ranking.sort_by(|a, b| {
            self.networks[a.0]
                .fitness()
                .total_cmp(&self.networks[b.0].fitness())
        });
        ranking
    }

    /// Returns the best ranked network.
    pub fn champion(&self) -> (NetworkId, &FeedforwardNetwork) {
        let id = self.ranking().last().copied().unwrap_or(NetworkId(0));
        (id, &self.networks[id.0])
    }

    /// Replaces the worse half of the population with mutated
    /// copies of the better half.
    ///
    /// The network at rank `i` is overwritten by the one at rank
    /// `i + len / 2`, and then mutated. Networks in the better
    /// half are left untouched. Fitness values are not copied.
    ///
    /// # Errors
    /// Returns an error if a network was given a different shape
    /// through [`get_mut`](Self::get_mut). Networks ranked before
    /// it will already have been replaced.
    pub fn select<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<SelectionReport, ShapeError> {
        let ranking = self.ranking();
        let half = ranking.len() / 2;
        let mut replaced = Vec::with_capacity(half);
        let mut mutations = 0;
        let (chance, magnitude) = (self.config.mutation_chance, self.config.mutation_magnitude);

        for (&target, &parent) in ranking[..half].iter().zip(&ranking[half..]) {
            let (network, source) = self.pair_mut(target, parent);
            network.copy_parameters_from(source)?;
            mutations += network.mutate(chance, magnitude, rng);
            replaced.push((target, parent));
        }

        debug!(replaced = replaced.len(), mutations, "selection complete");
        Ok(SelectionReport {
            ranking,
            replaced,
            mutations,
        })
    }

    fn pair_mut(
        &mut self,
        target: NetworkId,
        source: NetworkId,
    ) -> (&mut FeedforwardNetwork, &FeedforwardNetwork) {
        debug_assert_ne!(target, source);
        if target.0 < source.0 {
            let (low, high) = self.networks.split_at_mut(source.0);
            (&mut low[target.0], &high[0])
        } else {
            let (low, high) = self.networks.split_at_mut(target.0);
            (&mut high[0], &low[source.0])
        }
    }

    /// Path of the weight file of network `id` under `directory`.
    pub fn network_path(directory: impl AsRef<Path>, id: NetworkId) -> PathBuf {
        directory.as_ref().join(format!("network-{}.ai", id.0))
    }

    /// Saves every network to its own file under `directory`,
    /// creating the directory if needed.
    ///
    /// # Errors
    /// Stops at and returns the first I/O error.
    pub fn save_all(&self, directory: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory)?;
        for (id, network) in self.iter() {
            network.save(Population::network_path(directory, id))?;
        }
        info!(networks = self.len(), directory = %directory.display(), "saved population");
        Ok(())
    }

    /// Loads every network from its file under `directory`.
    ///
    /// Loading is best effort: missing files and unusable files
    /// leave their network untouched and are listed in the report.
    pub fn load_all(&mut self, directory: impl AsRef<Path>) -> LoadReport {
        let directory = directory.as_ref();
        let mut report = LoadReport::default();
        for (i, network) in self.networks.iter_mut().enumerate() {
            let id = NetworkId(i);
            let path = Population::network_path(directory, id);
            match network.load(&path) {
                Ok(true) => report.loaded.push(id),
                Ok(false) => report.missing.push(id),
                Err(e) => {
                    warn!(network = %id, path = %path.display(), error = %e, "could not load network");
                    report.failed.push((id, e));
                }
            }
        }
        info!(
            loaded = report.loaded.len(),
            missing = report.missing.len(),
            failed = report.failed.len(),
            "loaded population"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::num::NonZeroUsize;

    fn config(size: usize) -> PopulationConfig {
        PopulationConfig {
            size: NonZeroUsize::new(size).unwrap(),
            hidden_layers: vec![3],
            ..PopulationConfig::default()
        }
    }

    fn population(size: usize, seed: u64) -> Population {
        Population::new(config(size), 4, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap()
    }

    fn set_fitnesses(population: &mut Population, fitnesses: &[f32]) {
        for (i, &f) in fitnesses.iter().enumerate() {
            population.get_mut(NetworkId(i)).unwrap().set_fitness(f);
        }
    }

    #[test]
    fn new_population_shape() {
        let population = population(6, 0);
        assert_eq!(population.len(), 6);
        assert_eq!(population.layer_sizes(), &[4, 3, 1]);
        assert_eq!(population.ids().collect::<Vec<_>>(), (0..6).map(NetworkId).collect::<Vec<_>>());
        assert!(population.get(NetworkId(6)).is_none());
    }

    #[test]
    fn from_networks_validates() {
        let net = |sizes: &[usize]| FeedforwardNetwork::zeroed(sizes).unwrap();
        assert_eq!(
            Population::from_networks(config(2), vec![net(&[2, 2, 1])]).unwrap_err(),
            PopulationError::SizeMismatch { expected: 2, found: 1 }
        );
        assert!(matches!(
            Population::from_networks(config(2), vec![net(&[2, 2, 1]), net(&[2, 3, 1])]),
            Err(PopulationError::Shape(_))
        ));
        assert!(Population::from_networks(config(2), vec![net(&[2, 2, 1]), net(&[2, 2, 1])]).is_ok());
    }

    #[test]
    fn ranking_is_stable() {
        let mut population = population(5, 0);
        set_fitnesses(&mut population, &[3.0, 1.0, 3.0, 0.0, 1.0]);
        assert_eq!(
            population.ranking(),
            vec![NetworkId(3), NetworkId(1), NetworkId(4), NetworkId(0), NetworkId(2)]
        );
        assert_eq!(population.champion().0, NetworkId(2));
    }

    #[test]
    fn selection_preserves_ids_and_elite() {
        let mut population = population(6, 1);
        set_fitnesses(&mut population, &[5.0, 0.0, 2.0, 9.0, 1.0, 4.0]);
        let before = population.clone();
        let report = population.select(&mut ChaCha8Rng::seed_from_u64(2)).unwrap();

        assert_eq!(population.len(), 6);
        assert_eq!(
            report.replaced,
            vec![
                (NetworkId(1), NetworkId(5)),
                (NetworkId(4), NetworkId(0)),
                (NetworkId(2), NetworkId(3)),
            ]
        );
        assert!(report.mutations >= 3);
        for &(target, parent) in &report.replaced {
            let elite = population.get(parent).unwrap();
            assert!(elite.same_parameters(before.get(parent).unwrap()));
            assert!(!population.get(target).unwrap().same_parameters(elite));
        }
    }

    #[test]
    fn selection_of_degenerate_population() {
        let mut population = population(4, 3);
        set_fitnesses(&mut population, &[0.0; 4]);
        let report = population.select(&mut ChaCha8Rng::seed_from_u64(4)).unwrap();
        assert_eq!(
            report.replaced,
            vec![(NetworkId(0), NetworkId(2)), (NetworkId(1), NetworkId(3))]
        );
    }

    #[test]
    fn single_network_is_never_replaced() {
        let mut population = population(1, 3);
        let before = population.clone();
        let report = population.select(&mut ChaCha8Rng::seed_from_u64(4)).unwrap();
        assert!(report.replaced.is_empty());
        assert!(population.get(NetworkId(0)).unwrap().same_parameters(before.get(NetworkId(0)).unwrap()));
    }

    #[test]
    fn save_and_load_all() {
        let dir = tempfile::tempdir().unwrap();
        let mut original = population(3, 5);
        set_fitnesses(&mut original, &[1.0, 2.0, 3.0]);
        original.save_all(dir.path().join("weights")).unwrap();
        assert!(Population::network_path(dir.path().join("weights"), NetworkId(2)).exists());

        let mut copy = population(3, 6);
        let report = copy.load_all(dir.path().join("weights"));
        assert!(report.is_complete());
        assert_eq!(report.loaded.len(), 3);
        for (id, network) in copy.iter() {
            let source = original.get(id).unwrap();
            assert!(network.same_parameters(source));
            assert_eq!(network.fitness(), source.fitness());
        }
    }

    #[test]
    fn partial_load_reports_problems() {
        let dir = tempfile::tempdir().unwrap();
        population(3, 5).save_all(dir.path()).unwrap();
        fs::remove_file(Population::network_path(dir.path(), NetworkId(1))).unwrap();
        fs::write(Population::network_path(dir.path(), NetworkId(2)), "1\n2\n").unwrap();

        let mut target = population(3, 6);
        let before = target.clone();
        let report = target.load_all(dir.path());
        assert_eq!(report.loaded, vec![NetworkId(0)]);
        assert_eq!(report.missing, vec![NetworkId(1)]);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0], (NetworkId(2), PersistenceError::ValueCount { .. })));
        assert!(target.get(NetworkId(2)).unwrap().same_parameters(before.get(NetworkId(2)).unwrap()));
    }
}
