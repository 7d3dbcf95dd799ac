use super::{NetworkId, Population};

use crate::trainer::GenerationOutcome;

use neuroflap_nn::networks::FeedforwardNetwork;
use serde::{Deserialize, Serialize};

use std::fmt;

/// Defines different possible reporting levels for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportingLevel {
    /// Clones the champion network of every generation.
    Champion,
    /// Clones no networks.
    #[default]
    NoNetworks,
}

/// A snapshot of a population at the end of a generation,
/// taken before selection.
#[derive(Clone, Debug)]
pub struct GenerationLog {
    pub generation: usize,
    pub outcome: GenerationOutcome,
    pub fitness: Stats,
    /// Agents still alive when the generation ended.
    pub survivors: usize,
    pub champion: NetworkId,
    pub champion_hash: f64,
    /// A copy of the champion, depending on the reporting level.
    pub champion_network: Option<FeedforwardNetwork>,
}

impl fmt::Display for GenerationLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GenerationLog {{\n\
            \tgeneration: {}\n\
            \toutcome: {:?}\n\
            \tsurvivors: {}\n\
            \tchampion: {} (hash {:.6})\n\
            \tfitness: {:?}\n\
            }}",
            self.generation, self.outcome, self.survivors, self.champion, self.champion_hash, self.fitness,
        )
    }
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub maximum: f32,
    pub minimum: f32,
    pub mean: f32,
    pub median: f32,
}

impl Stats {
    /// Returns statistics about numbers in a sequence,
    /// or all zeros for an empty sequence.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    ///
    /// let stats = Stats::from([4.0, 1.0, 3.0, 2.0].iter().copied());
    /// assert_eq!(stats.median, 2.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f32>) -> Stats {
        let mut data: Vec<f32> = data.collect();
        if data.is_empty() {
            return Stats::default();
        }
        data.sort_by(f32::total_cmp);
        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean: data.iter().sum::<f32>() / data.len() as f32,
            median,
        }
    }
}

/// A log of the evolution of a population over time.
#[derive(Clone, Debug, Default)]
pub struct EvolutionLogger {
    reporting_level: ReportingLevel,
    logs: Vec<GenerationLog>,
}

impl EvolutionLogger {
    /// Returns a logger with the appropiate reporting level.
    pub fn new(reporting_level: ReportingLevel) -> EvolutionLogger {
        EvolutionLogger {
            reporting_level,
            logs: vec![],
        }
    }

    pub fn reporting_level(&self) -> ReportingLevel {
        self.reporting_level
    }

    /// Stores a snapshot of a population whose fitness values
    /// have just been set, and returns it.
    pub fn log(
        &mut self,
        population: &Population,
        generation: usize,
        outcome: GenerationOutcome,
        survivors: usize,
    ) -> &GenerationLog {
        let (champion, network) = population.champion();
        self.logs.push(GenerationLog {
            generation,
            outcome,
            fitness: Stats::from(population.iter().map(|(_, n)| n.fitness())),
            survivors,
            champion,
            champion_hash: network.hash(),
            champion_network: match self.reporting_level {
                ReportingLevel::Champion => Some(network.clone()),
                ReportingLevel::NoNetworks => None,
            },
        });
        &self.logs[self.logs.len() - 1]
    }

    /// The most recent snapshot.
    pub fn last(&self) -> Option<&GenerationLog> {
        self.logs.last()
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Removes all snapshots.
    pub fn clear(&mut self) {
        self.logs.clear();
    }

    /// Iterate over all logged snapshots.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::logging::{EvolutionLogger, ReportingLevel};
    ///
    /// let logger = EvolutionLogger::new(ReportingLevel::Champion);
    /// // Log some stuff... then
    /// for log in logger.iter() {
    ///     println!("{}", log);
    /// }
    /// ```
    pub fn iter(&self) -> impl Iterator<Item = &GenerationLog> {
        self.logs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PopulationConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::num::NonZeroUsize;

    fn population() -> Population {
        let config = PopulationConfig {
            size: NonZeroUsize::new(4).unwrap(),
            ..PopulationConfig::default()
        };
        let mut population = Population::new(config, 3, &mut ChaCha8Rng::seed_from_u64(0)).unwrap();
        for (i, f) in [2.0, 8.0, 4.0, 6.0].into_iter().enumerate() {
            population.get_mut(NetworkId(i)).unwrap().set_fitness(f);
        }
        population
    }

    #[test]
    fn stats_of_empty_data() {
        assert_eq!(Stats::from(std::iter::empty()), Stats::default());
    }

    #[test]
    fn stats_of_single_value() {
        let stats = Stats::from(std::iter::once(3.0));
        assert_eq!(stats.minimum, 3.0);
        assert_eq!(stats.maximum, 3.0);
        assert_eq!(stats.median, 3.0);
    }

    #[test]
    fn log_snapshot() {
        let population = population();
        let mut logger = EvolutionLogger::new(ReportingLevel::NoNetworks);
        let log = logger.log(&population, 3, GenerationOutcome::AllDead, 0);
        assert_eq!(log.generation, 3);
        assert_eq!(log.champion, NetworkId(1));
        assert_eq!(log.champion_hash, population.get(NetworkId(1)).unwrap().hash());
        assert_eq!(
            log.fitness,
            Stats {
                maximum: 8.0,
                minimum: 2.0,
                mean: 5.0,
                median: 5.0
            }
        );
        assert!(log.champion_network.is_none());
        assert!(log.to_string().contains("champion: #1"));
        assert_eq!(logger.len(), 1);
    }

    #[test]
    fn champion_reporting() {
        let population = population();
        let mut logger = EvolutionLogger::new(ReportingLevel::Champion);
        logger.log(&population, 1, GenerationOutcome::CourseCompleted, 4);
        let champion = logger.last().unwrap().champion_network.as_ref().unwrap();
        assert!(champion.same_parameters(population.get(NetworkId(1)).unwrap()));

        logger.clear();
        assert!(logger.is_empty());
    }
}
