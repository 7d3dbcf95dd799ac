//! The generational training loop: ticks every agent through
//! the course, and evolves the population once a generation
//! is over.
mod config;
mod errors;

pub use config::{Execution, TrainerConfig};
pub use errors::TrainerError;

use crate::agents::Agent;
use crate::course::ObstacleField;
use crate::populations::logging::EvolutionLogger;
use crate::populations::{LoadReport, Population, SelectionReport};
use crate::sensor::ProximitySensor;
use crate::telemetry::{TelemetryRecord, TelemetrySink};

use neuroflap_nn::networks::{FeedforwardNetwork, PersistenceError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use std::fmt;
use std::path::Path;

/// Why a generation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationOutcome {
    /// Every agent collided.
    AllDead,
    /// The end of the course was reached.
    CourseCompleted,
    /// The generation was ended early by the driver.
    Interrupted,
}

/// Phase of the current generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainerState {
    Active,
    /// The generation is over; ticks do nothing until
    /// [`GeneticTrainer::next_generation`] is called.
    GenerationComplete(GenerationOutcome),
}

/// Result of a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running { alive: usize },
    GenerationComplete(GenerationOutcome),
}

/// Trains a population of networks to fly through randomly
/// generated courses.
///
/// The trainer performs no I/O and owns no timers; a driver
/// calls [`tick`](Self::tick) at whatever pace it likes and
/// reads state through the accessors between calls.
///
/// # Examples
/// ```
/// use neuroflap::{GeneticTrainer, GenerationOutcome, TrainerConfig};
/// use neuroflap::course::CourseConfig;
///
/// let mut trainer = GeneticTrainer::new(TrainerConfig {
///     seed: Some(42),
///     course: CourseConfig { length: 500, ..CourseConfig::default() },
///     ..TrainerConfig::default()
/// })
/// .unwrap();
///
/// let outcome = trainer.run_generation().unwrap();
/// assert!(matches!(outcome, GenerationOutcome::AllDead | GenerationOutcome::CourseCompleted));
/// assert_eq!(trainer.generation(), 2);
/// ```
pub struct GeneticTrainer {
    config: TrainerConfig,
    rng: ChaCha8Rng,
    sensor: ProximitySensor,
    population: Population,
    course: ObstacleField,
    agents: Vec<Agent>,
    generation: usize,
    completions: usize,
    state: TrainerState,
    logger: EvolutionLogger,
    telemetry: Option<Box<dyn TelemetrySink + Send>>,
}

impl GeneticTrainer {
    /// Creates a trainer with a randomly initialized population.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: TrainerConfig) -> Result<GeneticTrainer, TrainerError> {
        config.validate()?;
        let mut rng = seeded_rng(config.seed);
        let input_count = config.sensor.sample_count + 2;
        let population = Population::new(config.population.clone(), input_count, &mut rng)?;
        GeneticTrainer::assemble(config, rng, population)
    }

    /// Creates a trainer around an existing population, whose
    /// configuration replaces the trainer's.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or if the
    /// networks do not fit the sensor.
    pub fn with_population(
        mut config: TrainerConfig,
        population: Population,
    ) -> Result<GeneticTrainer, TrainerError> {
        config.population = population.config().clone();
        config.validate()?;
        let rng = seeded_rng(config.seed);
        GeneticTrainer::assemble(config, rng, population)
    }

    fn assemble(
        config: TrainerConfig,
        mut rng: ChaCha8Rng,
        population: Population,
    ) -> Result<GeneticTrainer, TrainerError> {
        let sensor = ProximitySensor::new(config.sensor.clone());
        let sizes = population.layer_sizes();
        let expected = sensor.sample_count() + 2;
        if sizes[0] != expected {
            return Err(TrainerError::InputMismatch {
                expected,
                found: sizes[0],
            });
        }
        if sizes[sizes.len() - 1] != 1 {
            return Err(TrainerError::OutputMismatch {
                found: sizes[sizes.len() - 1],
            });
        }

        let course = ObstacleField::generate(config.course.clone(), &mut rng);
        let agents = spawn_agents(&population, &config);
        info!(
            networks = population.len(),
            layers = ?population.layer_sizes(),
            seed = ?config.seed,
            "trainer ready"
        );
        Ok(GeneticTrainer {
            logger: EvolutionLogger::new(config.reporting_level),
            config,
            rng,
            sensor,
            population,
            course,
            agents,
            generation: 1,
            completions: 0,
            state: TrainerState::Active,
            telemetry: None,
        })
    }

    /// Advances the simulation by one tick.
    ///
    /// The course scrolls forward first. If that exhausts it, the
    /// generation ends without moving any agent. Otherwise every
    /// agent takes a step, and the generation ends once none is
    /// left alive. Ticks after the end of a generation do nothing.
    pub fn tick(&mut self) -> TickOutcome {
        if let TrainerState::GenerationComplete(outcome) = self.state {
            return TickOutcome::GenerationComplete(outcome);
        }
        if self.course.advance() {
            return self.complete(GenerationOutcome::CourseCompleted);
        }

        let records = self.step_agents();
        if let Some(sink) = self.telemetry.as_mut() {
            for record in records.iter().flatten() {
                sink.record(record);
            }
        }

        match self.alive() {
            0 => self.complete(GenerationOutcome::AllDead),
            alive => TickOutcome::Running { alive },
        }
    }

    fn step_agents(&mut self) -> Vec<Option<TelemetryRecord>> {
        let course = &self.course;
        let sensor = &self.sensor;
        let physics = &self.config.physics;
        let record = self.telemetry.is_some();
        let networks = self.population.networks_mut();
        let step = |(agent, network): (&mut Agent, &mut FeedforwardNetwork)| {
            agent.step(network, course, sensor, physics, record)
        };

        match self.config.execution {
            Execution::Parallel => self.agents.par_iter_mut().zip(networks.par_iter_mut()).map(step).collect(),
            Execution::Sequential => self.agents.iter_mut().zip(networks.iter_mut()).map(step).collect(),
        }
    }

    fn complete(&mut self, outcome: GenerationOutcome) -> TickOutcome {
        if outcome == GenerationOutcome::CourseCompleted {
            self.completions += 1;
        }
        self.state = TrainerState::GenerationComplete(outcome);
        debug!(generation = self.generation, ?outcome, scroll = self.course.scroll(), "generation over");
        TickOutcome::GenerationComplete(outcome)
    }

    /// Ends the current generation and starts the next one.
    ///
    /// Every agent's score becomes its network's fitness, the
    /// population is logged and goes through selection, and agents
    /// restart on a new course. Calling this before the generation
    /// is over ends it as [`GenerationOutcome::Interrupted`].
    ///
    /// # Errors
    /// Returns an error if selection fails because a network's
    /// shape was changed from outside.
    pub fn next_generation(&mut self) -> Result<SelectionReport, TrainerError> {
        let outcome = match self.state {
            TrainerState::GenerationComplete(outcome) => outcome,
            TrainerState::Active => GenerationOutcome::Interrupted,
        };
        for agent in &self.agents {
            if let Some(network) = self.population.get_mut(agent.id()) {
                network.set_fitness(agent.score() as f32);
            }
        }

        let survivors = self.alive();
        let log = self.logger.log(&self.population, self.generation, outcome, survivors);
        info!(
            generation = log.generation,
            outcome = ?log.outcome,
            survivors,
            best = log.fitness.maximum,
            mean = log.fitness.mean,
            median = log.fitness.median,
            champion = %log.champion,
            "generation complete"
        );

        let report = self.population.select(&mut self.rng)?;
        self.course = ObstacleField::generate(self.config.course.clone(), &mut self.rng);
        self.agents = spawn_agents(&self.population, &self.config);
        self.generation += 1;
        self.state = TrainerState::Active;
        Ok(report)
    }

    /// Ticks until the current generation is over, then starts the
    /// next one. Returns why the generation ended.
    pub fn run_generation(&mut self) -> Result<GenerationOutcome, TrainerError> {
        let outcome = loop {
            if let TickOutcome::GenerationComplete(outcome) = self.tick() {
                break outcome;
            }
        };
        self.next_generation()?;
        Ok(outcome)
    }

    /// Restarts training from scratch with freshly randomized
    /// networks. The random stream continues where it was, so a
    /// reset run differs from the first one.
    pub fn reset(&mut self) -> Result<(), TrainerError> {
        self.population.randomize(&mut self.rng)?;
        self.course = ObstacleField::generate(self.config.course.clone(), &mut self.rng);
        self.agents = spawn_agents(&self.population, &self.config);
        self.generation = 1;
        self.completions = 0;
        self.state = TrainerState::Active;
        self.logger.clear();
        info!("trainer reset");
        Ok(())
    }

    /// Replaces the course of the current generation. Agents are
    /// not moved; later generations get generated courses again.
    pub fn set_course(&mut self, course: ObstacleField) {
        self.course = course;
    }

    /// Installs or removes the telemetry sink. Telemetry only
    /// observes the simulation, and never changes its results.
    pub fn set_telemetry(&mut self, sink: Option<Box<dyn TelemetrySink + Send>>) {
        self.telemetry = sink;
    }

    /// Saves every network under `directory`.
    pub fn save_all(&self, directory: impl AsRef<Path>) -> Result<(), PersistenceError> {
        self.population.save_all(directory)
    }

    /// Loads every network found under `directory`, reporting
    /// the ones that could not be loaded.
    pub fn load_all(&mut self, directory: impl AsRef<Path>) -> LoadReport {
        self.population.load_all(directory)
    }

    fn alive(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn sensor(&self) -> &ProximitySensor {
        &self.sensor
    }

    /// Agents of the current generation, in id order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn alive_count(&self) -> usize {
        self.alive()
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn course(&self) -> &ObstacleField {
        &self.course
    }

    pub fn scroll(&self) -> u32 {
        self.course.scroll()
    }

    /// The current generation, starting at 1.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Number of generations that reached the end of the course.
    pub fn completions(&self) -> usize {
        self.completions
    }

    pub fn logger(&self) -> &EvolutionLogger {
        &self.logger
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }
}

impl fmt::Debug for GeneticTrainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneticTrainer")
            .field("generation", &self.generation)
            .field("completions", &self.completions)
            .field("state", &self.state)
            .field("scroll", &self.course.scroll())
            .field("alive", &self.alive())
            .field("telemetry", &self.telemetry.is_some())
            .finish()
    }
}

fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn spawn_agents(population: &Population, config: &TrainerConfig) -> Vec<Agent> {
    population.ids().map(|id| Agent::new(id, &config.physics)).collect()
}
