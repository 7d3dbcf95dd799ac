//! Neuroevolution of agents that fly through a scrolling
//! course of gaps between pipes.
//!
//! Every agent is steered by a fixed-topology feedforward
//! network from the [`neuroflap-nn`](neuroflap_nn) crate. Each
//! tick, an agent casts a fan of proximity rays at the obstacles
//! ahead, feeds the readings plus its own speed and acceleration
//! to its network, and adds the single output to its vertical
//! acceleration. A generation ends when every agent has collided
//! or the course is over; the worse half of the population is
//! then replaced with mutated copies of the better half.
//!
//! The simulation is a plain step function with no timers or
//! I/O of its own, so it can be driven by a game loop, a test,
//! or the `headless` binary alike.
//!
//! # Example usage
//! ```
//! use neuroflap::{GeneticTrainer, TrainerConfig};
//! use neuroflap::course::CourseConfig;
//!
//! let mut trainer = GeneticTrainer::new(TrainerConfig {
//!     seed: Some(1),
//!     course: CourseConfig { length: 2_000, ..CourseConfig::default() },
//!     ..TrainerConfig::default()
//! })
//! .unwrap();
//!
//! for _ in 0..3 {
//!     trainer.run_generation().unwrap();
//! }
//!
//! for log in trainer.logger().iter() {
//!     println!("{}", log);
//! }
//! let (id, champion) = trainer.population().champion();
//! println!("best network {}: {}", id, champion);
//! ```

pub mod agents;
pub mod course;
pub mod geometry;
mod populations;
pub mod sensor;
pub mod telemetry;
mod trainer;

pub use populations::logging;
pub use populations::{
    LoadReport, NetworkId, Population, PopulationConfig, PopulationError, SelectionReport,
};
pub use trainer::{
    Execution, GenerationOutcome, GeneticTrainer, TickOutcome, TrainerConfig, TrainerError,
    TrainerState,
};

pub use neuroflap_nn::networks::{FeedforwardNetwork, PersistenceError, ShapeError};
