use super::TrainerError;

use crate::agents::PhysicsConfig;
use crate::course::CourseConfig;
use crate::populations::logging::ReportingLevel;
use crate::populations::PopulationConfig;
use crate::sensor::SensorConfig;

use serde::{Deserialize, Serialize};

/// How agents are stepped within a tick. Both modes
/// produce identical results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Execution {
    Sequential,
    /// Agents are stepped on the `rayon` thread pool.
    #[default]
    Parallel,
}

/// Configuration of a whole training run.
///
/// # Examples
/// ```
/// use neuroflap::{Execution, TrainerConfig};
///
/// let config: TrainerConfig = ron::from_str("(seed: Some(7), execution: Sequential)").unwrap();
/// assert_eq!(config.seed, Some(7));
/// assert_eq!(config.execution, Execution::Sequential);
/// assert_eq!(config.sensor.sample_count, 7);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub sensor: SensorConfig,
    pub course: CourseConfig,
    pub physics: PhysicsConfig,
    pub population: PopulationConfig,
    /// Seed of every random draw of the run; drawn from
    /// system entropy when absent.
    pub seed: Option<u64>,
    pub execution: Execution,
    pub reporting_level: ReportingLevel,
}

impl TrainerConfig {
    /// Checks the configuration for values no run can start with.
    pub fn validate(&self) -> Result<(), TrainerError> {
        self.course.validate().map_err(TrainerError::InvalidConfig)?;
        self.physics.validate().map_err(TrainerError::InvalidConfig)?;
        self.population.validate().map_err(TrainerError::InvalidConfig)?;
        if !(self.sensor.depth > 0.0) {
            return Err(TrainerError::InvalidConfig(format!(
                "sensor depth {} must be positive",
                self.sensor.depth
            )));
        }
        Ok(())
    }
}
