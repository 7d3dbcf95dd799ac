use crate::populations::PopulationError;

use neuroflap_nn::networks::ShapeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainerError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("networks take {found} inputs but the sensor provides {expected}")]
    InputMismatch { expected: usize, found: usize },
    #[error("networks have {found} outputs instead of one")]
    OutputMismatch { found: usize },
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Population(#[from] PopulationError),
}
