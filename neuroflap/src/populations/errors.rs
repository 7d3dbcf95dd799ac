use neuroflap_nn::networks::ShapeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PopulationError {
    #[error("expected {expected} networks, found {found}")]
    SizeMismatch { expected: usize, found: usize },
    #[error(transparent)]
    Shape(#[from] ShapeError),
}
