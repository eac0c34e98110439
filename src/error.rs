use iagm_stats::ars::ArsError;
use iagm_stats::dist::DistError;
use thiserror::Error;

/// Errors from malformed model inputs
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("`{name}` has length {got}, but {expected} was expected")]
    LengthMismatch {
        name: &'static str,
        got: usize,
        expected: usize,
    },
    #[error("`{name}` has shape {got:?}, but {expected:?} was expected")]
    ShapeMismatch {
        name: &'static str,
        got: (usize, usize),
        expected: (usize, usize),
    },
    #[error(
        "Responsibility tensor has dims {got:?}, but {expected:?} was expected"
    )]
    ResponsibilityDimsMismatch {
        got: (usize, usize, usize),
        expected: (usize, usize, usize),
    },
    #[error("Asked for component {j} but there are {n_components} components")]
    ComponentIndexOutOfBounds { j: usize, n_components: usize },
    #[error("Asked for feature {k} but there are {n_features} features")]
    FeatureIndexOutOfBounds { k: usize, n_features: usize },
    #[error("`{name}` must be positive, got {value}")]
    NonPositiveParameter { name: &'static str, value: f64 },
    #[error("rho[{j}, {k}] = {value} is outside of [0, 1]")]
    RelevanceOutOfRange { j: usize, k: usize, value: f64 },
    #[error("The Monte Carlo integral needs at least one draw")]
    ZeroDraws,
    #[error("Distribution error: {0}")]
    Dist(#[from] DistError),
}

/// Errors from the hyperparameter samplers
#[derive(Clone, Debug, Error, PartialEq)]
pub enum HyperError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Adaptive rejection sampling failed: {0}")]
    Ars(#[from] ArsError),
}
