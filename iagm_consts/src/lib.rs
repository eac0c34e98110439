pub use rv;

use rv::dist::Gamma;

/// Number of Metropolis-Hastings proposals made per parameter update
pub const MH_N_ITERS: usize = 750;

/// Standard deviation of the Gaussian random-walk proposal
pub const MH_PROPOSAL_SCALE: f64 = 0.75;

/// Number of prior draws used by the Monte Carlo marginal-likelihood estimate
pub const INTEGRAL_N_DRAWS: usize = 20;

/// Initial ARS abscissae for the Dirichlet process concentration parameter
pub const ALPHA_ARS_ABSCISSAE: [f64; 2] = [0.1, 5.0];

/// Lower bound of the support of the precision-prior shape parameter, beta
pub const BETA_LOWER_BOUND: f64 = 2.0;

/// The single ARS abscissa for beta sits this far above the lower bound
pub const BETA_ARS_OFFSET: f64 = 15.0;

/// Shape of the Gamma hyperprior on the relevance Beta parameters
pub const DELTA_PRIOR_SHAPE: f64 = 2.0;

/// Scale of the Gamma hyperprior on the relevance Beta parameters
pub const DELTA_PRIOR_SCALE: f64 = 0.5;

/// Gamma(2, scale=0.5) prior on `delta_a` and `delta_b`.
///
/// `rv` parameterizes the Gamma by rate, so the rate here is 1/scale.
pub fn delta_prior() -> Gamma {
    Gamma::new_unchecked(DELTA_PRIOR_SHAPE, DELTA_PRIOR_SCALE.recip())
}
