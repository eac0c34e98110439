use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::rv::dist::Gaussian;
use crate::rv::traits::Rv;

/// What a random-walk sampler does with a proposal that falls on or below
/// zero.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidatePolicy {
    /// The parameter lives on the whole real line
    Unconstrained,
    /// A non-positive candidate is replaced by its absolute value
    ReflectNonPositive,
    /// A non-positive candidate uses up the iteration without evaluation
    SkipNonPositive,
}

impl CandidatePolicy {
    /// Map a raw proposal onto the candidate that will be evaluated, or
    /// `None` if the iteration should be skipped.
    #[inline]
    pub fn apply(self, candidate: f64) -> Option<f64> {
        match self {
            Self::Unconstrained => Some(candidate),
            Self::ReflectNonPositive if candidate <= 0.0 => {
                Some(candidate.abs())
            }
            Self::ReflectNonPositive => Some(candidate),
            Self::SkipNonPositive if candidate <= 0.0 => None,
            Self::SkipNonPositive => Some(candidate),
        }
    }
}

/// Information from a full run of a policy-constrained random walk
#[derive(Clone, Debug, PartialEq)]
pub struct MhRwResult {
    /// The last accepted value. The starting value if nothing was accepted.
    pub x: f64,
    /// Number of candidates for which the acceptance ratio was evaluated
    pub n_proposed: usize,
    /// Number of accepted candidates
    pub n_accepted: usize,
    /// Number of iterations skipped by `CandidatePolicy::SkipNonPositive`
    pub n_skipped: usize,
}

impl MhRwResult {
    /// Fraction of evaluated candidates that were accepted. Zero if nothing
    /// was evaluated.
    pub fn acceptance_rate(&self) -> f64 {
        if self.n_proposed == 0 {
            0.0
        } else {
            self.n_accepted as f64 / self.n_proposed as f64
        }
    }
}

/// The Metropolis acceptance probability, min(1, ratio).
///
/// Negative and NaN ratios have zero acceptance probability.
#[inline]
pub fn acceptance_probability(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Gaussian random-walk Metropolis-Hastings with a fixed iteration budget.
///
/// # Arguments
/// - x_start: the starting value
/// - ratio_fn: `ratio_fn(candidate, current, rng)` gives the likelihood ratio
///   times the prior ratio of `candidate` against `current`, in linear space.
///   It receives the rng so it may draw a stochastic prior ratio.
/// - policy: how non-positive proposals are handled
/// - n_iters: the number of proposals, including skipped ones
/// - proposal_scale: the standard deviation of the walk
/// - rng: The random number generator
pub fn mh_policy_rw<F, R>(
    x_start: f64,
    mut ratio_fn: F,
    policy: CandidatePolicy,
    n_iters: usize,
    proposal_scale: f64,
    rng: &mut R,
) -> MhRwResult
where
    F: FnMut(f64, f64, &mut R) -> f64,
    R: Rng,
{
    let mut result = MhRwResult {
        x: x_start,
        n_proposed: 0,
        n_accepted: 0,
        n_skipped: 0,
    };

    for _ in 0..n_iters {
        let proposal: f64 =
            Gaussian::new_unchecked(result.x, proposal_scale).draw(rng);

        let candidate = match policy.apply(proposal) {
            Some(candidate) => candidate,
            None => {
                result.n_skipped += 1;
                continue;
            }
        };

        let alpha = acceptance_probability(ratio_fn(candidate, result.x, rng));
        result.n_proposed += 1;

        let u: f64 = rng.gen::<f64>();
        if u < alpha {
            result.x = candidate;
            result.n_accepted += 1;
        }
    }

    result
}
