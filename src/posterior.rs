//! Metropolis-Hastings updates of the component parameters (μ, s_l, s_r) and
//! of the Beta hyperparameters on the relevance weights (δ_a, δ_b).
//!
//! Every sampler runs a Gaussian random walk for `MhConfig::n_iters`
//! proposals and returns the last accepted value. The acceptance ratio is the
//! likelihood ratio times a prior ratio; see [`PriorRatio`] for how the latter
//! is computed.
use iagm_consts::delta_prior;
use iagm_stats::dist::{gamma_shape_scale, gaussian};
use iagm_stats::mh::{mh_policy_rw, CandidatePolicy, MhRwResult};
use iagm_stats::rv::traits::Rv;
use iagm_utils::{Matrix, Shape};
use log::debug;
use rand::Rng;

use crate::agd::agd_ln_pdf;
use crate::config::{MhConfig, PriorRatio};
use crate::error::ModelError;
use crate::misc::ln_gamma;
use crate::model::{check_len, is_positive_finite, Site};

/// The prior-ratio term of the acceptance probability
fn prior_ratio<D, R>(
    prior: &D,
    candidate: f64,
    current: f64,
    mode: PriorRatio,
    rng: &mut R,
) -> f64
where
    D: Rv<f64>,
    R: Rng,
{
    match mode {
        PriorRatio::MonteCarlo => {
            let numer: f64 = prior.draw(rng);
            let denom: f64 = prior.draw(rng);
            numer / denom
        }
        PriorRatio::ClosedForm => {
            (prior.ln_f(&candidate) - prior.ln_f(&current)).exp()
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, ModelError> {
    if is_positive_finite(value) {
        Ok(value)
    } else {
        Err(ModelError::NonPositiveParameter { name, value })
    }
}

fn feature_hyper(
    name: &'static str,
    xs: &[f64],
    site: &Site,
) -> Result<f64, ModelError> {
    check_len(name, xs, site.n_features())?;
    Ok(xs[site.k()])
}

/// Gamma(β_k/2, scale = 2/(β_k w_k)) prior on a precision
fn precision_prior(
    beta: &[f64],
    w: &[f64],
    site: &Site,
) -> Result<iagm_stats::rv::dist::Gamma, ModelError> {
    let beta_k = positive("beta", feature_hyper("beta", beta, site)?)?;
    let w_k = positive("w", feature_hyper("w", w, site)?)?;
    Ok(gamma_shape_scale(beta_k / 2.0, 2.0 / (beta_k * w_k))?)
}

/// Update the split point, μ_jk, of the relevant branch.
///
/// The prior is Normal(λ_k, scale = 1/r_k) and μ is unconstrained.
#[allow(clippy::too_many_arguments)]
pub fn sample_mu_jk<R: Rng>(
    site: &Site,
    mu_jk: f64,
    s_ljk: f64,
    s_rjk: f64,
    lam: &[f64],
    r: &[f64],
    config: &MhConfig,
    rng: &mut R,
) -> Result<MhRwResult, ModelError> {
    config.validate()?;
    let s_ljk = positive("s_ljk", s_ljk)?;
    let s_rjk = positive("s_rjk", s_rjk)?;
    let lam_k = feature_hyper("lam", lam, site)?;
    let r_k = positive("r", feature_hyper("r", r, site)?)?;
    let prior = gaussian(lam_k, r_k.recip())?;

    let ratio_fn = |mu: f64, mu_prev: f64, rng: &mut R| {
        let ln_lr = site.weighted_ln_ratio(|x| {
            agd_ln_pdf(x, mu, s_ljk, s_rjk)
                - agd_ln_pdf(x, mu_prev, s_ljk, s_rjk)
        });
        ln_lr.exp() * prior_ratio(&prior, mu, mu_prev, config.prior_ratio, rng)
    };

    let result = mh_policy_rw(
        mu_jk,
        ratio_fn,
        CandidatePolicy::Unconstrained,
        config.n_iters,
        config.proposal_scale,
        rng,
    );

    debug!(
        "mu[{}, {}] acceptance rate {:.3}",
        site.j(),
        site.k(),
        result.acceptance_rate()
    );
    Ok(result)
}

/// Update the left precision, s_ljk, of the relevant branch.
///
/// Non-positive proposals are reflected about zero.
#[allow(clippy::too_many_arguments)]
pub fn sample_s_ljk<R: Rng>(
    site: &Site,
    mu_jk: f64,
    s_ljk: f64,
    s_rjk: f64,
    beta: &[f64],
    w: &[f64],
    config: &MhConfig,
    rng: &mut R,
) -> Result<MhRwResult, ModelError> {
    config.validate()?;
    let s_ljk = positive("s_ljk", s_ljk)?;
    let s_rjk = positive("s_rjk", s_rjk)?;
    let prior = precision_prior(beta, w, site)?;

    let ratio_fn = |s_l: f64, s_l_prev: f64, rng: &mut R| {
        let ln_lr = site.weighted_ln_ratio(|x| {
            agd_ln_pdf(x, mu_jk, s_l, s_rjk)
                - agd_ln_pdf(x, mu_jk, s_l_prev, s_rjk)
        });
        ln_lr.exp()
            * prior_ratio(&prior, s_l, s_l_prev, config.prior_ratio, rng)
    };

    let result = mh_policy_rw(
        s_ljk,
        ratio_fn,
        CandidatePolicy::ReflectNonPositive,
        config.n_iters,
        config.proposal_scale,
        rng,
    );

    debug!(
        "s_l[{}, {}] acceptance rate {:.3}",
        site.j(),
        site.k(),
        result.acceptance_rate()
    );
    Ok(result)
}

/// Update the right precision, s_rjk, of the relevant branch.
///
/// Non-positive proposals are skipped.
#[allow(clippy::too_many_arguments)]
pub fn sample_s_rjk<R: Rng>(
    site: &Site,
    mu_jk: f64,
    s_ljk: f64,
    s_rjk: f64,
    beta: &[f64],
    w: &[f64],
    config: &MhConfig,
    rng: &mut R,
) -> Result<MhRwResult, ModelError> {
    config.validate()?;
    let s_ljk = positive("s_ljk", s_ljk)?;
    let s_rjk = positive("s_rjk", s_rjk)?;
    let prior = precision_prior(beta, w, site)?;

    let ratio_fn = |s_r: f64, s_r_prev: f64, rng: &mut R| {
        let ln_lr = site.weighted_ln_ratio(|x| {
            agd_ln_pdf(x, mu_jk, s_ljk, s_r)
                - agd_ln_pdf(x, mu_jk, s_ljk, s_r_prev)
        });
        ln_lr.exp()
            * prior_ratio(&prior, s_r, s_r_prev, config.prior_ratio, rng)
    };

    let result = mh_policy_rw(
        s_rjk,
        ratio_fn,
        CandidatePolicy::SkipNonPositive,
        config.n_iters,
        config.proposal_scale,
        rng,
    );

    debug!(
        "s_r[{}, {}] acceptance rate {:.3}, {} skipped",
        site.j(),
        site.k(),
        result.acceptance_rate(),
        result.n_skipped,
    );
    Ok(result)
}

/// Which shape parameter of the Beta prior on ρ_·k is being updated
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum DeltaSide {
    A,
    B,
}

fn sample_delta<R: Rng>(
    side: DeltaSide,
    delta_a: f64,
    delta_b: f64,
    rho: &Matrix<f64>,
    k: usize,
    config: &MhConfig,
    rng: &mut R,
) -> Result<MhRwResult, ModelError> {
    config.validate()?;
    let delta_a = positive("delta_a", delta_a)?;
    let delta_b = positive("delta_b", delta_b)?;

    if k >= rho.n_cols() {
        return Err(ModelError::FeatureIndexOutOfBounds {
            k,
            n_features: rho.n_cols(),
        });
    }

    let n_components = rho.n_rows() as f64;
    // Σ_j ln ρ_jk for δ_a, Σ_j ln(1 - ρ_jk) for δ_b
    let sum_ln_rho: f64 = match side {
        DeltaSide::A => rho.column(k).map(|p| p.ln()).sum(),
        DeltaSide::B => rho.column(k).map(|p| (-p).ln_1p()).sum(),
    };
    let (x_start, other) = match side {
        DeltaSide::A => (delta_a, delta_b),
        DeltaSide::B => (delta_b, delta_a),
    };

    let prior = delta_prior();

    // Beta(a, b) on ρ is Beta(b, a) on 1 - ρ
    let ratio_fn = |delta: f64, delta_prev: f64, rng: &mut R| {
        let ln_lr = n_components
            * (ln_gamma(delta + other) - ln_gamma(delta)
                - ln_gamma(delta_prev + other)
                + ln_gamma(delta_prev))
            + (delta - delta_prev) * sum_ln_rho;
        ln_lr.exp()
            * prior_ratio(&prior, delta, delta_prev, config.prior_ratio, rng)
    };

    let result = mh_policy_rw(
        x_start,
        ratio_fn,
        CandidatePolicy::SkipNonPositive,
        config.n_iters,
        config.proposal_scale,
        rng,
    );

    debug!(
        "delta_{}[{}] acceptance rate {:.3}, {} skipped",
        if side == DeltaSide::A { "a" } else { "b" },
        k,
        result.acceptance_rate(),
        result.n_skipped,
    );
    Ok(result)
}

/// Update δ_a,k, the first shape parameter of the Beta prior on ρ_·k.
///
/// Non-positive proposals are skipped. The prior is Gamma(2, scale=0.5).
pub fn sample_delta_a<R: Rng>(
    delta_a: f64,
    delta_b: f64,
    rho: &Matrix<f64>,
    k: usize,
    config: &MhConfig,
    rng: &mut R,
) -> Result<MhRwResult, ModelError> {
    sample_delta(DeltaSide::A, delta_a, delta_b, rho, k, config, rng)
}

/// Update δ_b,k, the second shape parameter of the Beta prior on ρ_·k.
///
/// Non-positive proposals are skipped. The prior is Gamma(2, scale=0.5).
pub fn sample_delta_b<R: Rng>(
    delta_a: f64,
    delta_b: f64,
    rho: &Matrix<f64>,
    k: usize,
    config: &MhConfig,
    rng: &mut R,
) -> Result<MhRwResult, ModelError> {
    sample_delta(DeltaSide::B, delta_a, delta_b, rho, k, config, rng)
}
