//! Adaptive-rejection samplers for the Dirichlet process concentration, α,
//! and for the shape, β, of the Gamma prior on the component precisions.
use iagm_consts::{ALPHA_ARS_ABSCISSAE, BETA_ARS_OFFSET, BETA_LOWER_BOUND};
use iagm_stats::ars::Ars;
use iagm_utils::{Matrix, Shape};
use log::debug;
use rand::Rng;

use crate::error::{HyperError, ModelError};
use crate::misc::{digamma, ln_gamma};
use crate::model::{check_positive, is_positive_finite};

// Upper bound on the number of times an abscissa is pushed outward looking
// for a negative log-density slope
const MAX_BRACKET_STEPS: usize = 16;

/// Log posterior of α, up to a constant, given `k` occupied components and
/// `n` observations (Rasmussen, 2000, eq. 15)
///
/// ```text
/// (k - 3/2) ln α - 1/(2α) + ln Γ(α) - ln Γ(n + α)
/// ```
pub fn ln_p_alpha(alpha: f64, k: usize, n: usize) -> f64 {
    let k = k as f64;
    let n = n as f64;
    (k - 1.5) * alpha.ln() - 0.5 / alpha + ln_gamma(alpha)
        - ln_gamma(n + alpha)
}

/// Derivative of [`ln_p_alpha`] with respect to α
pub fn ln_p_alpha_prime(alpha: f64, k: usize, n: usize) -> f64 {
    let k = k as f64;
    let n = n as f64;
    (k - 1.5) / alpha + 0.5 / (alpha * alpha) + digamma(alpha)
        - digamma(n + alpha)
}

// ln α has the log-concave density ln_p_alpha(e^y) + y
fn ln_p_ln_alpha(y: f64, k: usize, n: usize) -> f64 {
    ln_p_alpha(y.exp(), k, n) + y
}

fn ln_p_ln_alpha_prime(y: f64, k: usize, n: usize) -> f64 {
    let alpha = y.exp();
    alpha * ln_p_alpha_prime(alpha, k, n) + 1.0
}

/// Draw `size` samples of α from its posterior.
///
/// The sampler runs on ln α, where the posterior is log-concave for every
/// `k` and `n`, starting from the abscissae ln(0.1) and ln(5). Abscissae that
/// fail to bracket the mode are pushed outward a bounded number of times.
///
/// # Errors
///
/// Fails if `k` is greater than `n`, in which case the posterior is improper,
/// or if adaptive rejection sampling otherwise fails.
pub fn draw_alpha<R: Rng>(
    k: usize,
    n: usize,
    size: usize,
    rng: &mut R,
) -> Result<Vec<f64>, HyperError> {
    let ln_f = move |y: f64| ln_p_ln_alpha(y, k, n);
    let ln_f_prime = move |y: f64| ln_p_ln_alpha_prime(y, k, n);

    let mut y_lower = ALPHA_ARS_ABSCISSAE[0].ln();
    let mut y_upper = ALPHA_ARS_ABSCISSAE[1].ln();
    for _ in 0..MAX_BRACKET_STEPS {
        if ln_f_prime(y_lower) > 0.0 {
            break;
        }
        y_lower -= 1.0;
    }
    for _ in 0..MAX_BRACKET_STEPS {
        if ln_f_prime(y_upper) < 0.0 {
            break;
        }
        y_upper += 1.0;
    }

    let mut ars = Ars::new(
        ln_f,
        ln_f_prime,
        &[y_lower, y_upper],
        f64::NEG_INFINITY,
        f64::INFINITY,
    )?;

    let alphas: Vec<f64> =
        ars.draw(size, rng)?.into_iter().map(f64::exp).collect();

    debug!(
        "drew {} alpha (k = {}, n = {}) with {} abscissae",
        size,
        k,
        n,
        ars.abscissae().len()
    );
    Ok(alphas)
}

/// Log posterior of β, up to a constant, given the number of components,
/// `m`, and the sufficient statistic from [`beta_sufficient_stat`]
///
/// ```text
/// -2m ln Γ(β/2) - 1/(2β) + (mβ - 3/2) ln(β/2) + β S / 2
/// ```
pub fn ln_p_beta(beta: f64, m: usize, suff_stat: f64) -> f64 {
    let m = m as f64;
    -2.0 * m * ln_gamma(0.5 * beta) - 0.5 / beta
        + (beta * m - 1.5) * (0.5 * beta).ln()
        + 0.5 * beta * suff_stat
}

/// Derivative of [`ln_p_beta`] with respect to β
pub fn ln_p_beta_prime(beta: f64, m: usize, suff_stat: f64) -> f64 {
    let m = m as f64;
    -m * digamma(0.5 * beta)
        + 0.5 / (beta * beta)
        + m * (0.5 * beta).ln()
        + (m * beta - 1.5) / beta
        + 0.5 * suff_stat
}

/// Sum over the components of the terms the β posterior needs from the
/// feature-`k` precisions of both branches:
///
/// ```text
/// Σ_j [ln s_jk + ln w_k - w_k s_jk] + Σ_j [ln s'_jk - w_k s'_jk]
/// ```
///
/// # Errors
///
/// Fails if `s` and `s_irr` differ in shape, if `k` is out of bounds, or if
/// `w_k` or any of the precisions are not positive.
pub fn beta_sufficient_stat(
    w: &[f64],
    s: &Matrix<f64>,
    s_irr: &Matrix<f64>,
    k: usize,
) -> Result<f64, ModelError> {
    if s.shape() != s_irr.shape() {
        return Err(ModelError::ShapeMismatch {
            name: "s_irr",
            got: s_irr.shape(),
            expected: s.shape(),
        });
    }

    let n_features = s.n_cols();
    if k >= n_features || k >= w.len() {
        return Err(ModelError::FeatureIndexOutOfBounds {
            k,
            n_features: n_features.min(w.len()),
        });
    }

    let w_k = w[k];
    if !is_positive_finite(w_k) {
        return Err(ModelError::NonPositiveParameter {
            name: "w",
            value: w_k,
        });
    }

    let s_k: Vec<f64> = s.column(k).copied().collect();
    let s_irr_k: Vec<f64> = s_irr.column(k).copied().collect();
    check_positive("s", &s_k)?;
    check_positive("s_irr", &s_irr_k)?;

    let ln_w = w_k.ln();
    let relevant: f64 = s_k.iter().map(|&sj| sj.ln() + ln_w - w_k * sj).sum();
    let irrelevant: f64 =
        s_irr_k.iter().map(|&sj| sj.ln() - w_k * sj).sum();

    Ok(relevant + irrelevant)
}

// ln β has the density ln_p_beta(e^y) + y on (ln 2, ∞). It is log-concave
// whenever m + S/2 < 0, the condition for the β posterior to be proper.
fn ln_p_ln_beta(y: f64, m: usize, suff_stat: f64) -> f64 {
    ln_p_beta(y.exp(), m, suff_stat) + y
}

fn ln_p_ln_beta_prime(y: f64, m: usize, suff_stat: f64) -> f64 {
    let beta = y.exp();
    beta * ln_p_beta_prime(beta, m, suff_stat) + 1.0
}

/// Draw `size` samples of β_k, the shape of the Gamma prior on the
/// feature-`k` precisions, on the support (2, ∞).
///
/// `s` and `s_irr` are the M×D relevant and irrelevant precisions, and `w` is
/// the per-feature rate hyperparameter. The sampler runs on ln β, starting
/// from the abscissa ln 17. If the log density is still rising there the
/// abscissa is pushed outward a bounded number of times.
///
/// # Errors
///
/// Fails on malformed inputs (see [`beta_sufficient_stat`]) or if adaptive
/// rejection sampling fails. The latter happens when the posterior has no
/// mode, e.g. when every precision equals 1/w_k.
pub fn draw_beta_ars<R: Rng>(
    w: &[f64],
    s: &Matrix<f64>,
    s_irr: &Matrix<f64>,
    k: usize,
    size: usize,
    rng: &mut R,
) -> Result<Vec<f64>, HyperError> {
    let m = s.n_rows();
    let suff_stat = beta_sufficient_stat(w, s, s_irr, k)?;

    let ln_f = move |y: f64| ln_p_ln_beta(y, m, suff_stat);
    let ln_f_prime = move |y: f64| ln_p_ln_beta_prime(y, m, suff_stat);

    let mut y_start = (BETA_LOWER_BOUND + BETA_ARS_OFFSET).ln();
    for _ in 0..MAX_BRACKET_STEPS {
        if ln_f_prime(y_start) < 0.0 {
            break;
        }
        y_start += 1.0;
    }

    let mut ars = Ars::new(
        ln_f,
        ln_f_prime,
        &[y_start],
        BETA_LOWER_BOUND.ln(),
        f64::INFINITY,
    )?;

    let betas: Vec<f64> =
        ars.draw(size, rng)?.into_iter().map(f64::exp).collect();

    debug!(
        "drew {} beta[{}] (m = {}, S = {:.4}) with {} abscissae",
        size,
        k,
        m,
        suff_stat,
        ars.abscissae().len()
    );
    Ok(betas)
}
