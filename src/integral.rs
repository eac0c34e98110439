//! Monte Carlo estimate of the prior predictive density of each observation
//! under a fresh (unoccupied) component.
use iagm_stats::dist::{
    draw_beta_vec, draw_mvnormal_diag_prec, gamma_shape_scale,
};
use iagm_stats::integrate::mc_mean;
use iagm_stats::rv::traits::Rv;
use iagm_utils::{Matrix, Shape};
use log::debug;
use rand::Rng;

use crate::agd::AgdMixture;
use crate::config::IntegralConfig;
use crate::error::ModelError;
use crate::model::{check_len, check_positive, Hyperpriors};

/// One draw of every component parameter from the prior
#[derive(Clone, Debug, PartialEq)]
pub struct PriorDraw {
    pub mu: Vec<f64>,
    pub s_l: Vec<f64>,
    pub s_r: Vec<f64>,
    pub mu_irr: Vec<f64>,
    pub s_l_irr: Vec<f64>,
    pub s_r_irr: Vec<f64>,
    pub rho: Vec<f64>,
}

fn draw_precisions<R: Rng>(
    beta: &[f64],
    w: &[f64],
    rng: &mut R,
) -> Result<Vec<f64>, ModelError> {
    beta.iter()
        .zip(w.iter())
        .map(|(&beta_k, &w_k)| {
            let gamma = gamma_shape_scale(0.5 * beta_k, 2.0 / (beta_k * w_k))?;
            let s: f64 = gamma.draw(rng);
            Ok(s)
        })
        .collect()
}

impl PriorDraw {
    /// Draw the split points of both branches from Normal(λ, diag(1/r)), the
    /// precisions from their Gamma priors, and the relevance weights from
    /// Beta(δ_a, δ_b).
    pub fn sample<R: Rng>(
        hyper: &Hyperpriors,
        delta_a: &[f64],
        delta_b: &[f64],
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        let mu = draw_mvnormal_diag_prec(&hyper.lam, &hyper.r, rng)?;
        let s_l = draw_precisions(&hyper.beta_l, &hyper.w_l, rng)?;
        let s_r = draw_precisions(&hyper.beta_r, &hyper.w_r, rng)?;
        let mu_irr = draw_mvnormal_diag_prec(&hyper.lam, &hyper.r, rng)?;
        let s_l_irr = draw_precisions(&hyper.beta_l, &hyper.w_l, rng)?;
        let s_r_irr = draw_precisions(&hyper.beta_r, &hyper.w_r, rng)?;
        let rho = draw_beta_vec(delta_a, delta_b, rng)?;

        Ok(PriorDraw {
            mu,
            s_l,
            s_r,
            mu_irr,
            s_l_irr,
            s_r_irr,
            rho,
        })
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.mu.len()
    }

    /// The feature-`k` two-branch mixture
    pub fn mixture(&self, k: usize) -> AgdMixture {
        AgdMixture {
            mu: self.mu[k],
            s_l: self.s_l[k],
            s_r: self.s_r[k],
            mu_irr: self.mu_irr[k],
            s_l_irr: self.s_l_irr[k],
            s_r_irr: self.s_r_irr[k],
            rho: self.rho[k],
        }
    }

    /// The product over features of the two-branch mixture density for every
    /// row of `x`.
    ///
    /// This is a plain f64 product and may underflow to zero for wide data.
    pub fn density(&self, x: &Matrix<f64>) -> Vec<f64> {
        let mixtures: Vec<AgdMixture> =
            (0..self.n_features()).map(|k| self.mixture(k)).collect();
        x.rows()
            .map(|row| {
                row.iter()
                    .zip(mixtures.iter())
                    .map(|(&x, mixture)| mixture.pdf(x))
                    .product::<f64>()
            })
            .collect()
    }
}

/// Estimate, for every row of the N×D `x`, the expected product over features
/// of the two-branch AGD mixture density under the prior, by averaging over
/// `config.n_draws` prior draws.
///
/// # Errors
///
/// Fails if `config.n_draws` is zero, if the hyperpriors or the δ vectors do
/// not have one entry per feature, or if any of them are not positive.
pub fn integral_approx<R: Rng>(
    x: &Matrix<f64>,
    hyper: &Hyperpriors,
    delta_a: &[f64],
    delta_b: &[f64],
    config: &IntegralConfig,
    rng: &mut R,
) -> Result<Vec<f64>, ModelError> {
    if config.n_draws == 0 {
        return Err(ModelError::ZeroDraws);
    }

    let n_features = x.n_cols();
    check_len("lam", &hyper.lam, n_features)?;
    hyper.validate()?;
    check_len("delta_a", delta_a, n_features)?;
    check_len("delta_b", delta_b, n_features)?;
    check_positive("delta_a", delta_a)?;
    check_positive("delta_b", delta_b)?;

    let est = mc_mean(
        |rng| {
            PriorDraw::sample(hyper, delta_a, delta_b, rng)
                .map(|draw| draw.density(x))
        },
        x.n_rows(),
        config.n_draws,
        rng,
    )?;

    debug!(
        "integral approximation over {} rows with {} draws",
        x.n_rows(),
        config.n_draws
    );
    Ok(est)
}
