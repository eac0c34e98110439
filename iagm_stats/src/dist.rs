//! Sampling primitives for the standard distributions the mixture model is
//! built on.
//!
//! Each function is a thin wrapper around the corresponding `rv`
//! distribution, using the (shape, scale) and (mean, covariance) conventions
//! the rest of the model is written in.
use rand::Rng;
use thiserror::Error;

use crate::rv::dist::{
    Bernoulli, Beta, Gamma, Gaussian, InvGamma, InvWishart, MvGaussian,
};
use crate::rv::nalgebra::{DMatrix, DVector};
use crate::rv::traits::Rv;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DistError {
    /// The parameters are outside the domain of the distribution
    #[error("Invalid {dist} parameters: {params}")]
    InvalidParameters { dist: &'static str, params: String },
    /// The Wishart scale matrix could not be inverted
    #[error("Wishart scale matrix is singular")]
    SingularScale,
    /// Per-feature parameter vectors have different lengths
    #[error("Parameter vectors have lengths {0} and {1}")]
    LengthMismatch(usize, usize),
}

/// Gamma distribution with the given shape and scale
pub fn gamma_shape_scale(shape: f64, scale: f64) -> Result<Gamma, DistError> {
    Gamma::new(shape, scale.recip()).map_err(|_| DistError::InvalidParameters {
        dist: "Gamma",
        params: format!("shape = {shape}, scale = {scale}"),
    })
}

/// Gaussian distribution with the given location and scale (standard
/// deviation)
pub fn gaussian(loc: f64, scale: f64) -> Result<Gaussian, DistError> {
    Gaussian::new(loc, scale).map_err(|_| DistError::InvalidParameters {
        dist: "Gaussian",
        params: format!("loc = {loc}, scale = {scale}"),
    })
}

/// Draw `n` Gamma(shape, scale) samples
pub fn draw_gamma<R: Rng>(
    shape: f64,
    scale: f64,
    n: usize,
    rng: &mut R,
) -> Result<Vec<f64>, DistError> {
    Ok(gamma_shape_scale(shape, scale)?.sample(n, rng))
}

/// Draw `n` Inverse-Gamma(shape, scale) samples
pub fn draw_invgamma<R: Rng>(
    shape: f64,
    scale: f64,
    n: usize,
    rng: &mut R,
) -> Result<Vec<f64>, DistError> {
    let invgamma = InvGamma::new(shape, scale).map_err(|_| {
        DistError::InvalidParameters {
            dist: "InvGamma",
            params: format!("shape = {shape}, scale = {scale}"),
        }
    })?;
    Ok(invgamma.sample(n, rng))
}

/// Draw `n` Wishart(df, scale) matrices.
///
/// If W ~ Wishart(V, df) then W⁻¹ ~ Inverse-Wishart(V⁻¹, df), so each draw
/// is the inverse of an Inverse-Wishart draw with the inverted scale.
pub fn draw_wishart<R: Rng>(
    df: usize,
    scale: &DMatrix<f64>,
    n: usize,
    rng: &mut R,
) -> Result<Vec<DMatrix<f64>>, DistError> {
    let inv_scale =
        scale.clone().try_inverse().ok_or(DistError::SingularScale)?;
    let inv_wishart = InvWishart::new(inv_scale, df).map_err(|_| {
        DistError::InvalidParameters {
            dist: "Wishart",
            params: format!("df = {df}, dims = {:?}", scale.shape()),
        }
    })?;

    (0..n)
        .map(|_| {
            let w_inv: DMatrix<f64> = inv_wishart.draw(rng);
            w_inv.try_inverse().ok_or(DistError::SingularScale)
        })
        .collect()
}

/// Draw `n` Normal(loc, scale) samples
pub fn draw_normal<R: Rng>(
    loc: f64,
    scale: f64,
    n: usize,
    rng: &mut R,
) -> Result<Vec<f64>, DistError> {
    Ok(gaussian(loc, scale)?.sample(n, rng))
}

/// Draw `n` multivariate Normal(mean, cov) samples
pub fn draw_mvnormal<R: Rng>(
    mean: &[f64],
    cov: &DMatrix<f64>,
    n: usize,
    rng: &mut R,
) -> Result<Vec<Vec<f64>>, DistError> {
    let mvg = MvGaussian::new(DVector::from_column_slice(mean), cov.clone())
        .map_err(|_| DistError::InvalidParameters {
            dist: "MvGaussian",
            params: format!(
                "dims = {}, cov dims = {:?}",
                mean.len(),
                cov.shape()
            ),
        })?;

    Ok((0..n)
        .map(|_| {
            let x: DVector<f64> = mvg.draw(rng);
            x.iter().copied().collect()
        })
        .collect())
}

/// Multivariate Normal draw with a diagonal covariance given by the
/// per-dimension precisions, `prec`.
pub fn draw_mvnormal_diag_prec<R: Rng>(
    mean: &[f64],
    prec: &[f64],
    rng: &mut R,
) -> Result<Vec<f64>, DistError> {
    if mean.len() != prec.len() {
        return Err(DistError::LengthMismatch(mean.len(), prec.len()));
    }
    let variances: Vec<f64> = prec.iter().map(|p| p.recip()).collect();
    let cov = DMatrix::from_diagonal(&DVector::from_vec(variances));
    let mut xs = draw_mvnormal(mean, &cov, 1, rng)?;
    Ok(xs.remove(0))
}

/// Draw a single Bernoulli(p) trial
pub fn draw_bernoulli<R: Rng>(p: f64, rng: &mut R) -> Result<bool, DistError> {
    let bern =
        Bernoulli::new(p).map_err(|_| DistError::InvalidParameters {
            dist: "Bernoulli",
            params: format!("p = {p}"),
        })?;
    Ok(bern.draw(rng))
}

/// Draw a single Beta(a, b) sample
pub fn draw_beta<R: Rng>(
    a: f64,
    b: f64,
    rng: &mut R,
) -> Result<f64, DistError> {
    let beta = Beta::new(a, b).map_err(|_| DistError::InvalidParameters {
        dist: "Beta",
        params: format!("a = {a}, b = {b}"),
    })?;
    Ok(beta.draw(rng))
}

/// Draw one Beta(a[k], b[k]) sample for every k
pub fn draw_beta_vec<R: Rng>(
    a: &[f64],
    b: &[f64],
    rng: &mut R,
) -> Result<Vec<f64>, DistError> {
    if a.len() != b.len() {
        return Err(DistError::LengthMismatch(a.len(), b.len()));
    }
    a.iter()
        .zip(b.iter())
        .map(|(&ak, &bk)| draw_beta(ak, bk, rng))
        .collect()
}
