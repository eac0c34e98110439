//! Samplers for the latent component indicators and the unnormalized
//! relevance-weighted responsibilities.
use iagm_utils::{pflip_or_uniform, Matrix, Shape, Tensor3};
use log::warn;
use rand::Rng;

use crate::agd::{agd_pdf, agd_pdf_fs};
use crate::error::ModelError;
use crate::model::{check_len, AgdParams};

/// Draw a component index for every observation.
///
/// `pvec` is the M×N matrix of unnormalized component weights, one column per
/// observation. A column whose weights sum to zero (or to something that is
/// not finite) gets a component chosen uniformly at random.
///
/// # Panics
///
/// Panics if `pvec` has no rows
///
/// # Example
///
/// ```rust
/// # use iagm::indicator::draw_indicator;
/// # use iagm::utils::Matrix;
/// # use rand::SeedableRng;
/// let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(1337);
/// let pvec = Matrix::from_vecs(vec![
///     vec![0.0, 1.0],
///     vec![2.0, 0.0],
/// ]);
/// assert_eq!(draw_indicator(&pvec, &mut rng), vec![1, 0]);
/// ```
pub fn draw_indicator<R: Rng>(pvec: &Matrix<f64>, rng: &mut R) -> Vec<usize> {
    let mut n_fallback = 0;
    let zs = (0..pvec.n_cols())
        .map(|col| {
            let weights: Vec<f64> = pvec.column(col).copied().collect();
            let (ix, fallback) = pflip_or_uniform(&weights, rng);
            if fallback {
                n_fallback += 1;
            }
            ix
        })
        .collect();

    if n_fallback > 0 {
        warn!(
            "{} of {} observations had degenerate component weights and \
            were assigned uniformly",
            n_fallback,
            pvec.n_cols()
        );
    }
    zs
}

/// Unnormalized responsibility of feature `k`'s relevant branch of component
/// `j` for observation `i`:
///
/// ```text
/// ρ_jk f(x_ik; μ_jk, s_ljk, s_rjk) π_j ∏_k' [two-branch mixture of x_ik']
/// ```
///
/// The cluster weight π_j ∏_k' [...] is kept in extended precision and only the
/// final product is converted to `f64`, so an entry of zero means the
/// responsibility is below the smallest positive `f64`. Normalizing across
/// components and features is left to the caller.
///
/// # Errors
///
/// Fails if `params` is malformed, if `x` does not have one column per
/// feature, or if `pi` does not have one weight per component.
pub fn draw_posterior_z(
    x: &Matrix<f64>,
    pi: &[f64],
    params: &AgdParams,
) -> Result<Tensor3, ModelError> {
    params.validate()?;
    let n_components = params.n_components();
    let n_features = params.n_features();

    if x.n_cols() != n_features {
        return Err(ModelError::ShapeMismatch {
            name: "x",
            got: x.shape(),
            expected: (x.n_rows(), n_features),
        });
    }
    check_len("pi", pi, n_components)?;

    let n = x.n_rows();
    let mut z = Tensor3::zeros(n, n_components, n_features);
    let mut n_saturated = 0;

    for (i, row) in x.rows().enumerate() {
        let mut all_zero = true;
        for j in 0..n_components {
            let cluster_weight = agd_pdf_fs(row, j, params) * pi[j];
            for k in 0..n_features {
                let relevant = params.rho[(j, k)]
                    * agd_pdf(
                        row[k],
                        params.mu[(j, k)],
                        params.s_l[(j, k)],
                        params.s_r[(j, k)],
                    );
                let value = (cluster_weight * relevant).to_f64();
                all_zero &= value == 0.0;
                z[(i, j, k)] = value;
            }
        }
        if all_zero {
            n_saturated += 1;
        }
    }

    if n_saturated > 0 {
        warn!(
            "responsibilities of {} of {} observations are all zero",
            n_saturated, n
        );
    }

    Ok(z)
}
