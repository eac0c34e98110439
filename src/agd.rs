//! The Asymmetric Gaussian Distribution (AGD) and its feature-selection
//! mixture.
//!
//! The AGD with split point μ and left/right precisions s_l, s_r has density
//!
//! ```text
//! f(x) = sqrt(2/π) / (s_l^{-1/2} + s_r^{-1/2}) exp(-s (x - μ)² / 2)
//! ```
//!
//! where s = s_l for x < μ and s = s_r otherwise.
use iagm_stats::ExtF64;

use crate::model::AgdParams;

/// sqrt(2/π)
const SQRT_2_OVER_PI: f64 = 0.797_884_560_802_865_4;

/// ln(sqrt(2/π))
const LN_SQRT_2_OVER_PI: f64 = -0.225_791_352_644_727_43;

/// AGD density of a single value
///
/// # Example
///
/// ```rust
/// # use iagm::agd::agd_pdf;
/// // continuous at the split point
/// let f_mu = agd_pdf(1.0, 1.0, 0.5, 4.0);
/// let f_left = agd_pdf(1.0 - 1e-9, 1.0, 0.5, 4.0);
/// assert!((f_mu - f_left).abs() < 1e-8);
/// ```
#[inline]
pub fn agd_pdf(x: f64, mu: f64, s_l: f64, s_r: f64) -> f64 {
    let s = if x < mu { s_l } else { s_r };
    let dx = x - mu;
    SQRT_2_OVER_PI / (s_l.sqrt().recip() + s_r.sqrt().recip())
        * (-0.5 * s * dx * dx).exp()
}

/// Log AGD density of a single value.
///
/// Computed directly so that it stays finite far in the tails where
/// `agd_pdf` underflows.
#[inline]
pub fn agd_ln_pdf(x: f64, mu: f64, s_l: f64, s_r: f64) -> f64 {
    let s = if x < mu { s_l } else { s_r };
    let dx = x - mu;
    (-0.5 * s * dx).mul_add(
        dx,
        LN_SQRT_2_OVER_PI - (s_l.sqrt().recip() + s_r.sqrt().recip()).ln(),
    )
}

/// The relevance-weighted two-branch AGD mixture of observation `x` under
/// component `j`, multiplied across every feature:
///
/// ```text
/// ∏_k [ρ_jk f(x_k; μ_jk, s_ljk, s_rjk)
///     + (1 - ρ_jk) f(x_k; μ'_jk, s'_ljk, s'_rjk)]
/// ```
///
/// The product is accumulated as an `ExtF64` so that many small per-feature
/// densities do not flush to zero.
///
/// # Panics
///
/// Panics if `j` or any feature index is out of bounds of `params`
pub fn agd_pdf_fs(x: &[f64], j: usize, params: &AgdParams) -> ExtF64 {
    (0..params.n_features())
        .map(|k| {
            let rho = params.rho[(j, k)];
            let relevant = agd_pdf(
                x[k],
                params.mu[(j, k)],
                params.s_l[(j, k)],
                params.s_r[(j, k)],
            );
            let irrelevant = agd_pdf(
                x[k],
                params.mu_irr[(j, k)],
                params.s_l_irr[(j, k)],
                params.s_r_irr[(j, k)],
            );
            ExtF64::from_f64(rho.mul_add(relevant, (1.0 - rho) * irrelevant))
        })
        .product()
}

/// Parameters of the relevant and irrelevant branch for one feature
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgdMixture {
    pub mu: f64,
    pub s_l: f64,
    pub s_r: f64,
    pub mu_irr: f64,
    pub s_l_irr: f64,
    pub s_r_irr: f64,
    pub rho: f64,
}

impl AgdMixture {
    /// Density of the two-branch mixture at `x`
    #[inline]
    pub fn pdf(&self, x: f64) -> f64 {
        self.rho.mul_add(
            agd_pdf(x, self.mu, self.s_l, self.s_r),
            (1.0 - self.rho)
                * agd_pdf(x, self.mu_irr, self.s_l_irr, self.s_r_irr),
        )
    }
}

/// Batch form of the two-branch mixture, evaluated at every entry of `x_k`
pub fn agd_mixture_pdf(x_k: &[f64], mixture: &AgdMixture) -> Vec<f64> {
    x_k.iter().map(|&x| mixture.pdf(x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;
    use iagm_utils::Matrix;

    fn one_by_one(
        mu: f64,
        s: f64,
        mu_irr: f64,
        s_irr: f64,
        rho: f64,
    ) -> AgdParams {
        AgdParams {
            mu: Matrix::filled(1, 1, mu),
            s_l: Matrix::filled(1, 1, s),
            s_r: Matrix::filled(1, 1, s),
            mu_irr: Matrix::filled(1, 1, mu_irr),
            s_l_irr: Matrix::filled(1, 1, s_irr),
            s_r_irr: Matrix::filled(1, 1, s_irr),
            rho: Matrix::filled(1, 1, rho),
        }
    }

    fn random_params(m: usize, d: usize, rho: f64) -> AgdParams {
        let mk = |f: &dyn Fn(usize, usize) -> f64| {
            let values = (0..m)
                .flat_map(|j| (0..d).map(move |k| (j, k)))
                .map(|(j, k)| f(j, k))
                .collect();
            Matrix::from_raw_parts(values, m)
        };
        AgdParams {
            mu: mk(&|j, k| j as f64 - 0.5 * k as f64),
            s_l: mk(&|j, k| 0.5 + (j + k) as f64),
            s_r: mk(&|j, k| 2.0 + 0.25 * (j * k) as f64),
            mu_irr: mk(&|_, k| 0.1 * k as f64),
            s_l_irr: mk(&|j, _| 1.0 + j as f64),
            s_r_irr: mk(&|_, k| 0.3 + k as f64),
            rho: mk(&|_, _| rho),
        }
    }

    #[test]
    fn constants_are_right() {
        assert_relative_eq!(
            SQRT_2_OVER_PI,
            (2.0 / std::f64::consts::PI).sqrt(),
            epsilon = 1e-15
        );
        assert_relative_eq!(
            LN_SQRT_2_OVER_PI,
            SQRT_2_OVER_PI.ln(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn symmetric_agd_is_gaussian() {
        // s_l = s_r = 1 is the standard normal
        let x: f64 = 0.7;
        let gauss = (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt();
        assert_relative_eq!(agd_pdf(x, 0.0, 1.0, 1.0), gauss, epsilon = 1e-14);
    }

    #[test]
    fn continuous_at_split_and_positive() {
        let cases = [(0.0, 1.0, 1.0), (2.0, 0.1, 30.0), (-3.0, 8.0, 0.5)];
        for &(mu, s_l, s_r) in &cases {
            let at = agd_pdf(mu, mu, s_l, s_r);
            let left = agd_pdf(mu - 1e-10, mu, s_l, s_r);
            assert_relative_eq!(at, left, max_relative = 1e-8);

            for &dx in &[-5.0, -1.0, -0.1, 0.0, 0.1, 1.0, 5.0] {
                assert!(agd_pdf(mu + dx, mu, s_l, s_r) > 0.0);
            }
        }
    }

    #[test]
    fn integrates_to_one() {
        let (mu, s_l, s_r) = (0.5, 0.25, 9.0);
        let (lo, hi, n) = (-40.0, 40.0, 200_000);
        let h = (hi - lo) / n as f64;
        let total: f64 = (0..n)
            .map(|i| {
                let x = lo + (i as f64 + 0.5) * h;
                agd_pdf(x, mu, s_l, s_r) * h
            })
            .sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn ln_pdf_agrees_with_pdf() {
        for &x in &[-3.0, -0.2, 0.0, 0.4, 2.5] {
            assert_relative_eq!(
                agd_ln_pdf(x, 0.3, 2.0, 0.7),
                agd_pdf(x, 0.3, 2.0, 0.7).ln(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn ln_pdf_is_finite_where_pdf_underflows() {
        assert_eq!(agd_pdf(100.0, 0.0, 1.0, 1.0), 0.0);
        assert!(agd_ln_pdf(100.0, 0.0, 1.0, 1.0).is_finite());
    }

    #[test]
    fn fs_with_rho_one_is_relevant_product() {
        let params = random_params(3, 4, 1.0);
        let x = [0.3, -1.0, 2.0, 0.0];
        for j in 0..3 {
            let expected: f64 = (0..4)
                .map(|k| {
                    agd_pdf(
                        x[k],
                        params.mu[(j, k)],
                        params.s_l[(j, k)],
                        params.s_r[(j, k)],
                    )
                })
                .product();
            assert_relative_eq!(
                agd_pdf_fs(&x, j, &params).to_f64(),
                expected,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn fs_with_rho_zero_is_irrelevant_product() {
        let params = random_params(3, 4, 0.0);
        let x = [0.3, -1.0, 2.0, 0.0];
        for j in 0..3 {
            let expected: f64 = (0..4)
                .map(|k| {
                    agd_pdf(
                        x[k],
                        params.mu_irr[(j, k)],
                        params.s_l_irr[(j, k)],
                        params.s_r_irr[(j, k)],
                    )
                })
                .product();
            assert_relative_eq!(
                agd_pdf_fs(&x, j, &params).to_f64(),
                expected,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn fs_is_non_negative() {
        for &rho in &[0.0, 0.2, 0.5, 0.9, 1.0] {
            let params = random_params(2, 3, rho);
            for &x in &[[0.0, 0.0, 0.0], [10.0, -10.0, 3.0], [1e3, 1e3, 1e3]] {
                assert!(agd_pdf_fs(&x, 1, &params) >= ExtF64::ZERO);
            }
        }
    }

    #[test]
    fn fs_survives_many_dimensions() {
        let d = 2_000;
        let params = AgdParams {
            mu: Matrix::filled(1, d, 0.0),
            s_l: Matrix::filled(1, d, 1.0),
            s_r: Matrix::filled(1, d, 1.0),
            mu_irr: Matrix::filled(1, d, 0.0),
            s_l_irr: Matrix::filled(1, d, 1.0),
            s_r_irr: Matrix::filled(1, d, 1.0),
            rho: Matrix::filled(1, d, 0.5),
        };
        let x = vec![1.0; d];
        let f = agd_pdf_fs(&x, 0, &params);
        // the plain f64 product would be 0
        assert!(!f.is_zero());
        assert_relative_eq!(
            f.ln(),
            d as f64 * agd_ln_pdf(1.0, 0.0, 1.0, 1.0),
            max_relative = 1e-10
        );
    }

    #[test]
    fn relevant_and_irrelevant_branches_dominate_their_regions() {
        let params = one_by_one(0.0, 1.0, 5.0, 1.0, 0.9);
        let peak = agd_pdf(0.0, 0.0, 1.0, 1.0);

        let f0 = agd_pdf_fs(&[0.0], 0, &params).to_f64();
        let f5 = agd_pdf_fs(&[5.0], 0, &params).to_f64();

        // at 0 the relevant branch contributes 0.9 * peak; the irrelevant
        // branch is 25/2 nats down
        assert_relative_eq!(f0, 0.9 * peak, max_relative = 1e-5);
        let relevant_at_5 = 0.9 * agd_pdf(5.0, 0.0, 1.0, 1.0);
        let irrelevant_at_5 = 0.1 * agd_pdf(5.0, 5.0, 1.0, 1.0);
        assert!(irrelevant_at_5 > 100.0 * relevant_at_5);
        assert_relative_eq!(f5, irrelevant_at_5, max_relative = 1e-4);
    }

    #[test]
    fn batch_mixture_matches_pointwise() {
        let mixture = AgdMixture {
            mu: 0.0,
            s_l: 2.0,
            s_r: 0.5,
            mu_irr: 1.0,
            s_l_irr: 1.0,
            s_r_irr: 3.0,
            rho: 0.3,
        };
        let xs = [-2.0, -0.5, 0.0, 0.5, 1.0, 4.0];
        let ys = agd_mixture_pdf(&xs, &mixture);
        assert_eq!(ys.len(), xs.len());
        for (x, y) in xs.iter().zip(ys.iter()) {
            let expected = 0.3 * agd_pdf(*x, 0.0, 2.0, 0.5)
                + 0.7 * agd_pdf(*x, 1.0, 1.0, 3.0);
            assert_relative_eq!(*y, expected, epsilon = 1e-14);
        }
    }
}
