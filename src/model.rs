//! Containers for the data, component parameters, and hyperpriors
use iagm_utils::{Matrix, Shape, Tensor3};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Per-(component, feature) AGD parameters of the relevant and irrelevant
/// branches, plus the relevance weights. Every matrix is M×D.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgdParams {
    pub mu: Matrix<f64>,
    pub s_l: Matrix<f64>,
    pub s_r: Matrix<f64>,
    pub mu_irr: Matrix<f64>,
    pub s_l_irr: Matrix<f64>,
    pub s_r_irr: Matrix<f64>,
    pub rho: Matrix<f64>,
}

impl AgdParams {
    /// Number of components, M
    #[inline]
    pub fn n_components(&self) -> usize {
        self.mu.n_rows()
    }

    /// Number of features, D
    #[inline]
    pub fn n_features(&self) -> usize {
        self.mu.n_cols()
    }

    /// Check that every matrix is M×D, that precisions are positive and that
    /// relevance weights are in [0, 1].
    pub fn validate(&self) -> Result<(), ModelError> {
        let expected = self.mu.shape();
        let named = [
            ("s_l", &self.s_l),
            ("s_r", &self.s_r),
            ("mu_irr", &self.mu_irr),
            ("s_l_irr", &self.s_l_irr),
            ("s_r_irr", &self.s_r_irr),
            ("rho", &self.rho),
        ];

        for &(name, mat) in named.iter() {
            if mat.shape() != expected {
                return Err(ModelError::ShapeMismatch {
                    name,
                    got: mat.shape(),
                    expected,
                });
            }
        }

        for (name, mat) in [
            ("s_l", &self.s_l),
            ("s_r", &self.s_r),
            ("s_l_irr", &self.s_l_irr),
            ("s_r_irr", &self.s_r_irr),
        ] {
            if let Some(&value) =
                mat.raw_values().iter().find(|&&s| !is_positive_finite(s))
            {
                return Err(ModelError::NonPositiveParameter { name, value });
            }
        }

        for j in 0..self.n_components() {
            for k in 0..self.n_features() {
                let value = self.rho[(j, k)];
                if !(0.0..=1.0).contains(&value) {
                    return Err(ModelError::RelevanceOutOfRange { j, k, value });
                }
            }
        }

        Ok(())
    }
}

/// Per-feature hyperpriors: Normal(lam, 1/r) on the means and
/// Gamma(beta/2, scale = 2/(beta w)) on the left and right precisions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hyperpriors {
    pub lam: Vec<f64>,
    pub r: Vec<f64>,
    pub beta_l: Vec<f64>,
    pub w_l: Vec<f64>,
    pub beta_r: Vec<f64>,
    pub w_r: Vec<f64>,
}

impl Hyperpriors {
    /// The same hyperpriors for each of `n_features` features
    pub fn repeated(
        n_features: usize,
        lam: f64,
        r: f64,
        beta: f64,
        w: f64,
    ) -> Self {
        Hyperpriors {
            lam: vec![lam; n_features],
            r: vec![r; n_features],
            beta_l: vec![beta; n_features],
            w_l: vec![w; n_features],
            beta_r: vec![beta; n_features],
            w_r: vec![w; n_features],
        }
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.lam.len()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let d = self.n_features();
        check_len("r", &self.r, d)?;
        check_len("beta_l", &self.beta_l, d)?;
        check_len("w_l", &self.w_l, d)?;
        check_len("beta_r", &self.beta_r, d)?;
        check_len("w_r", &self.w_r, d)?;

        check_positive("r", &self.r)?;
        check_positive("beta_l", &self.beta_l)?;
        check_positive("w_l", &self.w_l)?;
        check_positive("beta_r", &self.beta_r)?;
        check_positive("w_r", &self.w_r)
    }
}

/// The data needed to update the parameters of one (component, feature)
/// pair: the data set, the responsibilities, and the indices.
#[derive(Clone, Copy, Debug)]
pub struct Site<'a> {
    x: &'a Matrix<f64>,
    z: &'a Tensor3,
    j: usize,
    k: usize,
}

impl<'a> Site<'a> {
    /// # Errors
    ///
    /// Fails if `z` is not N×M×D for the N×D `x`, or if `j` or `k` is out of
    /// bounds.
    pub fn new(
        x: &'a Matrix<f64>,
        z: &'a Tensor3,
        j: usize,
        k: usize,
    ) -> Result<Self, ModelError> {
        let (n, m, d) = z.dims();
        if (n, d) != x.shape() {
            return Err(ModelError::ResponsibilityDimsMismatch {
                got: z.dims(),
                expected: (x.n_rows(), m, x.n_cols()),
            });
        }

        if j >= m {
            return Err(ModelError::ComponentIndexOutOfBounds {
                j,
                n_components: m,
            });
        }

        if k >= d {
            return Err(ModelError::FeatureIndexOutOfBounds {
                k,
                n_features: d,
            });
        }

        Ok(Site { x, z, j, k })
    }

    #[inline]
    pub fn j(&self) -> usize {
        self.j
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of features, D, of the data set
    #[inline]
    pub fn n_features(&self) -> usize {
        self.x.n_cols()
    }

    /// Responsibility-weighted sum over observations of
    /// `ln_ratio(x[i, k])`, i.e. Σ_i z[i, j, k] ln_ratio(x[i, k])
    pub fn weighted_ln_ratio<F>(&self, ln_ratio: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        self.weighted_values().map(|(x, z)| z * ln_ratio(x)).sum()
    }

    /// (x[i, k], z[i, j, k]) for every observation i
    pub fn weighted_values(&self) -> impl Iterator<Item = (f64, f64)> + 'a {
        let (x, z) = (self.x, self.z);
        let (j, k) = (self.j, self.k);
        x.column(k)
            .enumerate()
            .map(move |(i, &xik)| (xik, z[(i, j, k)]))
    }
}

#[inline]
pub(crate) fn is_positive_finite(x: f64) -> bool {
    x > 0.0 && x.is_finite()
}

pub(crate) fn check_len(
    name: &'static str,
    xs: &[f64],
    expected: usize,
) -> Result<(), ModelError> {
    if xs.len() == expected {
        Ok(())
    } else {
        Err(ModelError::LengthMismatch {
            name,
            got: xs.len(),
            expected,
        })
    }
}

pub(crate) fn check_positive(
    name: &'static str,
    xs: &[f64],
) -> Result<(), ModelError> {
    match xs.iter().find(|&&x| !is_positive_finite(x)) {
        Some(&value) => Err(ModelError::NonPositiveParameter { name, value }),
        None => Ok(()),
    }
}
