//! Adaptive Rejection Sampling (Gilks & Wild, 1992) for univariate
//! log-concave densities known up to a constant.
//!
//! The upper envelope is the piecewise-exponential hull built from tangents
//! of the log density at the abscissae. The lower squeeze is built from the
//! chords between neighboring abscissae. Every point at which the log
//! density has to be evaluated is added to the hull.
use log::trace;
use rand::Rng;
use thiserror::Error;

/// Consecutive envelope rejections after which a draw gives up
const MAX_REJECTIONS: usize = 10_000;

// Tangent slopes smaller than this are treated as flat
const FLAT_SLOPE: f64 = 1e-12;

// Relative slack on the decreasing-derivative check
const CONCAVITY_TOL: f64 = 1e-9;

/// Which side of the hull is unbounded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HullSide {
    Lower,
    Upper,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ArsError {
    #[error("No initial abscissae were provided")]
    NoAbscissae,
    #[error("Invalid support ({lower}, {upper})")]
    InvalidBounds { lower: f64, upper: f64 },
    #[error("Abscissa {x} is outside of the support ({lower}, {upper})")]
    AbscissaOutOfBounds { x: f64, lower: f64, upper: f64 },
    /// With an infinite bound, the extreme abscissa must have a derivative
    /// pointing back toward the mode.
    #[error(
        "The abscissae do not bracket the mode; the envelope is unbounded on \
        the {side:?} side"
    )]
    UnboundedEnvelope { side: HullSide },
    #[error(
        "The log density is not concave: derivative goes from {d_left} at \
        {x_left} to {d_right} at {x_right}"
    )]
    NotLogConcave {
        x_left: f64,
        x_right: f64,
        d_left: f64,
        d_right: f64,
    },
    #[error("The log density or its derivative is not finite at {x}")]
    NonFiniteDensity { x: f64 },
    #[error("Hit the limit of {n} consecutive rejections")]
    TooManyRejections { n: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct HullPoint {
    x: f64,
    h: f64,
    dh: f64,
}

impl HullPoint {
    #[inline]
    fn tangent(&self, x: f64) -> f64 {
        self.dh.mul_add(x - self.x, self.h)
    }
}

/// The piecewise-exponential upper envelope
#[derive(Clone, Debug)]
struct Envelope {
    /// `z[j]` and `z[j+1]` bound the piece where tangent `j` is the hull
    z: Vec<f64>,
    /// Normalized (not log) cumulative mass of the pieces
    cum_mass: Vec<f64>,
}

/// Adaptive rejection sampler over `(lower, upper)`
///
/// # Example
///
/// ```rust
/// # use iagm_stats::ars::Ars;
/// let mut rng = rand::thread_rng();
///
/// // standard normal
/// let mut ars = Ars::new(
///     |x: f64| -0.5 * x * x,
///     |x: f64| -x,
///     &[-1.0, 1.0],
///     f64::NEG_INFINITY,
///     f64::INFINITY,
/// ).unwrap();
///
/// let xs = ars.draw(10, &mut rng).unwrap();
/// assert_eq!(xs.len(), 10);
/// ```
pub struct Ars<F, Fp>
where
    F: Fn(f64) -> f64,
    Fp: Fn(f64) -> f64,
{
    ln_f: F,
    ln_f_prime: Fp,
    lower: f64,
    upper: f64,
    points: Vec<HullPoint>,
    envelope: Envelope,
}

impl<F, Fp> Ars<F, Fp>
where
    F: Fn(f64) -> f64,
    Fp: Fn(f64) -> f64,
{
    /// Build the sampler from the log density, its derivative, the initial
    /// abscissae and the support.
    ///
    /// # Errors
    ///
    /// Fails if the abscissae are empty or out of bounds, if the log density
    /// is not finite or not concave at the abscissae, or if the abscissae do
    /// not bracket the mode when a bound is infinite.
    pub fn new(
        ln_f: F,
        ln_f_prime: Fp,
        abscissae: &[f64],
        lower: f64,
        upper: f64,
    ) -> Result<Self, ArsError> {
        if abscissae.is_empty() {
            return Err(ArsError::NoAbscissae);
        }

        if lower.is_nan() || upper.is_nan() || lower >= upper {
            return Err(ArsError::InvalidBounds { lower, upper });
        }

        let mut xs: Vec<f64> = abscissae.to_vec();
        xs.sort_by(|a, b| a.total_cmp(b));
        xs.dedup();

        let points = xs
            .iter()
            .map(|&x| {
                if x <= lower || x >= upper || !x.is_finite() {
                    Err(ArsError::AbscissaOutOfBounds { x, lower, upper })
                } else {
                    eval_point(&ln_f, &ln_f_prime, x)
                }
            })
            .collect::<Result<Vec<HullPoint>, ArsError>>()?;

        points
            .windows(2)
            .try_for_each(|pair| check_concave(&pair[0], &pair[1]))?;

        let envelope = build_envelope(&points, lower, upper)?;

        Ok(Ars {
            ln_f,
            ln_f_prime,
            lower,
            upper,
            points,
            envelope,
        })
    }

    /// The current abscissae of the hull, in increasing order
    pub fn abscissae(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    /// Draw `n` samples
    pub fn draw<R: Rng>(
        &mut self,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<f64>, ArsError> {
        let mut samples = Vec::with_capacity(n);
        let mut n_rejections = 0;

        while samples.len() < n {
            let (x, ix) = self.sample_envelope(rng);
            let upper_x = self.points[ix].tangent(x);
            let ln_w = rng.gen::<f64>().ln();

            if ln_w <= self.squeeze(x) - upper_x {
                samples.push(x);
                n_rejections = 0;
                continue;
            }

            let point = eval_point(&self.ln_f, &self.ln_f_prime, x)?;
            if ln_w <= point.h - upper_x {
                samples.push(x);
                n_rejections = 0;
            } else {
                n_rejections += 1;
                if n_rejections >= MAX_REJECTIONS {
                    return Err(ArsError::TooManyRejections { n: n_rejections });
                }
            }

            self.insert(point)?;
        }

        Ok(samples)
    }

    fn insert(&mut self, point: HullPoint) -> Result<(), ArsError> {
        let ix = self.points.partition_point(|p| p.x < point.x);
        if self.points.get(ix).map_or(false, |p| p.x == point.x) {
            return Ok(());
        }

        if ix > 0 {
            check_concave(&self.points[ix - 1], &point)?;
        }
        if let Some(right) = self.points.get(ix) {
            check_concave(&point, right)?;
        }

        self.points.insert(ix, point);
        self.envelope = build_envelope(&self.points, self.lower, self.upper)?;
        trace!("ARS hull grew to {} abscissae", self.points.len());
        Ok(())
    }

    /// Chord between the neighboring abscissae; `-inf` outside of them
    fn squeeze(&self, x: f64) -> f64 {
        let ix = self.points.partition_point(|p| p.x <= x);
        if ix == 0 || ix == self.points.len() {
            return f64::NEG_INFINITY;
        }
        let left = &self.points[ix - 1];
        let right = &self.points[ix];
        let t = (x - left.x) / (right.x - left.x);
        t.mul_add(right.h - left.h, left.h)
    }

    /// Draw from the normalized envelope. Returns the sample and the index of
    /// the tangent that covers it.
    fn sample_envelope<R: Rng>(&self, rng: &mut R) -> (f64, usize) {
        let r: f64 = rng.gen::<f64>();
        let ix = self
            .envelope
            .cum_mass
            .iter()
            .position(|&c| c > r)
            .unwrap_or(self.points.len() - 1);

        let lo = self.envelope.z[ix];
        let hi = self.envelope.z[ix + 1];
        let dh = self.points[ix].dh;
        let v: f64 = rng.gen::<f64>();

        let x = if dh.abs() < FLAT_SLOPE {
            v.mul_add(hi - lo, lo)
        } else if dh < 0.0 {
            // mass is exp(dh * (x - lo)) on [lo, hi]
            let c = -(dh * (hi - lo)).exp_m1();
            lo + (-v * c).ln_1p() / dh
        } else {
            // mass is exp(dh * (x - hi)) on [lo, hi]
            let c = -(-dh * (hi - lo)).exp_m1();
            hi + (-(1.0 - v) * c).ln_1p() / dh
        };

        (x.clamp(lo, hi), ix)
    }
}

fn eval_point<F, Fp>(
    ln_f: &F,
    ln_f_prime: &Fp,
    x: f64,
) -> Result<HullPoint, ArsError>
where
    F: Fn(f64) -> f64,
    Fp: Fn(f64) -> f64,
{
    let h = ln_f(x);
    let dh = ln_f_prime(x);
    if h.is_finite() && dh.is_finite() {
        Ok(HullPoint { x, h, dh })
    } else {
        Err(ArsError::NonFiniteDensity { x })
    }
}

fn check_concave(left: &HullPoint, right: &HullPoint) -> Result<(), ArsError> {
    let slack = CONCAVITY_TOL * left.dh.abs().max(1.0);
    if right.dh > left.dh + slack {
        Err(ArsError::NotLogConcave {
            x_left: left.x,
            x_right: right.x,
            d_left: left.dh,
            d_right: right.dh,
        })
    } else {
        Ok(())
    }
}

/// Where the tangents at `a` and `b` cross, clamped to `[a.x, b.x]`
fn intersect(a: &HullPoint, b: &HullPoint) -> f64 {
    let ddh = a.dh - b.dh;
    if ddh.abs() < FLAT_SLOPE {
        0.5 * (a.x + b.x)
    } else {
        let z = (b.h - a.h - b.x * b.dh + a.x * a.dh) / ddh;
        z.clamp(a.x, b.x)
    }
}

/// Log of the integral of exp(tangent) over `[lo, hi]`
fn ln_piece_mass(p: &HullPoint, lo: f64, hi: f64) -> Result<f64, ArsError> {
    let width = hi - lo;
    if width <= 0.0 {
        return Ok(f64::NEG_INFINITY);
    }

    if p.dh.abs() < FLAT_SLOPE {
        if width.is_infinite() {
            let side = if lo.is_infinite() {
                HullSide::Lower
            } else {
                HullSide::Upper
            };
            return Err(ArsError::UnboundedEnvelope { side });
        }
        Ok(p.h + width.ln())
    } else if p.dh > 0.0 {
        if hi.is_infinite() {
            return Err(ArsError::UnboundedEnvelope {
                side: HullSide::Upper,
            });
        }
        let c = -(-p.dh * width).exp_m1();
        Ok(p.tangent(hi) + c.ln() - p.dh.ln())
    } else {
        if lo.is_infinite() {
            return Err(ArsError::UnboundedEnvelope {
                side: HullSide::Lower,
            });
        }
        let c = -(p.dh * width).exp_m1();
        Ok(p.tangent(lo) + c.ln() - (-p.dh).ln())
    }
}

fn build_envelope(
    points: &[HullPoint],
    lower: f64,
    upper: f64,
) -> Result<Envelope, ArsError> {
    let n = points.len();
    let mut z = Vec::with_capacity(n + 1);
    z.push(lower);
    points
        .windows(2)
        .for_each(|pair| z.push(intersect(&pair[0], &pair[1])));
    z.push(upper);

    let ln_masses = points
        .iter()
        .enumerate()
        .map(|(j, p)| ln_piece_mass(p, z[j], z[j + 1]))
        .collect::<Result<Vec<f64>, ArsError>>()?;

    let max_ln_mass = ln_masses
        .iter()
        .fold(f64::NEG_INFINITY, |acc, &m| acc.max(m));

    let masses: Vec<f64> =
        ln_masses.iter().map(|m| (m - max_ln_mass).exp()).collect();
    let total: f64 = masses.iter().sum();

    let cum_mass = iagm_utils::cumsum(&masses)
        .into_iter()
        .map(|c| c / total)
        .collect();

    Ok(Envelope { z, cum_mass })
}
