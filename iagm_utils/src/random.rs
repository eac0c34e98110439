use rand::Rng;

use crate::misc::cumsum;

/// Draw an index from the categorical distribution implied by the
/// un-normalized, non-negative `weights` by linear-scan CDF inversion.
///
/// Returns `None` when no index can be selected, which happens when every
/// weight is zero or the total mass is not a finite positive number.
///
/// # Example
///
/// ```rust
/// # use iagm_utils::pflip_linear;
/// let mut rng = rand::thread_rng();
/// assert_eq!(pflip_linear(&[0.0, 3.0, 0.0], &mut rng), Some(1));
/// assert_eq!(pflip_linear(&[0.0, 0.0], &mut rng), None);
/// ```
pub fn pflip_linear<R: Rng>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let cws = cumsum(weights);
    let total = *cws.last()?;
    let r: f64 = rng.gen::<f64>() * total;
    cws.iter().position(|&c| c - r > 0.0)
}

/// Like `pflip_linear`, but falls back to choosing uniformly from
/// `{0, ..., weights.len() - 1}` when the weights are degenerate.
///
/// The flag is `true` when the fallback was taken.
///
/// # Panics
///
/// Panics if `weights` is empty
pub fn pflip_or_uniform<R: Rng>(weights: &[f64], rng: &mut R) -> (usize, bool) {
    assert!(!weights.is_empty(), "Cannot choose from zero categories");
    match pflip_linear(weights, rng) {
        Some(ix) => (ix, false),
        None => (rng.gen_range(0..weights.len()), true),
    }
}
