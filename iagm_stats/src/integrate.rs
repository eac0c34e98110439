use rand::Rng;

/// Monte Carlo estimate of a vector-valued expectation
///
/// # Arguments
///
/// - eval: draws one sample (e.g. from a prior) and returns the integrand
///   evaluated at it. Every call must return a vector of length `n_out`.
/// - n_out: length of the integrand
/// - n_iters: the number of samples to average. Must be positive.
/// - rng: A random number generator
///
/// # Errors
///
/// Whatever `eval` returns.
pub fn mc_mean<F, R, E>(
    mut eval: F,
    n_out: usize,
    n_iters: usize,
    rng: &mut R,
) -> Result<Vec<f64>, E>
where
    F: FnMut(&mut R) -> Result<Vec<f64>, E>,
    R: Rng,
{
    let mut acc = vec![0.0; n_out];
    for _ in 0..n_iters {
        let ys = eval(rng)?;
        debug_assert_eq!(ys.len(), n_out);
        acc.iter_mut().zip(ys.iter()).for_each(|(a, y)| *a += y);
    }

    let nf = n_iters as f64;
    acc.iter_mut().for_each(|a| *a /= nf);
    Ok(acc)
}
