use std::ops::AddAssign;

/// Cumulative sum of `xs`
///
/// # Example
///
/// ```rust
/// # use iagm_utils::cumsum;
/// let xs: Vec<f64> = vec![1.0, 0.0, 2.5];
///
/// assert_eq!(cumsum(&xs), vec![1.0, 1.0, 3.5]);
/// ```
#[inline]
pub fn cumsum<T>(xs: &[T]) -> Vec<T>
where
    T: AddAssign + Clone,
{
    let mut summed: Vec<T> = xs.to_vec();
    for i in 1..xs.len() {
        let l = summed[i - 1].clone();
        summed[i] += l;
    }
    summed
}

/// Mean of the entries of `xs`. Returns NaN for an empty slice.
pub fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population variance of the entries of `xs`
pub fn var(xs: &[f64]) -> f64 {
    let m = mean(xs);
    xs.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64
}
