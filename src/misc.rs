use special::Gamma;

/// ln Γ(x)
#[inline]
pub fn ln_gamma(x: f64) -> f64 {
    Gamma::ln_gamma(x).0
}

/// ψ(x), the derivative of ln Γ(x)
#[inline]
pub fn digamma(x: f64) -> f64 {
    Gamma::digamma(x)
}
