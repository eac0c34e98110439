use iagm_consts::{INTEGRAL_N_DRAWS, MH_N_ITERS, MH_PROPOSAL_SCALE};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// How the prior ratio in the MH acceptance probability is computed
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PriorRatio {
    /// The ratio of two independent draws from the prior at the current
    /// hyperparameters.
    MonteCarlo,
    /// The prior density at the candidate over the prior density at the
    /// current value.
    ClosedForm,
}

impl Default for PriorRatio {
    fn default() -> Self {
        PriorRatio::MonteCarlo
    }
}

/// Configuration for the Metropolis-Hastings parameter samplers
///
/// Sets the number of proposals, the random-walk scale, and the prior ratio.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MhConfig {
    /// Number of proposals per update. Skipped proposals count.
    #[serde(default = "default_n_iters")]
    pub n_iters: usize,
    /// Standard deviation of the Gaussian random walk
    #[serde(default = "default_proposal_scale")]
    pub proposal_scale: f64,
    #[serde(default)]
    pub prior_ratio: PriorRatio,
}

fn default_n_iters() -> usize {
    MH_N_ITERS
}

fn default_proposal_scale() -> f64 {
    MH_PROPOSAL_SCALE
}

impl MhConfig {
    pub fn new() -> Self {
        MhConfig {
            n_iters: MH_N_ITERS,
            proposal_scale: MH_PROPOSAL_SCALE,
            prior_ratio: PriorRatio::MonteCarlo,
        }
    }

    pub fn n_iters(mut self, n_iters: usize) -> Self {
        self.n_iters = n_iters;
        self
    }

    pub fn proposal_scale(mut self, proposal_scale: f64) -> Self {
        self.proposal_scale = proposal_scale;
        self
    }

    pub fn prior_ratio(mut self, prior_ratio: PriorRatio) -> Self {
        self.prior_ratio = prior_ratio;
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.proposal_scale > 0.0 && self.proposal_scale.is_finite() {
            Ok(())
        } else {
            Err(ModelError::NonPositiveParameter {
                name: "proposal_scale",
                value: self.proposal_scale,
            })
        }
    }
}

impl Default for MhConfig {
    fn default() -> Self {
        MhConfig::new()
    }
}

/// Configuration for the Monte Carlo marginal-likelihood estimate
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IntegralConfig {
    /// Number of prior draws to average over
    pub n_draws: usize,
}

impl IntegralConfig {
    pub fn new() -> Self {
        IntegralConfig {
            n_draws: INTEGRAL_N_DRAWS,
        }
    }

    pub fn n_draws(mut self, n_draws: usize) -> Self {
        self.n_draws = n_draws;
        self
    }
}

impl Default for IntegralConfig {
    fn default() -> Self {
        IntegralConfig::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn default_mh_config() {
        let config = MhConfig::default();
        assert_eq!(config.n_iters, 750);
        assert_eq!(config.proposal_scale, 0.75);
        assert_eq!(config.prior_ratio, PriorRatio::MonteCarlo);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn mh_config_from_partial_yaml() {
        let yaml = indoc! {"
            n_iters: 100
            prior_ratio: closed_form
        "};
        let config: MhConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config,
            MhConfig::new()
                .n_iters(100)
                .prior_ratio(PriorRatio::ClosedForm)
        );
    }

    #[test]
    fn mh_config_rejects_unknown_fields() {
        let res: Result<MhConfig, _> = serde_yaml::from_str("n_itters: 3");
        assert!(res.is_err());
    }

    #[test]
    fn mh_config_yaml_round_trip() {
        let config = MhConfig::new().proposal_scale(0.2);
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: MhConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn bad_proposal_scale_fails_validation() {
        assert!(MhConfig::new().proposal_scale(0.0).validate().is_err());
        assert!(MhConfig::new().proposal_scale(f64::NAN).validate().is_err());
    }

    #[test]
    fn integral_config_defaults_to_twenty_draws() {
        assert_eq!(IntegralConfig::default().n_draws, 20);
        assert_eq!(IntegralConfig::new().n_draws(1).n_draws, 1);
    }
}
