//! Bayesian: (prior, likelihood, evidence, posterior), all in [0, 1].
//! `posterior = likelihood * prior / evidence`, clamped to [0, 1] to absorb
//! floating-point drift at the boundary.

use crate::prng::PrngState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bayesian {
    pub prior: f64,
    pub likelihood: f64,
    pub evidence: f64,
    pub posterior: f64,
}

impl Bayesian {
    pub fn new(prior: f64, likelihood: f64, evidence: f64) -> Result<Self, String> {
        for (name, v) in [("prior", prior), ("likelihood", likelihood), ("evidence", evidence)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(format!("Bayesian requires {} in [0, 1], got {}", name, v));
            }
        }
        if evidence == 0.0 {
            return Err("Bayesian requires evidence > 0".to_string());
        }
        let posterior = (likelihood * prior / evidence).clamp(0.0, 1.0);
        Ok(Bayesian {
            prior,
            likelihood,
            evidence,
            posterior,
        })
    }

    /// Bernoulli draw at the posterior probability.
    pub fn sample(&self, prng: PrngState) -> (f64, PrngState) {
        let (u, next) = prng.next_f64();
        (if u < self.posterior { 1.0 } else { 0.0 }, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_inputs() {
        assert!(Bayesian::new(1.5, 0.5, 0.5).is_err());
        assert!(Bayesian::new(0.5, 0.5, 0.0).is_err());
    }

    #[test]
    fn posterior_matches_bayes_rule() {
        let b = Bayesian::new(0.2, 0.8, 0.4).unwrap();
        assert!((b.posterior - 0.4).abs() < 1e-12);
    }

    #[test]
    fn posterior_is_clamped() {
        let b = Bayesian::new(0.9, 0.9, 0.2).unwrap();
        assert!(b.posterior <= 1.0);
    }
}
