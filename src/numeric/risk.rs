//! Risk: (samples, α), 0 < α < 1. Value-at-risk and conditional
//! value-at-risk over an empirical sample set, the standard order-statistic
//! estimators (no parametric assumption on the underlying distribution).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub samples: Vec<f64>,
    pub alpha: f64,
}

impl Risk {
    pub fn new(samples: Vec<f64>, alpha: f64) -> Result<Self, String> {
        if samples.is_empty() {
            return Err("Risk requires at least one sample".to_string());
        }
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(format!("Risk requires 0 < alpha < 1, got {}", alpha));
        }
        Ok(Risk { samples, alpha })
    }

    fn sorted(&self) -> Vec<f64> {
        let mut s = self.samples.clone();
        s.sort_by(|a, b| a.partial_cmp(b).unwrap());
        s
    }

    /// The ⌊(1-α)·n⌋-th order statistic of the sorted samples.
    pub fn value_at_risk(&self) -> f64 {
        let sorted = self.sorted();
        let n = sorted.len();
        let idx = (((1.0 - self.alpha) * n as f64).floor() as usize).min(n - 1);
        sorted[idx]
    }

    /// Mean of all samples at or below the VaR threshold.
    pub fn conditional_value_at_risk(&self) -> f64 {
        let var = self.value_at_risk();
        let tail: Vec<f64> = self.samples.iter().cloned().filter(|&v| v <= var).collect();
        if tail.is_empty() {
            var
        } else {
            tail.iter().sum::<f64>() / tail.len() as f64
        }
    }

    /// Sampling a risk profile returns a uniformly chosen observed sample
    /// rather than drawing from a fitted distribution.
    pub fn sample(&self, prng: crate::prng::PrngState) -> (f64, crate::prng::PrngState) {
        let (idx, next) = prng.next_below(self.samples.len() as u64);
        (self.samples[idx as usize], next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_samples_and_bad_alpha() {
        assert!(Risk::new(vec![], 0.05).is_err());
        assert!(Risk::new(vec![1.0], 1.5).is_err());
    }

    #[test]
    fn var_is_an_order_statistic() {
        let r = Risk::new(vec![10.0, 1.0, 5.0, 3.0, 8.0], 0.2).unwrap();
        assert_eq!(r.value_at_risk(), 1.0);
    }

    #[test]
    fn cvar_is_mean_of_tail_at_or_below_var() {
        let r = Risk::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], 0.6).unwrap();
        let var = r.value_at_risk();
        let cvar = r.conditional_value_at_risk();
        assert!(cvar <= var);
    }
}
