//! DistNormal: (μ, σ), σ ≥ 0.

use crate::prng::PrngState;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistNormal {
    pub mu: f64,
    pub sigma: f64,
}

impl DistNormal {
    pub fn new(mu: f64, sigma: f64) -> Result<Self, String> {
        if sigma < 0.0 {
            return Err(format!("DistNormal requires sigma >= 0, got {}", sigma));
        }
        Ok(DistNormal { mu, sigma })
    }

    /// Sums means and variances (independence assumed).
    pub fn add(self, other: DistNormal) -> DistNormal {
        DistNormal {
            mu: self.mu + other.mu,
            sigma: (self.sigma.powi(2) + other.sigma.powi(2)).sqrt(),
        }
    }

    /// `E[XY] = μ1μ2`; `Var ≈ μ1²σ2² + μ2²σ1² + σ1²σ2²` (independence).
    pub fn mul(self, other: DistNormal) -> DistNormal {
        let mu = self.mu * other.mu;
        let var = self.mu.powi(2) * other.sigma.powi(2)
            + other.mu.powi(2) * self.sigma.powi(2)
            + self.sigma.powi(2) * other.sigma.powi(2);
        DistNormal {
            mu,
            sigma: var.max(0.0).sqrt(),
        }
    }

    /// Box-Muller transform.
    pub fn sample(&self, prng: PrngState) -> (f64, PrngState) {
        let (u1, next1) = prng.next_f64();
        let (u2, next2) = next1.next_f64();
        let u1 = u1.max(f64::MIN_POSITIVE);
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        (self.mu + self.sigma * z, next2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_sigma() {
        assert!(DistNormal::new(0.0, -1.0).is_err());
    }

    #[test]
    fn add_sums_mean_and_variance() {
        let a = DistNormal::new(1.0, 2.0).unwrap();
        let b = DistNormal::new(3.0, 4.0).unwrap();
        let c = a.add(b);
        assert_eq!(c.mu, 4.0);
        assert!((c.sigma.powi(2) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn sampling_advances_prng_state() {
        let d = DistNormal::new(0.0, 1.0).unwrap();
        let (_v, next) = d.sample(PrngState::seed(1));
        assert_ne!(next, PrngState::seed(1));
    }
}
