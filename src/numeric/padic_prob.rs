//! pAdicProb: (base, digits), base >= 2, 0 <= digit < base for every digit.
//! A probabilistic p-adic expansion: `to_real` sums the digits as a base-
//! weighted fraction, `refine` extends the expansion with one more digit of
//! precision.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PAdicProb {
    pub base: u32,
    pub digits: Vec<u32>,
}

impl PAdicProb {
    pub fn new(base: u32, digits: Vec<u32>) -> Result<Self, String> {
        if base < 2 {
            return Err(format!("pAdicProb requires base >= 2, got {}", base));
        }
        if let Some(&bad) = digits.iter().find(|&&d| d >= base) {
            return Err(format!(
                "pAdicProb digit {} out of range for base {}",
                bad, base
            ));
        }
        Ok(PAdicProb { base, digits })
    }

    /// Σ dᵢ · base⁻⁽ⁱ⁺¹⁾, the digits read as a fractional expansion.
    pub fn to_real(&self) -> f64 {
        let base = self.base as f64;
        self.digits
            .iter()
            .enumerate()
            .map(|(i, &d)| d as f64 / base.powi(i as i32 + 1))
            .sum()
    }

    /// Deterministic expansion: refinement appends the given next digit.
    pub fn refine(&self, next_digit: u32) -> Result<PAdicProb, String> {
        if next_digit >= self.base {
            return Err(format!(
                "pAdicProb digit {} out of range for base {}",
                next_digit, self.base
            ));
        }
        let mut digits = self.digits.clone();
        digits.push(next_digit);
        Ok(PAdicProb {
            base: self.base,
            digits,
        })
    }
}
