//! Imprecise: (lo, hi), 0 <= lo <= hi <= 1. An imprecise (interval-valued)
//! probability: the true probability is only known to lie somewhere in
//! `[lo, hi]`.

use crate::prng::PrngState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Imprecise {
    pub lo: f64,
    pub hi: f64,
}

impl Imprecise {
    pub fn new(lo: f64, hi: f64) -> Result<Self, String> {
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
            return Err(format!(
                "Imprecise requires 0 <= lo <= hi <= 1, got ({}, {})",
                lo, hi
            ));
        }
        Ok(Imprecise { lo, hi })
    }

    /// `not(p) = 1 - p`, applied to both endpoints and flipped.
    pub fn complement(self) -> Imprecise {
        Imprecise {
            lo: 1.0 - self.hi,
            hi: 1.0 - self.lo,
        }
    }

    /// Conjunction under an independence assumption: the endpoint product.
    pub fn and(self, other: Imprecise) -> Imprecise {
        Imprecise {
            lo: self.lo * other.lo,
            hi: self.hi * other.hi,
        }
    }

    /// Disjunction under independence: `P(A) + P(B) - P(A)P(B)`, applied
    /// endpoint-wise.
    pub fn or(self, other: Imprecise) -> Imprecise {
        Imprecise {
            lo: self.lo + other.lo - self.lo * other.lo,
            hi: self.hi + other.hi - self.hi * other.hi,
        }
    }

    /// Applies Bayes' rule separately to each endpoint: `posterior =
    /// likelihood * prior / evidence`, clamped to `[0, 1]`.
    pub fn bayesian_update(self, likelihood: f64, evidence: f64) -> Result<Imprecise, String> {
        if evidence <= 0.0 {
            return Err("Imprecise Bayesian update requires evidence > 0".to_string());
        }
        let lo = (likelihood * self.lo / evidence).clamp(0.0, 1.0);
        let hi = (likelihood * self.hi / evidence).clamp(0.0, 1.0);
        Imprecise::new(lo.min(hi), lo.max(hi))
    }

    pub fn contains(&self, p: f64) -> bool {
        self.lo <= p && p <= self.hi
    }

    /// Sampling draws a Bernoulli outcome using a uniform pick of the true
    /// probability within `[lo, hi]`.
    pub fn sample(&self, prng: PrngState) -> (f64, PrngState) {
        let (u, next1) = prng.next_f64();
        let p = self.lo + u * (self.hi - self.lo);
        let (v, next2) = next1.next_f64();
        (if v < p { 1.0 } else { 0.0 }, next2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_order_or_out_of_range() {
        assert!(Imprecise::new(0.6, 0.4).is_err());
        assert!(Imprecise::new(-0.1, 0.5).is_err());
        assert!(Imprecise::new(0.1, 1.5).is_err());
    }

    #[test]
    fn complement_flips_and_subtracts_from_one() {
        let i = Imprecise::new(0.2, 0.6).unwrap();
        let c = i.complement();
        assert!((c.lo - 0.4).abs() < 1e-12);
        assert!((c.hi - 0.8).abs() < 1e-12);
    }

    #[test]
    fn and_uses_independence_product() {
        let a = Imprecise::new(0.4, 0.6).unwrap();
        let b = Imprecise::new(0.5, 0.5).unwrap();
        let c = a.and(b);
        assert!((c.lo - 0.2).abs() < 1e-12);
        assert!((c.hi - 0.3).abs() < 1e-12);
    }

    #[test]
    fn bayesian_update_applies_bayes_rule_per_endpoint() {
        let i = Imprecise::new(0.2, 0.5).unwrap();
        let updated = i.bayesian_update(0.8, 0.4).unwrap();
        assert!((updated.lo - 0.4).abs() < 1e-12);
        assert!((updated.hi - 1.0).abs() < 1e-12);
    }
}
