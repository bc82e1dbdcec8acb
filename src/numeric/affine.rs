//! Affine: (lo, hi), lo <= hi. Interval arithmetic over the reals.

use crate::prng::PrngState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub lo: f64,
    pub hi: f64,
}

impl Affine {
    pub fn new(lo: f64, hi: f64) -> Result<Self, String> {
        if lo > hi {
            return Err(format!("Affine requires lo <= hi, got ({}, {})", lo, hi));
        }
        Ok(Affine { lo, hi })
    }

    pub fn add(self, other: Affine) -> Affine {
        Affine {
            lo: self.lo + other.lo,
            hi: self.hi + other.hi,
        }
    }

    /// Widest bound over the four corner products.
    pub fn mul(self, other: Affine) -> Affine {
        let corners = [
            self.lo * other.lo,
            self.lo * other.hi,
            self.hi * other.lo,
            self.hi * other.hi,
        ];
        let lo = corners.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = corners.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Affine { lo, hi }
    }

    pub fn contains(&self, v: f64) -> bool {
        self.lo <= v && v <= self.hi
    }

    /// Uniform draw over [lo, hi]; a bound with no inherent distribution
    /// still needs *some* sampler to participate in `sample`/`bet` forms.
    pub fn sample(&self, prng: PrngState) -> (f64, PrngState) {
        let (u, next) = prng.next_f64();
        (self.lo + u * (self.hi - self.lo), next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_lo_greater_than_hi() {
        assert!(Affine::new(2.0, 1.0).is_err());
    }

    #[test]
    fn add_is_componentwise() {
        let a = Affine::new(1.0, 2.0).unwrap();
        let b = Affine::new(3.0, 5.0).unwrap();
        let c = a.add(b);
        assert_eq!(c.lo, 4.0);
        assert_eq!(c.hi, 7.0);
    }

    #[test]
    fn mul_spans_all_four_corners() {
        let a = Affine::new(-1.0, 2.0).unwrap();
        let b = Affine::new(-3.0, 1.0).unwrap();
        let c = a.mul(b);
        assert_eq!(c.lo, -6.0);
        assert_eq!(c.hi, 3.0);
    }

    #[test]
    fn sample_stays_within_bounds() {
        let a = Affine::new(2.0, 4.0).unwrap();
        let mut prng = PrngState::seed(7);
        for _ in 0..50 {
            let (v, next) = a.sample(prng);
            assert!(a.contains(v));
            prng = next;
        }
    }
}
