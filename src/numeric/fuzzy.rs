//! FuzzyTriangular: (a, b, c), a <= b <= c. Triangular membership function
//! with peak at `b`, standard fuzzy-logic min/max connectives.

use crate::prng::PrngState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuzzyTriangular {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl FuzzyTriangular {
    pub fn new(a: f64, b: f64, c: f64) -> Result<Self, String> {
        if !(a <= b && b <= c) {
            return Err(format!(
                "FuzzyTriangular requires a <= b <= c, got ({}, {}, {})",
                a, b, c
            ));
        }
        Ok(FuzzyTriangular { a, b, c })
    }

    /// Degree of membership of `x`, in [0, 1].
    pub fn membership(&self, x: f64) -> f64 {
        if x <= self.a || x >= self.c {
            0.0
        } else if x <= self.b {
            if self.b == self.a {
                1.0
            } else {
                (x - self.a) / (self.b - self.a)
            }
        } else if self.c == self.b {
            1.0
        } else {
            (self.c - x) / (self.c - self.b)
        }
    }

    pub fn and(self, other: FuzzyTriangular) -> FuzzyTriangular {
        FuzzyTriangular {
            a: self.a.min(other.a),
            b: self.b.min(other.b),
            c: self.c.min(other.c),
        }
    }

    pub fn or(self, other: FuzzyTriangular) -> FuzzyTriangular {
        FuzzyTriangular {
            a: self.a.max(other.a),
            b: self.b.max(other.b),
            c: self.c.max(other.c),
        }
    }

    /// Sample the peak: the value with membership 1. Sampling a fuzzy set
    /// draws a crisp representative rather than a probability mass.
    pub fn sample(&self, prng: PrngState) -> (f64, PrngState) {
        let (u, next) = prng.next_f64();
        (self.a + u * (self.c - self.a), next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_order_parameters() {
        assert!(FuzzyTriangular::new(2.0, 1.0, 3.0).is_err());
    }

    #[test]
    fn peak_has_full_membership() {
        let f = FuzzyTriangular::new(0.0, 5.0, 10.0).unwrap();
        assert!((f.membership(5.0) - 1.0).abs() < 1e-12);
        assert_eq!(f.membership(-1.0), 0.0);
        assert_eq!(f.membership(11.0), 0.0);
    }

    #[test]
    fn and_is_pointwise_min() {
        let f1 = FuzzyTriangular::new(0.0, 5.0, 10.0).unwrap();
        let f2 = FuzzyTriangular::new(1.0, 4.0, 9.0).unwrap();
        let f3 = f1.and(f2);
        assert_eq!(f3.a, 0.0);
        assert_eq!(f3.b, 4.0);
        assert_eq!(f3.c, 9.0);
    }
}
