//! Hyperreal: (finite, infinitesimal). An extension of the reals with an
//! infinitesimal component ε such that ε² ≈ 0 — `mul` therefore drops the
//! ε² cross-term rather than tracking it.

use crate::prng::PrngState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperreal {
    pub finite: f64,
    pub infinitesimal: f64,
}

impl Hyperreal {
    pub fn new(finite: f64, infinitesimal: f64) -> Result<Self, String> {
        Ok(Hyperreal {
            finite,
            infinitesimal,
        })
    }

    pub fn add(self, other: Hyperreal) -> Hyperreal {
        Hyperreal {
            finite: self.finite + other.finite,
            infinitesimal: self.infinitesimal + other.infinitesimal,
        }
    }

    /// `(a + bε)(c + dε) = ac + (ad + bc)ε + bdε²`; the ε² term is dropped.
    pub fn mul(self, other: Hyperreal) -> Hyperreal {
        Hyperreal {
            finite: self.finite * other.finite,
            infinitesimal: self.finite * other.infinitesimal + other.finite * self.infinitesimal,
        }
    }

    /// The standard part: the finite real the hyperreal is infinitely close to.
    pub fn standard_part(&self) -> f64 {
        self.finite
    }

    /// Sampling a hyperreal collapses it to its standard part plus a
    /// vanishingly small jitter scaled by the infinitesimal component, since
    /// there is no meaningful probability measure over non-standard reals.
    pub fn sample(&self, prng: PrngState) -> (f64, PrngState) {
        let (u, next) = prng.next_f64();
        (self.finite + self.infinitesimal * (u - 0.5) * 1e-9, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_componentwise() {
        let a = Hyperreal::new(1.0, 2.0).unwrap();
        let b = Hyperreal::new(3.0, 4.0).unwrap();
        let c = a.add(b);
        assert_eq!(c.finite, 4.0);
        assert_eq!(c.infinitesimal, 6.0);
    }

    #[test]
    fn mul_drops_epsilon_squared_term() {
        let a = Hyperreal::new(2.0, 3.0).unwrap();
        let b = Hyperreal::new(5.0, 7.0).unwrap();
        let c = a.mul(b);
        assert_eq!(c.finite, 10.0);
        assert_eq!(c.infinitesimal, 2.0 * 7.0 + 5.0 * 3.0);
    }

    #[test]
    fn standard_part_returns_finite_component() {
        let a = Hyperreal::new(4.5, 99.0).unwrap();
        assert_eq!(a.standard_part(), 4.5);
    }

    #[test]
    fn sample_stays_close_to_standard_part() {
        let a = Hyperreal::new(10.0, 1.0).unwrap();
        let (v, _) = a.sample(PrngState::seed(1));
        assert!((v - 10.0).abs() < 1e-6);
    }
}
