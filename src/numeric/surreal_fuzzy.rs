//! SurrealFuzzy: (a, b, c, ε), a <= b <= c, ε >= 0. A triangular fuzzy set
//! whose support is relaxed outward by ε, modeling second-order uncertainty
//! about where the set's boundary actually lies.

use crate::prng::PrngState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurrealFuzzy {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub epsilon: f64,
}

impl SurrealFuzzy {
    pub fn new(a: f64, b: f64, c: f64, epsilon: f64) -> Result<Self, String> {
        if !(a <= b && b <= c) {
            return Err(format!(
                "SurrealFuzzy requires a <= b <= c, got ({}, {}, {})",
                a, b, c
            ));
        }
        if epsilon < 0.0 {
            return Err(format!("SurrealFuzzy requires epsilon >= 0, got {}", epsilon));
        }
        Ok(SurrealFuzzy { a, b, c, epsilon })
    }

    fn relaxed_a(&self) -> f64 {
        self.a - self.epsilon
    }

    fn relaxed_c(&self) -> f64 {
        self.c + self.epsilon
    }

    /// Membership computed against the ε-relaxed support.
    pub fn membership(&self, x: f64) -> f64 {
        let (a, c) = (self.relaxed_a(), self.relaxed_c());
        if x <= a || x >= c {
            0.0
        } else if x <= self.b {
            if self.b == a {
                1.0
            } else {
                (x - a) / (self.b - a)
            }
        } else if c == self.b {
            1.0
        } else {
            (c - x) / (c - self.b)
        }
    }

    pub fn and(self, other: SurrealFuzzy) -> SurrealFuzzy {
        SurrealFuzzy {
            a: self.a.min(other.a),
            b: self.b.min(other.b),
            c: self.c.min(other.c),
            epsilon: self.epsilon.max(other.epsilon),
        }
    }

    pub fn or(self, other: SurrealFuzzy) -> SurrealFuzzy {
        SurrealFuzzy {
            a: self.a.max(other.a),
            b: self.b.max(other.b),
            c: self.c.max(other.c),
            epsilon: self.epsilon.max(other.epsilon),
        }
    }

    pub fn sample(&self, prng: PrngState) -> (f64, PrngState) {
        let (u, next) = prng.next_f64();
        (self.relaxed_a() + u * (self.relaxed_c() - self.relaxed_a()), next)
    }
}
