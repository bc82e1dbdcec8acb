//! SurrealAdv: (L-set, R-set), the full Conway `{L | R}` construction.
//!
//! Recursion is bounded by a configurable depth (default 10, per the design
//! notes) wherever a real-number approximation is requested; the `<=`
//! ordering itself terminates unconditionally because every value is a
//! finite tree (enforced at construction).

use serde::{Deserialize, Serialize};

pub const DEFAULT_DEPTH: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurrealAdv {
    pub left: Vec<SurrealAdv>,
    pub right: Vec<SurrealAdv>,
}

impl SurrealAdv {
    /// Validates the defining invariant: every `l` in `left` is `< `every
    /// `r` in `right` under the recursive surreal order.
    pub fn new(left: Vec<SurrealAdv>, right: Vec<SurrealAdv>) -> Result<Self, String> {
        for l in &left {
            for r in &right {
                if !l.lt(r) {
                    return Err(
                        "SurrealAdv requires every left element to be strictly less than every right element"
                            .to_string(),
                    );
                }
            }
        }
        Ok(SurrealAdv { left, right })
    }

    /// The number `0 = {| }`.
    pub fn zero() -> SurrealAdv {
        SurrealAdv {
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    /// `x <= y` iff no `x_R <= y` and no `x <= y_L` (Conway's definition).
    pub fn le(&self, other: &SurrealAdv) -> bool {
        let no_xr_le_y = !self.right.iter().any(|xr| xr.le(other));
        let no_x_le_yl = !other.left.iter().any(|yl| self.le(yl));
        no_xr_le_y && no_x_le_yl
    }

    /// `x < y` iff `x <= y` and not `y <= x`.
    pub fn lt(&self, other: &SurrealAdv) -> bool {
        self.le(other) && !other.le(self)
    }

    pub fn eq_surreal(&self, other: &SurrealAdv) -> bool {
        self.le(other) && other.le(self)
    }

    /// Conway addition: `x + y = { x^L + y, x + y^L | x^R + y, x + y^R }`.
    pub fn add(&self, other: &SurrealAdv) -> SurrealAdv {
        let mut left = Vec::new();
        for xl in &self.left {
            left.push(xl.add(other));
        }
        for yl in &other.left {
            left.push(self.add(yl));
        }
        let mut right = Vec::new();
        for xr in &self.right {
            right.push(xr.add(other));
        }
        for yr in &other.right {
            right.push(self.add(yr));
        }
        SurrealAdv { left, right }
    }

    pub fn default_depth(&self) -> u32 {
        DEFAULT_DEPTH
    }

    /// Depth-limited midpoint approximation converging on dyadic rationals;
    /// an approximation of the birthday-induction real value, not an exact
    /// surreal-to-real embedding (see design notes).
    pub fn to_real(&self, depth: u32) -> f64 {
        if depth == 0 {
            return 0.0;
        }
        let max_left = self
            .left
            .iter()
            .map(|l| l.to_real(depth - 1))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
        let min_right = self
            .right
            .iter()
            .map(|r| r.to_real(depth - 1))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))));
        match (max_left, min_right) {
            (None, None) => 0.0,
            (Some(maxl), None) => maxl.floor() + 1.0,
            (None, Some(minr)) => minr.ceil() - 1.0,
            (Some(maxl), Some(minr)) => (maxl + minr) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_has_empty_sides() {
        let z = SurrealAdv::zero();
        assert_eq!(z.to_real(DEFAULT_DEPTH), 0.0);
    }

    #[test]
    fn rejects_out_of_order_construction() {
        let zero = SurrealAdv::zero();
        // {0 | 0} violates 0 < 0.
        assert!(SurrealAdv::new(vec![zero.clone()], vec![zero]).is_err());
    }

    #[test]
    fn one_is_greater_than_zero() {
        let zero = SurrealAdv::zero();
        let one = SurrealAdv::new(vec![zero.clone()], vec![]).unwrap();
        assert!(zero.lt(&one));
        assert!((one.to_real(DEFAULT_DEPTH) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn one_half_sits_between_zero_and_one() {
        let zero = SurrealAdv::zero();
        let one = SurrealAdv::new(vec![zero.clone()], vec![]).unwrap();
        let half = SurrealAdv::new(vec![zero.clone()], vec![one.clone()]).unwrap();
        assert!(zero.lt(&half));
        assert!(half.lt(&one));
        let v = half.to_real(DEFAULT_DEPTH);
        assert!(v > 0.0 && v < 1.0);
    }

    #[test]
    fn add_combines_values_approximately() {
        let zero = SurrealAdv::zero();
        let one = SurrealAdv::new(vec![zero.clone()], vec![]).unwrap();
        let two = one.add(&one);
        assert!((two.to_real(DEFAULT_DEPTH) - 2.0).abs() < 1e-6);
    }
}
