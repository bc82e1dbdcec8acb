//! Dutch-book validation: a set of probabilities admits arbitrage
//! ("a Dutch book") whenever it fails to sum to 1.

use crate::error::Error;
use crate::span::Span;

/// Outcome of [`validate`]: either the probabilities are within tolerance of
/// summing to 1, or they are not, carrying the observed sum and margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DutchBookOutcome {
    Ok { sum: f64 },
    Violation { sum: f64, margin: f64 },
}

/// `margin = |Σ probs - 1|`; success iff `margin < tol`.
pub fn validate(probs: &[f64], tol: f64) -> DutchBookOutcome {
    let sum: f64 = probs.iter().sum();
    let margin = (sum - 1.0).abs();
    if margin < tol {
        DutchBookOutcome::Ok { sum }
    } else {
        DutchBookOutcome::Violation { sum, margin }
    }
}

/// Same as [`validate`], but raises the closed `DutchBook.Violation` error
/// at `span` on failure, for call sites that need a `Result`.
pub fn validate_or_err(probs: &[f64], tol: f64, span: Span) -> Result<(), Error> {
    match validate(probs, tol) {
        DutchBookOutcome::Ok { .. } => Ok(()),
        DutchBookOutcome::Violation { sum, margin } => {
            Err(Error::DutchBookViolation { sum, margin, span })
        }
    }
}

/// Normalizes non-negative weights with a positive total into probabilities
/// by dividing by their sum.
pub fn normalize(weights: &[f64]) -> Result<Vec<f64>, Error> {
    if weights.iter().any(|&w| w < 0.0) {
        if let Some(&w) = weights.iter().find(|&&w| w < 0.0) {
            return Err(Error::ProbabilityNegativeWeight {
                weight: w,
                span: Span::dummy(),
            });
        }
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(Error::ProbabilityZeroTotal { span: Span::dummy() });
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

/// `dutch-book-from-odds(odds) = validate(map(1/·, odds))`: decimal odds are
/// converted to implied probabilities before validating.
pub fn dutch_book_from_odds(odds: &[f64], tol: f64) -> DutchBookOutcome {
    let probs: Vec<f64> = odds.iter().map(|&o| 1.0 / o).collect();
    validate(&probs, tol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_sum_validates() {
        assert!(matches!(
            validate(&[0.5, 0.5], 1e-10),
            DutchBookOutcome::Ok { .. }
        ));
    }

    #[test]
    fn off_sum_is_a_violation() {
        assert!(matches!(
            validate(&[0.4, 0.4, 0.3], 1e-10),
            DutchBookOutcome::Violation { .. }
        ));
    }

    #[test]
    fn normalize_rejects_zero_total() {
        assert!(normalize(&[0.0, 0.0]).is_err());
    }

    #[test]
    fn normalize_rejects_negative_weight() {
        assert!(normalize(&[1.0, -1.0]).is_err());
    }

    #[test]
    fn odds_conversion_validates_fair_book() {
        // Fair two-outcome book at even odds: 1/2 + 1/2 = 1.
        assert!(matches!(
            dutch_book_from_odds(&[2.0, 2.0], 1e-10),
            DutchBookOutcome::Ok { .. }
        ));
    }

    proptest! {
        /// Dutch-book closure: `validate(normalize(ws))` is always Ok
        /// for any `ws` with `Σws > 0`.
        #[test]
        fn normalize_then_validate_always_ok(
            ws in proptest::collection::vec(0.0f64..1000.0, 1..8)
                .prop_filter("positive total", |v| v.iter().sum::<f64>() > 1e-9)
        ) {
            let probs = normalize(&ws).unwrap();
            prop_assert!(matches!(validate(&probs, 1e-9), DutchBookOutcome::Ok { .. }));
        }
    }
}
