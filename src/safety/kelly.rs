//! Kelly criterion: the bet fraction maximizing long-run logarithmic wealth
//! growth, and the configurable-fraction stake-sizing built on it.

use crate::error::Error;
use crate::span::Span;

/// Configuration for stake sizing: the fraction of full Kelly actually
/// staked (default ¼, "fractional Kelly") and the hard cap on risk per bet
/// as a fraction of bankroll (default 0.05), independent of what Kelly says.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KellyConfig {
    pub fraction: f64,
    pub max_risk: f64,
}

impl Default for KellyConfig {
    fn default() -> Self {
        KellyConfig {
            fraction: 0.25,
            max_risk: 0.05,
        }
    }
}

/// `kelly(p, b) = max(0, (p*b - (1-p)) / b)` for win probability `p` and net
/// odds `b` (profit per unit staked on a win).
pub fn kelly_fraction(p: f64, b: f64) -> f64 {
    if b <= 0.0 {
        return 0.0;
    }
    ((p * b - (1.0 - p)) / b).max(0.0)
}

/// `fraction * bankroll * kelly(p, b)`.
pub fn optimal_stake(bankroll: f64, p: f64, b: f64, fraction: f64) -> f64 {
    fraction * bankroll * kelly_fraction(p, b)
}

/// A stake is safe iff `stake/bankroll <= config.fraction * kelly(p, b)` and
/// `stake/bankroll <= config.max_risk`.
pub fn stake_is_safe(stake: f64, bankroll: f64, p: f64, b: f64, config: &KellyConfig) -> bool {
    if bankroll <= 0.0 {
        return false;
    }
    let risk_fraction = stake / bankroll;
    let kelly_bound = config.fraction * kelly_fraction(p, b);
    risk_fraction <= kelly_bound && risk_fraction <= config.max_risk
}

/// Raises `Risk.KellyExceeded` or `Risk.StakeUnsafe` when [`stake_is_safe`]
/// fails, distinguishing which bound was the binding one.
pub fn stake_is_safe_or_err(
    stake: f64,
    bankroll: f64,
    p: f64,
    b: f64,
    config: &KellyConfig,
    span: Span,
) -> Result<(), Error> {
    if bankroll <= 0.0 {
        return Err(Error::RiskStakeUnsafe {
            stake,
            bankroll,
            span,
        });
    }
    let risk_fraction = stake / bankroll;
    let kelly_bound = config.fraction * kelly_fraction(p, b);
    if risk_fraction > kelly_bound {
        return Err(Error::RiskKellyExceeded {
            fraction: risk_fraction,
            kelly_bound,
            span,
        });
    }
    if risk_fraction > config.max_risk {
        return Err(Error::RiskStakeUnsafe {
            stake,
            bankroll,
            span,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn kelly_fraction_matches_a_known_edge_and_odds_pair() {
        // kelly(0.55, 2.0) ~= 0.325
        assert!((kelly_fraction(0.55, 2.0) - 0.325).abs() < 1e-9);
    }

    #[test]
    fn optimal_stake_matches_a_known_bankroll_and_fraction() {
        // optimal-stake(10000, 0.55, 2.0, 0.25) ~= 812.5
        let stake = optimal_stake(10000.0, 0.55, 2.0, 0.25);
        assert!((stake - 812.5).abs() < 1e-6);
    }

    #[test]
    fn kelly_is_zero_when_edge_is_nonpositive() {
        // p*b <= 1-p means no edge.
        assert_eq!(kelly_fraction(0.4, 1.0), 0.0);
    }

    proptest! {
        /// Kelly non-negativity: `kelly(p, b) >= 0` for any `(p, b)`.
        #[test]
        fn kelly_is_never_negative(p in 0.0f64..=1.0, b in 0.01f64..20.0) {
            prop_assert!(kelly_fraction(p, b) >= 0.0);
        }

        #[test]
        fn kelly_zero_iff_no_edge(p in 0.0f64..=1.0, b in 0.01f64..20.0) {
            let k = kelly_fraction(p, b);
            let has_edge = p * b > 1.0 - p;
            prop_assert_eq!(k > 0.0, has_edge);
        }
    }
}
