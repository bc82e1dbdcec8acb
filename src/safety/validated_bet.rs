//! The composite safety pipeline the evaluator calls for `bet/validated`:
//! Dutch-book check, then Kelly/risk check, then cool-off gating, then the
//! draw itself. Each stage fails fast with the specific error kind for the
//! first violated precondition; only the final draw consumes PRNG state.

use super::cooloff::{CoolOffConfig, CoolOffState};
use super::dutch_book;
use super::kelly::{self, KellyConfig};
use crate::error::Error;
use crate::prng::PrngState;
use crate::span::Span;

/// Parameters for a single validated bet: the outcome weights (Dutch-book
/// checked after normalizing), the stake and bankroll (Kelly/risk checked),
/// and the edge `(p, b)` the stake is sized against.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedBetParams<'a> {
    pub weights: &'a [f64],
    pub tolerance: f64,
    pub stake: f64,
    pub bankroll: f64,
    pub p: f64,
    pub b: f64,
}

/// Runs the full pipeline and, on success, draws a categorical outcome index
/// weighted by the (now-validated) normalized probabilities.
pub fn validated_bet(
    params: ValidatedBetParams,
    kelly_config: &KellyConfig,
    cooloff: &mut CoolOffState,
    cooloff_config: &CoolOffConfig,
    now: f64,
    span: Span,
    prng: PrngState,
) -> Result<(usize, PrngState), Error> {
    let probs = dutch_book::normalize(params.weights)?;
    dutch_book::validate_or_err(&probs, params.tolerance, span)?;
    kelly::stake_is_safe_or_err(
        params.stake,
        params.bankroll,
        params.p,
        params.b,
        kelly_config,
        span,
    )?;
    cooloff.try_bet(now, cooloff_config, span)?;

    let (u, next) = prng.next_f64();
    let mut acc = 0.0;
    let mut index = probs.len().saturating_sub(1);
    for (i, prob) in probs.iter().enumerate() {
        acc += prob;
        if u < acc {
            index = i;
            break;
        }
    }
    Ok((index, next))
}
