//! Safety kernel (C10): Dutch-book validation, Kelly sizing, risk-of-ruin
//! estimation, cool-off gating, and the composite validated bet.
//!
//! Each concern is its own module, mirroring the numeric kernel's
//! one-file-per-topic convention; `validated_bet` composes the other four
//! into the single "enforce, then draw" pipeline the evaluator calls for
//! `bet/validated`.

pub mod cooloff;
pub mod dutch_book;
pub mod infer;
pub mod kelly;
pub mod risk_of_ruin;
pub mod validated_bet;

pub use cooloff::{CoolOffConfig, CoolOffState};
pub use dutch_book::{dutch_book_from_odds, normalize, validate, DutchBookOutcome};
pub use kelly::{kelly_fraction, optimal_stake, stake_is_safe, KellyConfig};
pub use risk_of_ruin::{risk_of_ruin, RuinEstimate, RuinParams};
pub use validated_bet::validated_bet;
