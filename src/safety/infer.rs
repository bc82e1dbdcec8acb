//! Supplemental inference helpers: rejection and importance sampling over an
//! [`Uncertainty`] value given an arbitrary predicate or weighting closure.
//! These are a Rust-API addition with no surface syntax of their own — the
//! AST and evaluator never construct them directly.

use crate::numeric::{Sample, Uncertainty};
use crate::prng::PrngState;

/// Draws from `dist` until `accept` returns true or `max_attempts` is
/// exhausted, returning `None` in the latter case.
pub fn rejection(
    dist: &Uncertainty,
    accept: impl Fn(&Sample) -> bool,
    max_attempts: usize,
    prng: PrngState,
) -> (Option<Sample>, PrngState) {
    let mut state = prng;
    for _ in 0..max_attempts {
        let (sample, next) = dist.sample(state);
        state = next;
        if accept(&sample) {
            return (Some(sample), state);
        }
    }
    (None, state)
}

/// Draws `n` samples from `dist` and pairs each with a normalized importance
/// weight from `weight_fn`. If every draw receives zero weight, each sample
/// is given equal weight `1/n` instead of dividing by zero.
pub fn importance(
    dist: &Uncertainty,
    weight_fn: impl Fn(&Sample) -> f64,
    n: usize,
    prng: PrngState,
) -> (Vec<(Sample, f64)>, PrngState) {
    let mut state = prng;
    let mut raw = Vec::with_capacity(n);
    for _ in 0..n {
        let (sample, next) = dist.sample(state);
        state = next;
        let weight = weight_fn(&sample);
        raw.push((sample, weight));
    }
    let total: f64 = raw.iter().map(|(_, w)| w).sum();
    let weighted = if total > 0.0 {
        raw.into_iter()
            .map(|(s, w)| (s, w / total))
            .collect::<Vec<_>>()
    } else {
        let uniform = 1.0 / n.max(1) as f64;
        raw.into_iter().map(|(s, _)| (s, uniform)).collect()
    };
    (weighted, state)
}

/// The importance-weighted mean of a scalar-valued sample set, for
/// consumers that want a single estimate rather than the full weighted set.
pub fn weighted_mean(samples: &[(Sample, f64)]) -> Option<f64> {
    let mut total = 0.0;
    let mut weight_sum = 0.0;
    for (sample, weight) in samples {
        if let Sample::Scalar(v) = sample {
            total += v * weight;
            weight_sum += weight;
        }
    }
    if weight_sum > 0.0 {
        Some(total / weight_sum)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::normal::DistNormal;

    #[test]
    fn rejection_returns_none_after_exhausting_attempts() {
        let dist = Uncertainty::Normal(DistNormal::new(0.0, 1.0).unwrap());
        let (result, _) = rejection(&dist, |_| false, 10, PrngState::seed(1));
        assert!(result.is_none());
    }

    #[test]
    fn rejection_finds_a_positive_draw() {
        let dist = Uncertainty::Normal(DistNormal::new(0.0, 1.0).unwrap());
        let (result, _) = rejection(
            &dist,
            |s| matches!(s, Sample::Scalar(v) if *v > 0.0),
            1000,
            PrngState::seed(1),
        );
        assert!(result.is_some());
    }

    #[test]
    fn importance_weights_normalize_to_one() {
        let dist = Uncertainty::Normal(DistNormal::new(0.0, 1.0).unwrap());
        let weight_fn = |s: &Sample| match s {
            Sample::Scalar(v) if *v > 0.0 => 1.0,
            _ => 0.1,
        };
        let (weighted, _) = importance(&dist, weight_fn, 50, PrngState::seed(2));
        let total: f64 = weighted.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_mean_of_uniform_weights_matches_plain_average() {
        let samples = vec![
            (Sample::Scalar(1.0), 0.5),
            (Sample::Scalar(3.0), 0.5),
        ];
        assert_eq!(weighted_mean(&samples), Some(2.0));
    }
}
