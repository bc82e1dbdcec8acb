//! Statistical shape of the ternary and weighted bet primitives: empirical
//! frequencies over many seeded draws must land within a few standard
//! deviations of their theoretical probabilities.

use betlang::runtime::evaluator::Evaluator;
use betlang::safety::cooloff::CoolOffState;
use betlang::{elaborate, evaluate, parse};
use std::collections::HashMap;

const DRAWS: u64 = 200_000;

fn draw_many(source: &str, n: u64) -> HashMap<String, u64> {
    let (program, diags) = parse(source);
    assert!(diags.is_empty());
    let ir = elaborate(&program).unwrap();
    let mut counts = HashMap::new();
    for seed in 0..n {
        let mut cooloff = CoolOffState::new();
        let value = evaluate(&ir, Evaluator::global_env(), seed, &mut cooloff).unwrap();
        *counts.entry(value.to_string()).or_insert(0u64) += 1;
    }
    counts
}

#[test]
fn literal_ternary_bet_is_uniform_within_three_sigma() {
    let counts = draw_many("(bet 'a 'b 'c)", DRAWS);
    assert_eq!(counts.len(), 3, "expected exactly three distinct outcomes, got {:?}", counts);
    let n = DRAWS as f64;
    let p = 1.0 / 3.0;
    let sigma = (n * p * (1.0 - p)).sqrt();
    for (label, count) in &counts {
        let observed = *count as f64;
        let expected = n * p;
        assert!(
            (observed - expected).abs() <= 3.0 * sigma,
            "{}: observed {} too far from expected {} (sigma={})",
            label,
            observed,
            expected,
            sigma
        );
    }
}

#[test]
fn weighted_bet_matches_its_declared_weights_within_three_sigma() {
    // Weights 0.2 / 0.3 / 0.5 — deliberately uneven so a uniform-by-mistake
    // implementation would fail this test.
    let counts = draw_many("(bet-weighted (1 0.2) (2 0.3) (3 0.5))", DRAWS);
    let n = DRAWS as f64;
    let expectations = [("1", 0.2), ("2", 0.3), ("3", 0.5)];
    for (label, p) in expectations {
        let observed = *counts.get(label).unwrap_or(&0) as f64;
        let expected = n * p;
        let sigma = (n * p * (1.0 - p)).sqrt();
        assert!(
            (observed - expected).abs() <= 3.0 * sigma,
            "{}: observed {} too far from expected {} (sigma={})",
            label,
            observed,
            expected,
            sigma
        );
    }
}
