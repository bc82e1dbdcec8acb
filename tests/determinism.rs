//! Determinism and scoping invariants: the same seed always reproduces the
//! same draw sequence, and `with-seed` never perturbs the outer stream.

use betlang::runtime::environment::Environment;
use betlang::runtime::evaluator::Evaluator;
use betlang::safety::cooloff::CoolOffState;
use betlang::{elaborate, evaluate, parse};
use proptest::prelude::*;

fn run(source: &str, seed: u64) -> String {
    let (program, diags) = parse(source);
    assert!(diags.is_empty(), "unexpected parse diagnostics: {:?}", diags.into_vec());
    let ir = elaborate(&program).expect("should elaborate cleanly");
    let mut cooloff = CoolOffState::new();
    evaluate(&ir, Evaluator::global_env(), seed, &mut cooloff)
        .expect("should evaluate")
        .to_string()
}

#[test]
fn a_fixed_seed_reproduces_a_ternary_bet_every_run() {
    let a = run("(bet 'a 'b 'c)", 42);
    let b = run("(bet 'a 'b 'c)", 42);
    assert_eq!(a, b);
}

#[test]
fn with_seed_leaves_the_outer_stream_untouched() {
    // The two draws after `with-seed` must line up with what the same two
    // draws would have produced with no `with-seed` call at all, because
    // the inner stream's progression is discarded on exit.
    let source_with_seed =
        "do discard <- with-seed 99 bet 1 2 3 end end; return [bet 'x 'y 'z end, bet 'p 'q 'r end] end";
    let source_without = "[bet 'x 'y 'z end, bet 'p 'q 'r end]";
    let with_seed_value = run(source_with_seed, 7);
    let without_value = run(source_without, 7);
    assert_eq!(with_seed_value, without_value);
}

#[test]
fn embedded_global_env_program_is_deterministic_across_fresh_cooloff_states() {
    let (program, _) = parse("(with-seed 123 (bet-weighted (1 0.2) (2 0.3) (3 0.5)))");
    let ir = elaborate(&program).unwrap();
    let mut c1 = CoolOffState::new();
    let mut c2 = CoolOffState::new();
    let v1 = evaluate(&ir, Environment::empty(), 0, &mut c1).unwrap();
    let v2 = evaluate(&ir, Environment::empty(), 0, &mut c2).unwrap();
    assert_eq!(v1, v2);
}

proptest! {
    /// Determinism (property test): for any seed, evaluating the same IR
    /// twice from scratch produces the same value every time.
    #[test]
    fn any_seed_reproduces_the_same_ternary_bet(seed in any::<u64>()) {
        let a = run("(bet 'a 'b 'c)", seed);
        let b = run("(bet 'a 'b 'c)", seed);
        prop_assert_eq!(a, b);
    }
}
