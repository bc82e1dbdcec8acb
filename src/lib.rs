//! # BetLang
//!
//! A probabilistic domain-specific language built around a ternary `bet`
//! primitive: a compiler-and-interpreter pipeline that parses a dual
//! S-expression/keyword surface syntax, elaborates it into a typed
//! intermediate form, and evaluates it against a seedable deterministic
//! runtime with a library of uncertainty-aware number systems and four
//! safety subsystems (Dutch-book validation, risk-of-ruin analysis,
//! cool-off gating, and validated betting).
//!
//! ## Quick start
//!
//! ```
//! use betlang::{elaborate, evaluate, parse};
//! use betlang::runtime::environment::Environment;
//! use betlang::safety::cooloff::CoolOffState;
//!
//! let source = "(with-seed 42 (bet 'a 'b 'c))";
//! let (program, diagnostics) = parse(source);
//! assert!(diagnostics.is_empty());
//!
//! let ir = elaborate(&program).expect("should elaborate cleanly");
//!
//! let mut cooloff = CoolOffState::new();
//! let value = evaluate(&ir, Environment::empty(), 1, &mut cooloff).expect("should evaluate");
//! assert_eq!(value.to_string(), "'a");
//! ```
//!
//! ## Embedded-use boundary
//!
//! Collaborators (an editor extension, a language server, a backend code
//! generator, foreign-language bindings) consume the core through exactly
//! three entry points, matching a fixed embedded-use contract:
//!
//! 1. [`parse`] — source text to [`parser::ast::Program`], plus accumulated
//!    front-end [`diagnostics::Diagnostic`]s.
//! 2. [`elaborate`] — [`parser::ast::Program`] to [`elaborate::ir::Ir`].
//! 3. [`evaluate`] — [`elaborate::ir::Ir`] to [`runtime::value::Value`].
//!
//! Everything else (the lexer, the PRNG, the numeric and safety kernels) is
//! public for embedding and testing but is not part of the stable
//! collaborator contract — those three functions are.

pub mod diagnostics;
pub mod driver;
pub mod elaborate;
pub mod error;
pub mod lexer;
pub mod numeric;
pub mod parser;
pub mod prettyprint;
pub mod prng;
pub mod runtime;
pub mod safety;
pub mod span;

use diagnostics::{Diagnostic, DiagnosticBus};
use elaborate::ir::Ir;
use error::Error;
use parser::ast::Program;
use prng::PrngState;
use runtime::environment::Environment;
use runtime::evaluator::{EvalConfig, Evaluator};
use runtime::value::Value;
use safety::cooloff::CoolOffState;

/// Entry point 1: parses `source` into a [`Program`], accumulating
/// front-end diagnostics (lex and parse errors) rather than stopping at the
/// first one.
pub fn parse(source: &str) -> (Program, DiagnosticBus) {
    parser::parse(source)
}

/// Entry point 2: elaborates a parsed [`Program`] into [`Ir`] — name
/// resolution, arity checks, compile-time Dutch-book validation, and the
/// exhaustiveness advisory. Returns every accumulated diagnostic on
/// failure, matching the front-end's "don't stop at the first error"
/// design.
pub fn elaborate(program: &Program) -> Result<Ir, Vec<Diagnostic>> {
    elaborate::elaborate(program)
}

/// Entry point 3: evaluates elaborated [`Ir`] against `env`, a fresh PRNG
/// seeded with `seed`, and the caller-owned `cooloff` state (the only
/// mutable resource a single evaluation touches). Returns the value of the
/// last top-level item.
///
/// This is a convenience wrapper over [`Evaluator::eval_program`] for
/// collaborators that don't need to thread PRNG state across multiple
/// separate evaluations; see [`driver`] for the full CLI-facing pipeline
/// (source text in, formatted diagnostics out) and [`Evaluator`] directly
/// for finer-grained control.
pub fn evaluate(
    ir: &Ir,
    env: Environment,
    seed: u64,
    cooloff: &mut CoolOffState,
) -> Result<Value, Error> {
    let config = EvalConfig::default();
    let mut evaluator = Evaluator::new(&config, cooloff);
    let prng = PrngState::seed(seed);
    let (value, _) = evaluator.eval_program(ir, env, prng)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_boundary_runs_a_simple_program() {
        let (program, diags) = parse("(+ 1 2)");
        assert!(diags.is_empty());
        let ir = elaborate(&program).unwrap();
        let mut cooloff = CoolOffState::new();
        let value = evaluate(&ir, Evaluator::global_env(), 0, &mut cooloff).unwrap();
        assert_eq!(value.to_string(), "3");
    }

    #[test]
    fn embedded_boundary_is_deterministic_under_seed() {
        let (program, _) = parse("(with-seed 7 (bet 1 2 3))");
        let ir = elaborate(&program).unwrap();
        let mut c1 = CoolOffState::new();
        let mut c2 = CoolOffState::new();
        let v1 = evaluate(&ir, Evaluator::global_env(), 0, &mut c1).unwrap();
        let v2 = evaluate(&ir, Evaluator::global_env(), 0, &mut c2).unwrap();
        assert_eq!(v1, v2);
    }
}
