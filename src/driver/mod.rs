//! Driver (C11): the end-to-end text -> tokens -> AST -> IR -> value
//! pipeline the CLI binary and the REPL both sit on top of. This module
//! owns the boundary pieces the embedded-use entry points deliberately
//! leave out — reading environment variables, building a [`SourceMap`] for
//! diagnostic rendering, and turning a [`Result`] into the process exit
//! codes from the driver CLI contract.

use crate::diagnostics::Diagnostic;
use crate::elaborate::ir::Ir;
use crate::error::Error;
use crate::parser::ast::Program;
use crate::prng::PrngState;
use crate::runtime::environment::Environment;
use crate::runtime::evaluator::{EvalConfig, Evaluator};
use crate::runtime::value::Value;
use crate::safety::cooloff::CoolOffState;
use crate::safety::kelly::KellyConfig;
use crate::span::SourceMap;

/// Exit codes from the driver CLI contract.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const EVAL_ERROR: i32 = 1;
    pub const FRONTEND_ERROR: i32 = 2;
    pub const USAGE_ERROR: i32 = 64;
}

/// Tunables collected from `BETLANG_SEED` / `BETLANG_COOLOFF_SECONDS` /
/// `BETLANG_TOLERANCE` and CLI flags, in that precedence order (a flag
/// always overrides its matching environment variable).
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    pub seed: u64,
    pub tolerance: f64,
    pub cooloff_seconds: f64,
    pub max_steps: Option<u64>,
    pub safety_enabled: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            seed: env_u64("BETLANG_SEED", 0),
            tolerance: env_f64("BETLANG_TOLERANCE", 1e-10),
            cooloff_seconds: env_f64("BETLANG_COOLOFF_SECONDS", 5.0),
            max_steps: None,
            safety_enabled: true,
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl DriverConfig {
    fn eval_config(&self) -> EvalConfig {
        EvalConfig {
            tolerance: self.tolerance,
            kelly: KellyConfig::default(),
            cooloff: crate::safety::cooloff::CoolOffConfig {
                base_period_seconds: self.cooloff_seconds,
                ..crate::safety::cooloff::CoolOffConfig::default()
            },
            now: 0.0,
            max_steps: self.max_steps,
        }
    }
}

/// `parse` + `elaborate`, rendering any accumulated diagnostic as a single
/// front-end failure (exit code 2 at the CLI boundary).
pub fn front_end(source: &str) -> Result<(Program, Ir), Vec<Diagnostic>> {
    let (program, bus) = crate::parser::parse(source);
    if bus.has_errors() {
        return Err(bus.into_vec());
    }
    let ir = crate::elaborate::elaborate(&program)?;
    Ok((program, ir))
}

/// `betlang check FILE`: parse and elaborate only, no evaluation.
pub fn check(source: &str) -> Result<(), Vec<Diagnostic>> {
    front_end(source).map(|_| ())
}

/// Distinguishes a front-end failure (exit code 2: lex/parse/elaborate,
/// possibly many diagnostics) from a runtime failure (exit code 1: exactly
/// one fatal diagnostic), per the driver CLI's exit-code contract.
#[derive(Debug)]
pub enum RunError {
    FrontEnd(Vec<Diagnostic>),
    Eval(Diagnostic),
}

impl RunError {
    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        match self {
            RunError::FrontEnd(ds) => ds.iter().collect(),
            RunError::Eval(d) => vec![d],
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::FrontEnd(_) => exit_code::FRONTEND_ERROR,
            RunError::Eval(_) => exit_code::EVAL_ERROR,
        }
    }
}

/// `betlang run FILE`: the full pipeline, printing the value of the last
/// top-level expression. `cooloff` is owned by the caller so the driver
/// never silently drops cool-off state threaded across a longer-lived
/// session (e.g. the REPL).
pub fn run(
    source: &str,
    config: &DriverConfig,
    cooloff: &mut CoolOffState,
) -> Result<Value, RunError> {
    let (_, ir) = front_end(source).map_err(RunError::FrontEnd)?;
    cooloff.enabled = config.safety_enabled;
    let eval_config = config.eval_config();
    let mut evaluator = Evaluator::new(&eval_config, cooloff);
    let env = Evaluator::global_env();
    let prng = PrngState::seed(config.seed);
    evaluator
        .eval_program(&ir, env, prng)
        .map(|(value, _)| value)
        .map_err(|e| RunError::Eval(Diagnostic::from_error(&e)))
}

/// `betlang run` against an already-elaborated program and a caller-owned
/// environment/PRNG/cool-off triple, for embedders (e.g. a REPL) that need
/// to thread state across many calls rather than starting fresh each time.
/// Returns the environment extended by any top-level `define`s so the next
/// call sees them.
pub fn run_ir(
    ir: &Ir,
    env: Environment,
    config: &DriverConfig,
    prng: PrngState,
    cooloff: &mut CoolOffState,
) -> Result<(Value, Environment, PrngState), Error> {
    cooloff.enabled = config.safety_enabled;
    let eval_config = config.eval_config();
    let mut evaluator = Evaluator::new(&eval_config, cooloff);
    evaluator.eval_program_env(ir, env, prng)
}

/// `betlang fmt FILE`: round-trip through the parser and pretty-print in
/// the keyword form. Fails on a parse error exactly like `check` does.
pub fn fmt(source: &str) -> Result<String, Vec<Diagnostic>> {
    let (program, bus) = crate::parser::parse(source);
    if bus.has_errors() {
        return Err(bus.into_vec());
    }
    Ok(crate::prettyprint::pretty_print(&program))
}

/// Renders diagnostics line-oriented (default) or newline-delimited JSON
/// (`--format=json`), matching the driver's diagnostic format.
pub fn render_diagnostics(diagnostics: &[Diagnostic], map: &SourceMap, json: bool) -> String {
    let mut out = String::new();
    for d in diagnostics {
        if json {
            out.push_str(&d.to_json_line());
        } else {
            out.push_str(&d.render_line(map));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_evaluates_the_last_top_level_item() {
        let config = DriverConfig {
            seed: 1,
            ..DriverConfig::default()
        };
        let mut cooloff = CoolOffState::new();
        let value = run("(define x 1)\n(+ x 41)", &config, &mut cooloff).unwrap();
        assert_eq!(value.to_string(), "42");
    }

    #[test]
    fn check_reports_front_end_errors_without_evaluating() {
        let diags = check("(bet-weighted (a 0.4) (b 0.4) (c 0.3))").unwrap_err();
        assert!(diags.iter().any(|d| d.kind == "DutchBook.Violation"));
    }

    #[test]
    fn run_is_deterministic_across_two_fresh_cooloff_states() {
        let config = DriverConfig {
            seed: 42,
            ..DriverConfig::default()
        };
        let mut c1 = CoolOffState::new();
        let mut c2 = CoolOffState::new();
        let v1 = run("(with-seed 42 (bet 'a 'b 'c))", &config, &mut c1).unwrap();
        let v2 = run("(with-seed 42 (bet 'a 'b 'c))", &config, &mut c2).unwrap();
        assert_eq!(v1, v2);
    }

    #[test]
    fn fmt_round_trips_through_the_parser() {
        let out = fmt("(bet 1 2 3)").unwrap();
        let (reparsed, diags) = crate::parser::parse(&out);
        assert!(diags.is_empty());
        assert_eq!(reparsed.items.len(), 1);
    }

    #[test]
    fn safety_disabled_bypasses_cooloff_gating() {
        let config = DriverConfig {
            seed: 1,
            safety_enabled: false,
            ..DriverConfig::default()
        };
        let mut cooloff = CoolOffState::new();
        // Two validated bets back to back would block under the default
        // cool-off period if safety were enabled.
        let source =
            "do a <- (validated_bet [0.5, 0.5] 10.0 1000.0 0.6 1.0); b <- (validated_bet [0.5, 0.5] 10.0 1000.0 0.6 1.0); return [a, b] end";
        let result = run(source, &config, &mut cooloff);
        assert!(result.is_ok());
    }

    #[test]
    fn front_end_failure_is_distinguished_from_eval_failure() {
        let config = DriverConfig::default();
        let mut cooloff = CoolOffState::new();
        let err = run("(bet-weighted (a 0.4) (b 0.4) (c 0.3))", &config, &mut cooloff).unwrap_err();
        assert!(matches!(err, RunError::FrontEnd(_)));
        assert_eq!(err.exit_code(), exit_code::FRONTEND_ERROR);
    }

    #[test]
    fn eval_failure_is_a_single_diagnostic() {
        let config = DriverConfig::default();
        let mut cooloff = CoolOffState::new();
        let err = run("unbound_name", &config, &mut cooloff).unwrap_err();
        assert!(matches!(err, RunError::Eval(_)));
        assert_eq!(err.exit_code(), exit_code::EVAL_ERROR);
    }
}
