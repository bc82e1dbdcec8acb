//! Native functions bound into the global environment: the numeric kernel's
//! fourteen constructors and the safety kernel's operations, exposed to
//! BetLang source the same way a user `lambda` would be — by name lookup in
//! the environment, applied via `App`. Everything here is reached only
//! through `(name arg*)`; there is no dedicated AST node for any of it.

use std::rc::Rc;

use crate::error::Error;
use crate::numeric::{self, Uncertainty};
use crate::prng::PrngState;
use crate::safety::cooloff::{CoolOffConfig, CoolOffState};
use crate::safety::kelly::KellyConfig;
use crate::safety::{dutch_book, kelly, risk_of_ruin, validated_bet};
use crate::span::Span;
use crate::runtime::value::{Number, Value};

/// Context threaded into every native call: the single place PRNG state and
/// cool-off state are mutated, matching the evaluator's "one well-defined
/// call site" contract.
pub struct NativeCtx<'a> {
    pub prng: PrngState,
    pub cooloff: &'a mut CoolOffState,
    pub cooloff_config: &'a CoolOffConfig,
    pub kelly_config: &'a KellyConfig,
    pub tolerance: f64,
    pub now: f64,
    pub span: Span,
}

pub type NativeFn = fn(&[Value], &mut NativeCtx) -> Result<Value, Error>;

fn domain_err(reason: impl Into<String>, span: Span) -> Error {
    Error::NumericDomainError {
        reason: reason.into(),
        span,
    }
}

fn arity_err(form: &str, expected: impl Into<String>, got: usize, span: Span) -> Error {
    Error::ArityMismatch {
        form: form.to_string(),
        expected: expected.into(),
        got,
        span,
    }
}

fn num(args: &[Value], i: usize, span: Span) -> Result<f64, Error> {
    args.get(i)
        .ok_or_else(|| arity_err("builtin", format!("at least {}", i + 1), args.len(), span))
        .and_then(|v| v.as_number())
        .map(Number::to_f64)
}

fn uncertainty(v: &Value, span: Span) -> Result<Rc<Uncertainty>, Error> {
    match v {
        Value::Uncertainty(u) => Ok(u.clone()),
        other => Err(Error::TypeMismatch {
            expected: "uncertainty".to_string(),
            got: other.type_name().to_string(),
            span,
        }),
    }
}

fn numbers_from_list(v: &Value, span: Span) -> Result<Vec<f64>, Error> {
    match v {
        Value::List(items) => items
            .iter()
            .map(|item| item.as_number().map(Number::to_f64))
            .collect(),
        other => Err(Error::TypeMismatch {
            expected: "list".to_string(),
            got: other.type_name().to_string(),
            span,
        }),
    }
}

fn strings_from_list(v: &Value, span: Span) -> Result<Vec<String>, Error> {
    match v {
        Value::List(items) => items
            .iter()
            .map(|item| match item {
                Value::Symbol(s) => Ok(s.clone()),
                Value::Str(s) => Ok((**s).clone()),
                other => Err(Error::TypeMismatch {
                    expected: "symbol or string".to_string(),
                    got: other.type_name().to_string(),
                    span,
                }),
            })
            .collect(),
        other => Err(Error::TypeMismatch {
            expected: "list".to_string(),
            got: other.type_name().to_string(),
            span,
        }),
    }
}

macro_rules! wrap_domain {
    ($ctor:expr, $span:expr) => {
        $ctor.map_err(|reason| domain_err(reason, $span))
    };
}

fn dist_normal(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let mu = num(args, 0, ctx.span)?;
    let sigma = num(args, 1, ctx.span)?;
    let d = wrap_domain!(numeric::normal::DistNormal::new(mu, sigma), ctx.span)?;
    Ok(Value::Uncertainty(Rc::new(Uncertainty::Normal(d))))
}

fn dist_beta(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let alpha = num(args, 0, ctx.span)?;
    let beta = num(args, 1, ctx.span)?;
    let d = wrap_domain!(numeric::beta::DistBeta::new(alpha, beta), ctx.span)?;
    Ok(Value::Uncertainty(Rc::new(Uncertainty::Beta(d))))
}

fn affine(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let lo = num(args, 0, ctx.span)?;
    let hi = num(args, 1, ctx.span)?;
    let d = wrap_domain!(numeric::affine::Affine::new(lo, hi), ctx.span)?;
    Ok(Value::Uncertainty(Rc::new(Uncertainty::Affine(d))))
}

fn fuzzy_triangular(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let a = num(args, 0, ctx.span)?;
    let b = num(args, 1, ctx.span)?;
    let c = num(args, 2, ctx.span)?;
    let d = wrap_domain!(numeric::fuzzy::FuzzyTriangular::new(a, b, c), ctx.span)?;
    Ok(Value::Uncertainty(Rc::new(Uncertainty::FuzzyTriangular(d))))
}

fn surreal_fuzzy(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let a = num(args, 0, ctx.span)?;
    let b = num(args, 1, ctx.span)?;
    let c = num(args, 2, ctx.span)?;
    let e = num(args, 3, ctx.span)?;
    let d = wrap_domain!(
        numeric::surreal_fuzzy::SurrealFuzzy::new(a, b, c, e),
        ctx.span
    )?;
    Ok(Value::Uncertainty(Rc::new(Uncertainty::SurrealFuzzy(d))))
}

fn bayesian(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let prior = num(args, 0, ctx.span)?;
    let likelihood = num(args, 1, ctx.span)?;
    let evidence = num(args, 2, ctx.span)?;
    let d = wrap_domain!(
        numeric::bayesian::Bayesian::new(prior, likelihood, evidence),
        ctx.span
    )?;
    Ok(Value::Uncertainty(Rc::new(Uncertainty::Bayesian(d))))
}

fn risk(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let samples = numbers_from_list(args.first().ok_or_else(|| {
        arity_err("risk", "2", args.len(), ctx.span)
    })?, ctx.span)?;
    let alpha = num(args, 1, ctx.span)?;
    let d = wrap_domain!(numeric::risk::Risk::new(samples, alpha), ctx.span)?;
    Ok(Value::Uncertainty(Rc::new(Uncertainty::Risk(d))))
}

fn padic_prob(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let base = num(args, 0, ctx.span)? as u32;
    let digits: Vec<u32> = numbers_from_list(args.get(1).ok_or_else(|| {
        arity_err("padic-prob", "2", args.len(), ctx.span)
    })?, ctx.span)?
        .into_iter()
        .map(|v| v as u32)
        .collect();
    let d = wrap_domain!(numeric::padic_prob::PAdicProb::new(base, digits), ctx.span)?;
    Ok(Value::Uncertainty(Rc::new(Uncertainty::PAdicProb(d))))
}

fn lottery(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let outcomes = strings_from_list(args.first().ok_or_else(|| {
        arity_err("lottery", "2", args.len(), ctx.span)
    })?, ctx.span)?;
    let weights = numbers_from_list(args.get(1).ok_or_else(|| {
        arity_err("lottery", "2", args.len(), ctx.span)
    })?, ctx.span)?;
    let d = wrap_domain!(numeric::lottery::Lottery::new(outcomes, weights), ctx.span)?;
    Ok(Value::Uncertainty(Rc::new(Uncertainty::Lottery(d))))
}

fn hyperreal(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let finite = num(args, 0, ctx.span)?;
    let infinitesimal = num(args, 1, ctx.span)?;
    let d = wrap_domain!(
        numeric::hyperreal::Hyperreal::new(finite, infinitesimal),
        ctx.span
    )?;
    Ok(Value::Uncertainty(Rc::new(Uncertainty::Hyperreal(d))))
}

fn surreal_adv_zero(_args: &[Value], _ctx: &mut NativeCtx) -> Result<Value, Error> {
    Ok(Value::Uncertainty(Rc::new(Uncertainty::SurrealAdv(
        numeric::surreal_adv::SurrealAdv::zero(),
    ))))
}

fn padic_adv(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let prime = num(args, 0, ctx.span)? as u32;
    let digits: Vec<u32> = numbers_from_list(args.get(1).ok_or_else(|| {
        arity_err("padic-adv", "3", args.len(), ctx.span)
    })?, ctx.span)?
        .into_iter()
        .map(|v| v as u32)
        .collect();
    let valuation = num(args, 2, ctx.span)? as i32;
    let d = wrap_domain!(
        numeric::padic_adv::PAdicAdv::new(prime, digits, valuation),
        ctx.span
    )?;
    Ok(Value::Uncertainty(Rc::new(Uncertainty::PAdicAdv(d))))
}

fn imprecise(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let lo = num(args, 0, ctx.span)?;
    let hi = num(args, 1, ctx.span)?;
    let d = wrap_domain!(numeric::imprecise::Imprecise::new(lo, hi), ctx.span)?;
    Ok(Value::Uncertainty(Rc::new(Uncertainty::Imprecise(d))))
}

fn dempster_shafer(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let focal_elements = match args.first() {
        Some(Value::List(items)) => items
            .iter()
            .map(|item| strings_from_list(item, ctx.span))
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(arity_err("dempster-shafer", "2", args.len(), ctx.span)),
    };
    let masses = numbers_from_list(args.get(1).ok_or_else(|| {
        arity_err("dempster-shafer", "2", args.len(), ctx.span)
    })?, ctx.span)?;
    let d = wrap_domain!(
        numeric::dempster_shafer::DempsterShafer::new(focal_elements, masses),
        ctx.span
    )?;
    Ok(Value::Uncertainty(Rc::new(Uncertainty::DempsterShafer(d))))
}

fn dutch_book_validate(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let probs = numbers_from_list(args.first().ok_or_else(|| {
        arity_err("dutch-book-validate", "1", args.len(), ctx.span)
    })?, ctx.span)?;
    match dutch_book::validate(&probs, ctx.tolerance) {
        dutch_book::DutchBookOutcome::Ok { .. } => Ok(Value::Bool(true)),
        dutch_book::DutchBookOutcome::Violation { sum, margin } => {
            Err(Error::DutchBookViolation {
                sum,
                margin,
                span: ctx.span,
            })
        }
    }
}

fn dutch_book_normalize(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let weights = numbers_from_list(args.first().ok_or_else(|| {
        arity_err("dutch-book-normalize", "1", args.len(), ctx.span)
    })?, ctx.span)?;
    let probs = dutch_book::normalize(&weights)?;
    Ok(Value::list(
        probs.into_iter().map(|p| Value::Number(Number::Float(p))).collect(),
    ))
}

fn kelly_fraction(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let p = num(args, 0, ctx.span)?;
    let b = num(args, 1, ctx.span)?;
    Ok(Value::Number(Number::Float(kelly::kelly_fraction(p, b))))
}

fn optimal_stake(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let bankroll = num(args, 0, ctx.span)?;
    let p = num(args, 1, ctx.span)?;
    let b = num(args, 2, ctx.span)?;
    let fraction = num(args, 3, ctx.span)?;
    Ok(Value::Number(Number::Float(kelly::optimal_stake(
        bankroll, p, b, fraction,
    ))))
}

fn stake_is_safe(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let stake = num(args, 0, ctx.span)?;
    let bankroll = num(args, 1, ctx.span)?;
    let p = num(args, 2, ctx.span)?;
    let b = num(args, 3, ctx.span)?;
    Ok(Value::Bool(kelly::stake_is_safe(
        stake,
        bankroll,
        p,
        b,
        ctx.kelly_config,
    )))
}

fn risk_of_ruin_builtin(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let p = num(args, 0, ctx.span)?;
    let b = num(args, 1, ctx.span)?;
    let initial_wealth = num(args, 2, ctx.span)?;
    let target = num(args, 3, ctx.span)?;
    let params = risk_of_ruin::RuinParams {
        p,
        b,
        initial_wealth,
        target,
        ..risk_of_ruin::RuinParams::default()
    };
    let (estimate, next) = risk_of_ruin::risk_of_ruin(&params, ctx.prng);
    ctx.prng = next;
    Ok(Value::Number(Number::Float(estimate.ruin_probability)))
}

fn validated_bet_builtin(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let weights = numbers_from_list(args.first().ok_or_else(|| {
        arity_err("validated-bet", "6", args.len(), ctx.span)
    })?, ctx.span)?;
    let stake = num(args, 1, ctx.span)?;
    let bankroll = num(args, 2, ctx.span)?;
    let p = num(args, 3, ctx.span)?;
    let b = num(args, 4, ctx.span)?;
    let params = validated_bet::ValidatedBetParams {
        weights: &weights,
        tolerance: ctx.tolerance,
        stake,
        bankroll,
        p,
        b,
    };
    let (index, next) = validated_bet::validated_bet(
        params,
        ctx.kelly_config,
        ctx.cooloff,
        ctx.cooloff_config,
        ctx.now,
        ctx.span,
        ctx.prng,
    )?;
    ctx.prng = next;
    Ok(Value::Number(Number::Int(index as i64)))
}

fn uncertainty_sample(args: &[Value], ctx: &mut NativeCtx) -> Result<Value, Error> {
    let dist = uncertainty(args.first().ok_or_else(|| {
        arity_err("uncertainty-sample", "1", args.len(), ctx.span)
    })?, ctx.span)?;
    let (sample, next) = dist.sample(ctx.prng);
    ctx.prng = next;
    Ok(match sample {
        numeric::Sample::Scalar(v) => Value::Number(Number::Float(v)),
        numeric::Sample::Label(s) => Value::Symbol(s),
        numeric::Sample::LabelSet(labels) => {
            Value::list(labels.into_iter().map(Value::Symbol).collect())
        }
    })
}

/// All native bindings, by the normalized (underscore) name the elaborator
/// produces for a hyphenated source identifier.
pub fn all() -> Vec<(&'static str, usize, NativeFn)> {
    vec![
        ("dist_normal", 2, dist_normal as NativeFn),
        ("dist_beta", 2, dist_beta as NativeFn),
        ("affine", 2, affine as NativeFn),
        ("fuzzy_triangular", 3, fuzzy_triangular as NativeFn),
        ("surreal_fuzzy", 4, surreal_fuzzy as NativeFn),
        ("bayesian", 3, bayesian as NativeFn),
        ("risk", 2, risk as NativeFn),
        ("padic_prob", 2, padic_prob as NativeFn),
        ("lottery", 2, lottery as NativeFn),
        ("hyperreal", 2, hyperreal as NativeFn),
        ("surreal_adv_zero", 0, surreal_adv_zero as NativeFn),
        ("padic_adv", 3, padic_adv as NativeFn),
        ("imprecise", 2, imprecise as NativeFn),
        ("dempster_shafer", 2, dempster_shafer as NativeFn),
        ("dutch_book_validate", 1, dutch_book_validate as NativeFn),
        ("dutch_book_normalize", 1, dutch_book_normalize as NativeFn),
        ("kelly_fraction", 2, kelly_fraction as NativeFn),
        ("optimal_stake", 4, optimal_stake as NativeFn),
        ("stake_is_safe", 4, stake_is_safe as NativeFn),
        ("risk_of_ruin", 4, risk_of_ruin_builtin as NativeFn),
        ("validated_bet", 5, validated_bet_builtin as NativeFn),
        ("uncertainty_sample", 1, uncertainty_sample as NativeFn),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(
        cooloff: &'a mut CoolOffState,
        cooloff_config: &'a CoolOffConfig,
        kelly_config: &'a KellyConfig,
    ) -> NativeCtx<'a> {
        NativeCtx {
            prng: PrngState::seed(1),
            cooloff,
            cooloff_config,
            kelly_config,
            tolerance: 1e-9,
            now: 0.0,
            span: Span::dummy(),
        }
    }

    #[test]
    fn dist_normal_constructor_rejects_negative_sigma() {
        let mut cooloff = CoolOffState::new();
        let cooloff_config = CoolOffConfig::default();
        let kelly_config = KellyConfig::default();
        let mut c = ctx(&mut cooloff, &cooloff_config, &kelly_config);
        let args = vec![
            Value::Number(Number::Float(0.0)),
            Value::Number(Number::Float(-1.0)),
        ];
        assert!(dist_normal(&args, &mut c).is_err());
    }

    #[test]
    fn kelly_fraction_builtin_matches_library_function() {
        let mut cooloff = CoolOffState::new();
        let cooloff_config = CoolOffConfig::default();
        let kelly_config = KellyConfig::default();
        let mut c = ctx(&mut cooloff, &cooloff_config, &kelly_config);
        let args = vec![
            Value::Number(Number::Float(0.55)),
            Value::Number(Number::Float(2.0)),
        ];
        let result = kelly_fraction(&args, &mut c).unwrap();
        assert_eq!(result, Value::Number(Number::Float(kelly::kelly_fraction(0.55, 2.0))));
    }

    #[test]
    fn all_bindings_have_unique_names() {
        let names: Vec<&str> = all().into_iter().map(|(n, _, _)| n).collect();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names.len(), sorted.len());
    }
}
