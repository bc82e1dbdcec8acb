//! Pretty-printer: round-trips a parsed [`Program`] back to source text in
//! the keyword/`end` surface, for `betlang fmt`. Grounded on the
//! parse-print-parse fixed point:
//! `parse . pretty_print . parse == parse` modulo span annotations.

use crate::parser::ast::{BinOp, DoStatement, Expr, Literal, Pattern, Program, Ternary, UnOp};
use crate::span::Spanned;
use std::fmt::Write as _;

/// Renders `program` in the keyword/`end` surface syntax, one top-level
/// item per line (blank line between items).
pub fn pretty_print(program: &Program) -> String {
    let mut out = String::new();
    for (i, item) in program.items.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        print_expr(&item.node, &mut out);
    }
    out.push('\n');
    out
}

fn print_literal(lit: &Literal, out: &mut String) {
    match lit {
        Literal::Int(n) => {
            let _ = write!(out, "{}", n);
        }
        Literal::Rational(p, q) => {
            let _ = write!(out, "{}/{}", p, q);
        }
        Literal::Float(x) => {
            let _ = write!(out, "{}", x);
        }
        Literal::Str(s) => {
            let _ = write!(out, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""));
        }
        Literal::Bool(b) => {
            let _ = write!(out, "{}", b);
        }
        Literal::Ternary(t) => {
            let s = match t {
                Ternary::False => "false",
                Ternary::Unknown => "unknown",
                Ternary::True => "true",
            };
            out.push_str(s);
        }
        Literal::Symbol(s) => {
            let _ = write!(out, "'{}", s);
        }
    }
}

fn binop_str(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Eq => "=",
        BinOp::NotEq => "!=",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Le => "<=",
        BinOp::Ge => ">=",
        BinOp::And => "and",
        BinOp::Or => "or",
    }
}

fn print_pattern(pattern: &Pattern, out: &mut String) {
    match pattern {
        Pattern::Wildcard => out.push('_'),
        Pattern::Var(name) => out.push_str(name),
        Pattern::Literal(lit) => print_literal(lit, out),
        Pattern::List(items) => {
            out.push('[');
            for (i, p) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                print_pattern(&p.node, out);
            }
            out.push(']');
        }
        Pattern::Tag(name, args) => {
            out.push_str(name);
            if !args.is_empty() {
                out.push('(');
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    print_pattern(&a.node, out);
                }
                out.push(')');
            }
        }
    }
}

fn print_exprs(items: &[Spanned<Expr>], sep: &str, out: &mut String) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        print_expr(&item.node, out);
    }
}

/// Renders one expression node in the keyword form. Each construct prints
/// as its own `end`-terminated block except the primitives that are
/// naturally single-line (literals, variables, application, operators).
fn print_expr(expr: &Expr, out: &mut String) {
    match expr {
        Expr::Literal(lit) => print_literal(lit, out),
        Expr::Var(name) => out.push_str(name),
        Expr::Hole(None) => out.push('_'),
        Expr::Hole(Some(name)) => {
            let _ = write!(out, "?{}", name);
        }
        Expr::App(f, args) => {
            print_expr(&f.node, out);
            out.push('(');
            print_exprs(args, ", ", out);
            out.push(')');
        }
        Expr::Binary(op, a, b) => {
            out.push('(');
            print_expr(&a.node, out);
            let _ = write!(out, " {} ", binop_str(*op));
            print_expr(&b.node, out);
            out.push(')');
        }
        Expr::Unary(UnOp::Neg, a) => {
            out.push('-');
            print_expr(&a.node, out);
        }
        Expr::Unary(UnOp::Not, a) => {
            out.push_str("not ");
            print_expr(&a.node, out);
        }
        Expr::Define(name, value) => {
            let _ = write!(out, "define {} = ", name);
            print_expr(&value.node, out);
        }
        Expr::Let(bindings, body) => {
            out.push_str("let ");
            for (i, b) in bindings.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{} = ", b.name);
                print_expr(&b.value.node, out);
            }
            out.push_str(" in ");
            print_expr(&body.node, out);
            out.push_str(" end");
        }
        Expr::If(c, a, b) => {
            out.push_str("if ");
            print_expr(&c.node, out);
            out.push_str(" then ");
            print_expr(&a.node, out);
            out.push_str(" else ");
            print_expr(&b.node, out);
            out.push_str(" end");
        }
        Expr::Match(scrutinee, arms) => {
            out.push_str("match ");
            print_expr(&scrutinee.node, out);
            out.push_str(" with ");
            for (i, arm) in arms.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                print_pattern(&arm.pattern.node, out);
                out.push_str(" -> ");
                print_expr(&arm.body.node, out);
            }
            out.push_str(" end");
        }
        Expr::Lambda(params, body) => {
            let _ = write!(out, "lambda ({}) -> ", params.join(", "));
            print_expr(&body.node, out);
            out.push_str(" end");
        }
        Expr::Bet(a, b, c) => {
            out.push_str("bet ");
            print_expr(&a.node, out);
            out.push(' ');
            print_expr(&b.node, out);
            out.push(' ');
            print_expr(&c.node, out);
            out.push_str(" end");
        }
        Expr::BetWeighted(arms) => {
            out.push_str("bet-weighted ");
            for (i, arm) in arms.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                out.push('(');
                print_expr(&arm.value.node, out);
                out.push_str(", ");
                print_expr(&arm.weight.node, out);
                out.push(')');
            }
            out.push_str(" end");
        }
        Expr::BetConditional(p, t, f, u) => {
            out.push_str("bet-conditional ");
            print_expr(&p.node, out);
            out.push(' ');
            print_expr(&t.node, out);
            out.push(' ');
            print_expr(&f.node, out);
            out.push(' ');
            print_expr(&u.node, out);
            out.push_str(" end");
        }
        Expr::BetLazy(a, b, c) => {
            out.push_str("bet-lazy ");
            print_expr(&a.node, out);
            out.push(' ');
            print_expr(&b.node, out);
            out.push(' ');
            print_expr(&c.node, out);
            out.push_str(" end");
        }
        Expr::WithSeed(seed, body) => {
            out.push_str("with-seed ");
            print_expr(&seed.node, out);
            out.push(' ');
            print_expr(&body.node, out);
            out.push_str(" end");
        }
        Expr::Do(stmts, tail) => {
            out.push_str("do ");
            for stmt in stmts {
                match &stmt.node {
                    DoStatement::Bind(name, value) => {
                        let _ = write!(out, "{} <- ", name);
                        print_expr(&value.node, out);
                        out.push_str("; ");
                    }
                    DoStatement::Expr(value) => {
                        print_expr(&value.node, out);
                        out.push_str("; ");
                    }
                }
            }
            out.push_str("return ");
            print_expr(&tail.node, out);
            out.push_str(" end");
        }
        Expr::Parallel(n, body) => {
            out.push_str("parallel ");
            print_expr(&n.node, out);
            out.push_str(" do ");
            print_expr(&body.node, out);
            out.push_str(" end");
        }
        Expr::Sample(d) => {
            out.push_str("sample ");
            print_expr(&d.node, out);
        }
        Expr::List(items) => {
            out.push('[');
            print_exprs(items, ", ", out);
            out.push(']');
        }
        Expr::Tuple(items) => {
            out.push('(');
            print_exprs(items, ", ", out);
            out.push(')');
        }
        Expr::Record(fields) => {
            out.push_str("{ ");
            for (i, (name, value)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{} = ", name);
                print_expr(&value.node, out);
            }
            out.push_str(" }");
        }
        Expr::Field(base, name) => {
            print_expr(&base.node, out);
            let _ = write!(out, ".{}", name);
        }
        Expr::Index(base, idx) => {
            print_expr(&base.node, out);
            out.push('[');
            print_expr(&idx.node, out);
            out.push(']');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn round_trips_a_ternary_bet() {
        let source = "bet 1 2 3 end";
        let (program, diags) = parse(source);
        assert!(diags.is_empty());
        let printed = pretty_print(&program);
        let (reparsed, diags2) = parse(&printed);
        assert!(diags2.is_empty());
        assert_eq!(program, reparsed);
    }

    #[test]
    fn round_trips_let_if_and_match() {
        let source = "let x = 1 in if x = 1 then 2 else 3 end end";
        let (program, diags) = parse(source);
        assert!(diags.is_empty());
        let printed = pretty_print(&program);
        let (reparsed, diags2) = parse(&printed);
        assert!(diags2.is_empty());
        assert_eq!(program, reparsed);
    }

    #[test]
    fn round_trips_sexpr_input_through_keyword_output() {
        let (program, diags) = parse("(bet 'a 'b 'c)");
        assert!(diags.is_empty());
        let printed = pretty_print(&program);
        let (reparsed, diags2) = parse(&printed);
        assert!(diags2.is_empty());
        assert_eq!(program, reparsed);
    }
}
