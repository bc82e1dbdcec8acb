//! Elaborated intermediate representation (C5/C6 output).

use crate::parser::ast::{BinOp, Literal, Pattern, UnOp};
use crate::span::Spanned;

#[derive(Debug, Clone, PartialEq)]
pub struct IrMatchArm {
    pub pattern: Spanned<Pattern>,
    pub body: Spanned<IrExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrWeightedArm {
    pub value: Spanned<IrExpr>,
    pub weight: Spanned<IrExpr>,
}

/// The AST with (a) `do`-blocks desugared into nested binds, (b) a
/// `dutch_book_safe` annotation on `BetWeighted` when every weight was a
/// compile-time literal that normalizes within tolerance, and (c) names
/// checked against their lexical scope (see `elaborate::resolve`).
#[derive(Debug, Clone, PartialEq)]
pub enum IrExpr {
    Literal(Literal),
    Var(String),
    App(Box<Spanned<IrExpr>>, Vec<Spanned<IrExpr>>),
    Binary(BinOp, Box<Spanned<IrExpr>>, Box<Spanned<IrExpr>>),
    Unary(UnOp, Box<Spanned<IrExpr>>),
    Define(String, Box<Spanned<IrExpr>>),
    Let(Vec<(String, Spanned<IrExpr>)>, Box<Spanned<IrExpr>>),
    If(Box<Spanned<IrExpr>>, Box<Spanned<IrExpr>>, Box<Spanned<IrExpr>>),
    Match(Box<Spanned<IrExpr>>, Vec<IrMatchArm>),
    Lambda(Vec<String>, Box<Spanned<IrExpr>>),
    Bet(Box<Spanned<IrExpr>>, Box<Spanned<IrExpr>>, Box<Spanned<IrExpr>>),
    BetWeighted {
        arms: Vec<IrWeightedArm>,
        dutch_book_safe: bool,
        normalized: Option<Vec<f64>>,
    },
    BetConditional(
        Box<Spanned<IrExpr>>,
        Box<Spanned<IrExpr>>,
        Box<Spanned<IrExpr>>,
        Box<Spanned<IrExpr>>,
    ),
    BetLazy(
        Box<Spanned<IrExpr>>,
        Box<Spanned<IrExpr>>,
        Box<Spanned<IrExpr>>,
    ),
    WithSeed(Box<Spanned<IrExpr>>, Box<Spanned<IrExpr>>),
    /// Desugared `do`-block: `Bind(Some(name), value, rest)` for `name <-
    /// expr` statements, `Bind(None, value, rest)` for bare-expression
    /// statements, terminated by the `return` tail wrapped in its own `Bind`
    /// with an empty rest-of-nothing — modeled here simply as the tail
    /// expression itself once no more statements remain.
    Bind(Option<String>, Box<Spanned<IrExpr>>, Box<Spanned<IrExpr>>),
    Parallel(Box<Spanned<IrExpr>>, Box<Spanned<IrExpr>>),
    Sample(Box<Spanned<IrExpr>>),
    List(Vec<Spanned<IrExpr>>),
    Tuple(Vec<Spanned<IrExpr>>),
    Record(Vec<(String, Spanned<IrExpr>)>),
    Field(Box<Spanned<IrExpr>>, String),
    Index(Box<Spanned<IrExpr>>, Box<Spanned<IrExpr>>),
    Hole(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ir {
    pub items: Vec<Spanned<IrExpr>>,
}
