//! S-expression surface: fully parenthesized prefix syntax.

use super::ast::{DoStatement, Expr, WeightedArm};
use super::Parser;
use crate::lexer::{Keyword, Punct, TokenKind};
use crate::span::Spanned;

impl Parser {
    /// Entry point for the S-expression grammar. Expects the current token
    /// to be `(`.
    pub(crate) fn parse_sexpr(&mut self) -> Spanned<Expr> {
        let start = self.expect_punct(Punct::LParen);

        if self.check_punct(Punct::RParen) {
            let end = self.advance().span;
            self.errors.push(crate::error::Error::ParseMalformed {
                construct: "application".into(),
                reason: "empty form `()`".into(),
                span: start.merge(end),
            });
            return self.hole_at(start.merge(end));
        }

        if let TokenKind::Keyword(kw) = self.peek().kind.clone() {
            self.advance();
            return self.parse_sexpr_form(kw, start);
        }
        if matches!(self.peek().kind, TokenKind::Punct(Punct::Bind)) {
            self.advance();
            let (name, _) = self.expect_identifier();
            let value = self.parse_expr_any();
            let end = self.expect_punct(Punct::RParen);
            // A bare `(<- name expr)` outside a `do` body is still valid
            // syntax; it behaves as a one-statement `do` block.
            return Spanned::new(
                Expr::Do(
                    vec![Spanned::new(
                        DoStatement::Bind(name, value.clone()),
                        value.span,
                    )],
                    Box::new(value),
                ),
                start.merge(end),
            );
        }

        let f = self.parse_expr_any();
        let mut args = Vec::new();
        while !self.check_punct(Punct::RParen) && !self.at_eof_raw() {
            args.push(self.parse_expr_any());
        }
        let end = self.expect_punct(Punct::RParen);
        Spanned::new(Expr::App(Box::new(f), args), start.merge(end))
    }

    fn at_eof_raw(&mut self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn parse_sexpr_form(&mut self, kw: Keyword, start: crate::span::Span) -> Spanned<Expr> {
        match kw {
            Keyword::Bet => {
                let a = self.parse_expr_any();
                let b = self.parse_expr_any();
                let c = self.parse_expr_any();
                let end = self.expect_punct(Punct::RParen);
                Spanned::new(
                    Expr::Bet(Box::new(a), Box::new(b), Box::new(c)),
                    start.merge(end),
                )
            }
            Keyword::BetWeighted => {
                let mut arms = Vec::new();
                while !self.check_punct(Punct::RParen) && !self.at_eof_raw() {
                    self.expect_punct(Punct::LParen);
                    let value = self.parse_expr_any();
                    let weight = self.parse_expr_any();
                    self.expect_punct(Punct::RParen);
                    arms.push(WeightedArm { value, weight });
                }
                let end = self.expect_punct(Punct::RParen);
                Spanned::new(Expr::BetWeighted(arms), start.merge(end))
            }
            Keyword::BetConditional => {
                let p = self.parse_expr_any();
                let t = self.parse_expr_any();
                let f = self.parse_expr_any();
                let u = self.parse_expr_any();
                let end = self.expect_punct(Punct::RParen);
                Spanned::new(
                    Expr::BetConditional(Box::new(p), Box::new(t), Box::new(f), Box::new(u)),
                    start.merge(end),
                )
            }
            Keyword::BetLazy => {
                let a = self.parse_expr_any();
                let b = self.parse_expr_any();
                let c = self.parse_expr_any();
                let end = self.expect_punct(Punct::RParen);
                Spanned::new(
                    Expr::BetLazy(Box::new(a), Box::new(b), Box::new(c)),
                    start.merge(end),
                )
            }
            Keyword::WithSeed => {
                let seed = self.parse_expr_any();
                let body = self.parse_expr_any();
                let end = self.expect_punct(Punct::RParen);
                Spanned::new(
                    Expr::WithSeed(Box::new(seed), Box::new(body)),
                    start.merge(end),
                )
            }
            Keyword::Let => {
                self.expect_punct(Punct::LParen);
                let mut bindings = Vec::new();
                while self.check_punct(Punct::LBracket) || self.check_punct(Punct::LParen) {
                    let close = if self.check_punct(Punct::LBracket) {
                        self.advance();
                        Punct::RBracket
                    } else {
                        self.advance();
                        Punct::RParen
                    };
                    let (name, _) = self.expect_identifier();
                    let value = self.parse_expr_any();
                    self.expect_punct(close);
                    bindings.push(super::ast::Binding { name, value });
                }
                self.expect_punct(Punct::RParen);
                let body = self.parse_expr_any();
                let end = self.expect_punct(Punct::RParen);
                Spanned::new(Expr::Let(bindings, Box::new(body)), start.merge(end))
            }
            Keyword::If => {
                let c = self.parse_expr_any();
                let a = self.parse_expr_any();
                let b = self.parse_expr_any();
                let end = self.expect_punct(Punct::RParen);
                Spanned::new(
                    Expr::If(Box::new(c), Box::new(a), Box::new(b)),
                    start.merge(end),
                )
            }
            Keyword::Match => {
                let scrutinee = self.parse_expr_any();
                let mut arms = Vec::new();
                while self.check_punct(Punct::LParen) {
                    self.advance();
                    let pattern = self.parse_pattern();
                    self.expect_punct(Punct::Arrow);
                    let body = self.parse_expr_any();
                    self.expect_punct(Punct::RParen);
                    arms.push(super::ast::MatchArm { pattern, body });
                }
                let end = self.expect_punct(Punct::RParen);
                Spanned::new(Expr::Match(Box::new(scrutinee), arms), start.merge(end))
            }
            Keyword::Lambda => {
                self.expect_punct(Punct::LParen);
                let mut params = Vec::new();
                while !self.check_punct(Punct::RParen) && !self.at_eof_raw() {
                    let (name, _) = self.expect_identifier();
                    params.push(name);
                }
                self.expect_punct(Punct::RParen);
                let body = self.parse_expr_any();
                let end = self.expect_punct(Punct::RParen);
                Spanned::new(Expr::Lambda(params, Box::new(body)), start.merge(end))
            }
            Keyword::Define => {
                let (name, _) = self.expect_identifier();
                let value = self.parse_expr_any();
                let end = self.expect_punct(Punct::RParen);
                Spanned::new(Expr::Define(name, Box::new(value)), start.merge(end))
            }
            Keyword::Do => {
                let mut stmts = Vec::new();
                loop {
                    if self.check_punct(Punct::LParen) {
                        // Peek two tokens ahead without consuming: `(return ...)`.
                        let save = self.pos;
                        self.advance();
                        if self.check_keyword(Keyword::Return) {
                            self.advance();
                            let ret = self.parse_expr_any();
                            let end = self.expect_punct(Punct::RParen);
                            let closing = self.expect_punct(Punct::RParen);
                            return Spanned::new(
                                Expr::Do(stmts, Box::new(ret)),
                                start.merge(end).merge(closing),
                            );
                        }
                        self.pos = save;
                    }
                    if self.at_eof_raw() {
                        break;
                    }
                    let stmt = self.parse_do_statement_sexpr();
                    stmts.push(stmt);
                }
                let end = self.expect_punct(Punct::RParen);
                // Fell through without a `(return expr)` form; synthesize one.
                Spanned::new(
                    Expr::Do(stmts, Box::new(self.hole_at(end))),
                    start.merge(end),
                )
            }
            Keyword::Parallel => {
                let n = self.parse_expr_any();
                let body = self.parse_expr_any();
                let end = self.expect_punct(Punct::RParen);
                Spanned::new(Expr::Parallel(Box::new(n), Box::new(body)), start.merge(end))
            }
            Keyword::Sample => {
                let dist = self.parse_expr_any();
                let end = self.expect_punct(Punct::RParen);
                Spanned::new(Expr::Sample(Box::new(dist)), start.merge(end))
            }
            Keyword::In | Keyword::Then | Keyword::Else | Keyword::With | Keyword::Return => {
                self.error_unexpected("a form head".to_string());
                let end = self.expect_punct(Punct::RParen);
                self.hole_at(start.merge(end))
            }
        }
    }

    fn parse_do_statement_sexpr(&mut self) -> Spanned<DoStatement> {
        if self.check_punct(Punct::LParen) {
            let save = self.pos;
            self.advance();
            if matches!(self.peek().kind, TokenKind::Punct(Punct::Bind)) {
                self.advance();
                let (name, _) = self.expect_identifier();
                let value = self.parse_expr_any();
                let end = self.expect_punct(Punct::RParen);
                return Spanned::new(DoStatement::Bind(name, value), end);
            }
            self.pos = save;
        }
        let e = self.parse_expr_any();
        let span = e.span;
        Spanned::new(DoStatement::Expr(e), span)
    }
}
