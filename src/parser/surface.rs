//! Keyword/`end` surface: precedence-climbing (Pratt) parser.
//!
//! Precedence, high to low: postfix (call/field/index), unary `-`/`not`,
//! `*`/`/`, `+`/`-`, comparisons, `and`/`or`.

use super::ast::{Binding, DoStatement, Expr, Literal, MatchArm, Ternary, UnOp, WeightedArm};
use super::Parser;
use crate::lexer::{Keyword, Op, Punct, TokenKind};
use crate::span::Spanned;

fn binop_from_op(op: Op) -> Option<super::ast::BinOp> {
    use super::ast::BinOp::*;
    Some(match op {
        Op::Plus => Add,
        Op::Minus => Sub,
        Op::Star => Mul,
        Op::Slash => Div,
        Op::Eq => Eq,
        Op::NotEq => NotEq,
        Op::Lt => Lt,
        Op::Gt => Gt,
        Op::Le => Le,
        Op::Ge => Ge,
        Op::And => And,
        Op::Or => Or,
        Op::Assign | Op::Not => return None,
    })
}

/// `(left binding power, right binding power)`; equal on both sides means
/// left-associative.
fn binding_power(op: Op) -> (u8, u8) {
    match op {
        Op::Or => (1, 2),
        Op::And => (3, 4),
        Op::Eq | Op::NotEq | Op::Lt | Op::Gt | Op::Le | Op::Ge => (5, 6),
        Op::Plus | Op::Minus => (7, 8),
        Op::Star | Op::Slash => (9, 10),
        Op::Assign | Op::Not => (0, 0),
    }
}

impl Parser {
    /// Entry point for the keyword/`end` grammar.
    pub(crate) fn parse_surface(&mut self, min_bp: u8) -> Spanned<Expr> {
        let mut lhs = self.parse_unary();
        loop {
            let op = match self.peek().kind {
                TokenKind::Op(o) if binop_from_op(o).is_some() => o,
                _ => break,
            };
            let (lbp, rbp) = binding_power(op);
            if lbp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_surface(rbp);
            let span = lhs.span.merge(rhs.span);
            let binop = binop_from_op(op).expect("checked above");
            lhs = Spanned::new(Expr::Binary(binop, Box::new(lhs), Box::new(rhs)), span);
        }
        lhs
    }

    fn parse_unary(&mut self) -> Spanned<Expr> {
        match self.peek().kind.clone() {
            TokenKind::Op(Op::Minus) => {
                let start = self.advance().span;
                let operand = self.parse_unary();
                let span = start.merge(operand.span);
                Spanned::new(Expr::Unary(UnOp::Neg, Box::new(operand)), span)
            }
            TokenKind::Op(Op::Not) => {
                let start = self.advance().span;
                let operand = self.parse_unary();
                let span = start.merge(operand.span);
                Spanned::new(Expr::Unary(UnOp::Not, Box::new(operand)), span)
            }
            TokenKind::Keyword(Keyword::Sample) => {
                let start = self.advance().span;
                let operand = self.parse_unary();
                let span = start.merge(operand.span);
                Spanned::new(Expr::Sample(Box::new(operand)), span)
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Spanned<Expr> {
        let mut base = self.parse_primary();
        loop {
            if self.check_punct(Punct::Dot) {
                self.advance();
                let (name, name_span) = self.expect_identifier();
                let span = base.span.merge(name_span);
                base = Spanned::new(Expr::Field(Box::new(base), name), span);
            } else if self.check_punct(Punct::LBracket) {
                self.advance();
                let idx = self.parse_surface(0);
                let end = self.expect_punct(Punct::RBracket);
                let span = base.span.merge(end);
                base = Spanned::new(Expr::Index(Box::new(base), Box::new(idx)), span);
            } else if self.check_punct(Punct::LParen) && matches!(base.node, Expr::Var(_)) {
                self.advance();
                let mut args = Vec::new();
                if !self.check_punct(Punct::RParen) {
                    loop {
                        args.push(self.parse_surface(0));
                        if self.check_punct(Punct::Comma) {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                let end = self.expect_punct(Punct::RParen);
                let span = base.span.merge(end);
                base = Spanned::new(Expr::App(Box::new(base), args), span);
            } else {
                break;
            }
        }
        base
    }

    fn parse_primary(&mut self) -> Spanned<Expr> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Int(n) => {
                self.advance();
                Spanned::new(Expr::Literal(Literal::Int(n)), tok.span)
            }
            TokenKind::Rational(p, q) => {
                self.advance();
                Spanned::new(Expr::Literal(Literal::Rational(p, q)), tok.span)
            }
            TokenKind::Float(x) => {
                self.advance();
                Spanned::new(Expr::Literal(Literal::Float(x)), tok.span)
            }
            TokenKind::Str(s) => {
                self.advance();
                Spanned::new(Expr::Literal(Literal::Str(s)), tok.span)
            }
            TokenKind::Bool(b) => {
                self.advance();
                Spanned::new(Expr::Literal(Literal::Bool(b)), tok.span)
            }
            TokenKind::Punct(Punct::Underscore) => {
                self.advance();
                Spanned::new(Expr::Hole(None), tok.span)
            }
            TokenKind::Punct(Punct::Question) => {
                self.advance();
                let (name, name_span) = self.expect_identifier();
                Spanned::new(Expr::Hole(Some(name)), tok.span.merge(name_span))
            }
            TokenKind::Identifier(name) if name == "unknown" => {
                self.advance();
                Spanned::new(Expr::Literal(Literal::Ternary(Ternary::Unknown)), tok.span)
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Spanned::new(Expr::Var(name), tok.span)
            }
            TokenKind::Punct(Punct::Quote) => self.parse_quoted(),
            TokenKind::Punct(Punct::LParen) => self.parse_paren_or_tuple(),
            TokenKind::Punct(Punct::LBracket) => self.parse_list_literal(),
            TokenKind::Punct(Punct::LBrace) => self.parse_record_literal(),
            TokenKind::Keyword(kw) => self.parse_keyword_form(kw),
            _ => {
                self.error_unexpected("an expression".to_string());
                self.advance();
                self.hole_at(tok.span)
            }
        }
    }

    fn parse_paren_or_tuple(&mut self) -> Spanned<Expr> {
        let start = self.advance().span; // '('
        if self.check_punct(Punct::RParen) {
            let end = self.advance().span;
            return Spanned::new(Expr::Tuple(Vec::new()), start.merge(end));
        }
        let first = self.parse_surface(0);
        if self.check_punct(Punct::Comma) {
            let mut items = vec![first];
            while self.check_punct(Punct::Comma) {
                self.advance();
                if self.check_punct(Punct::RParen) {
                    break;
                }
                items.push(self.parse_surface(0));
            }
            let end = self.expect_punct(Punct::RParen);
            Spanned::new(Expr::Tuple(items), start.merge(end))
        } else {
            let end = self.expect_punct(Punct::RParen);
            Spanned::new(first.node, start.merge(end))
        }
    }

    fn parse_list_literal(&mut self) -> Spanned<Expr> {
        let start = self.advance().span; // '['
        let mut items = Vec::new();
        if !self.check_punct(Punct::RBracket) {
            loop {
                items.push(self.parse_surface(0));
                if self.check_punct(Punct::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        let end = self.expect_punct(Punct::RBracket);
        Spanned::new(Expr::List(items), start.merge(end))
    }

    fn parse_record_literal(&mut self) -> Spanned<Expr> {
        let start = self.advance().span; // '{'
        let mut fields = Vec::new();
        if !self.check_punct(Punct::RBrace) {
            loop {
                let (name, _) = self.expect_identifier();
                if self.check_punct(Punct::Colon) || matches!(self.peek().kind, TokenKind::Op(Op::Assign)) {
                    self.advance();
                }
                let value = self.parse_surface(0);
                fields.push((name, value));
                if self.check_punct(Punct::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        let end = self.expect_punct(Punct::RBrace);
        Spanned::new(Expr::Record(fields), start.merge(end))
    }

    fn parse_keyword_form(&mut self, kw: Keyword) -> Spanned<Expr> {
        let start = self.current_span();
        self.advance();
        match kw {
            Keyword::Bet => {
                let a = self.parse_surface(0);
                let b = self.parse_surface(0);
                let c = self.parse_surface(0);
                let end = self.expect_end();
                Spanned::new(
                    Expr::Bet(Box::new(a), Box::new(b), Box::new(c)),
                    start.merge(end),
                )
            }
            Keyword::BetWeighted => {
                let mut arms = Vec::new();
                while self.check_punct(Punct::LParen) {
                    self.advance();
                    let value = self.parse_surface(0);
                    self.expect_punct(Punct::Comma);
                    let weight = self.parse_surface(0);
                    self.expect_punct(Punct::RParen);
                    arms.push(WeightedArm { value, weight });
                }
                let end = self.expect_end();
                Spanned::new(Expr::BetWeighted(arms), start.merge(end))
            }
            Keyword::BetConditional => {
                let p = self.parse_surface(0);
                let t = self.parse_surface(0);
                let f = self.parse_surface(0);
                let u = self.parse_surface(0);
                let end = self.expect_end();
                Spanned::new(
                    Expr::BetConditional(Box::new(p), Box::new(t), Box::new(f), Box::new(u)),
                    start.merge(end),
                )
            }
            Keyword::BetLazy => {
                let a = self.parse_surface(0);
                let b = self.parse_surface(0);
                let c = self.parse_surface(0);
                let end = self.expect_end();
                Spanned::new(
                    Expr::BetLazy(Box::new(a), Box::new(b), Box::new(c)),
                    start.merge(end),
                )
            }
            Keyword::WithSeed => {
                let seed = self.parse_surface(0);
                let body = self.parse_surface(0);
                let end = self.expect_end();
                Spanned::new(
                    Expr::WithSeed(Box::new(seed), Box::new(body)),
                    start.merge(end),
                )
            }
            Keyword::Let => {
                let mut bindings = Vec::new();
                loop {
                    let (name, _) = self.expect_identifier();
                    self.expect_assign();
                    let value = self.parse_surface(0);
                    bindings.push(Binding { name, value });
                    if self.check_punct(Punct::Comma) {
                        self.advance();
                    } else {
                        break;
                    }
                }
                self.expect_keyword(Keyword::In);
                let body = self.parse_surface(0);
                let end = self.expect_end();
                Spanned::new(Expr::Let(bindings, Box::new(body)), start.merge(end))
            }
            Keyword::If => {
                let c = self.parse_surface(0);
                self.expect_keyword(Keyword::Then);
                let a = self.parse_surface(0);
                self.expect_keyword(Keyword::Else);
                let b = self.parse_surface(0);
                let end = self.expect_end();
                Spanned::new(
                    Expr::If(Box::new(c), Box::new(a), Box::new(b)),
                    start.merge(end),
                )
            }
            Keyword::Match => {
                let scrutinee = self.parse_surface(0);
                self.expect_keyword(Keyword::With);
                let mut arms = Vec::new();
                loop {
                    let pattern = self.parse_pattern();
                    self.expect_punct(Punct::Arrow);
                    let body = self.parse_surface(0);
                    arms.push(MatchArm { pattern, body });
                    if self.check_punct(Punct::Pipe) {
                        self.advance();
                    } else {
                        break;
                    }
                }
                let end = self.expect_end();
                Spanned::new(Expr::Match(Box::new(scrutinee), arms), start.merge(end))
            }
            Keyword::Lambda => {
                self.expect_punct(Punct::LParen);
                let mut params = Vec::new();
                if !self.check_punct(Punct::RParen) {
                    loop {
                        let (name, _) = self.expect_identifier();
                        params.push(name);
                        if self.check_punct(Punct::Comma) {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                self.expect_punct(Punct::RParen);
                self.expect_punct(Punct::Arrow);
                let body = self.parse_surface(0);
                let end = self.expect_end();
                Spanned::new(Expr::Lambda(params, Box::new(body)), start.merge(end))
            }
            Keyword::Define => {
                let (name, _) = self.expect_identifier();
                self.expect_assign();
                let value = self.parse_surface(0);
                let span = start.merge(value.span);
                Spanned::new(Expr::Define(name, Box::new(value)), span)
            }
            Keyword::Do => self.parse_do_block(start),
            Keyword::Parallel => {
                let n = self.parse_surface(0);
                self.expect_keyword(Keyword::Do);
                let body = self.parse_surface(0);
                let end = self.expect_end();
                Spanned::new(Expr::Parallel(Box::new(n), Box::new(body)), start.merge(end))
            }
            Keyword::Sample => {
                // Reachable only if `sample` appears somewhere other than
                // via `parse_unary`'s prefix handling (e.g. after `return`).
                let dist = self.parse_surface(0);
                let span = start.merge(dist.span);
                Spanned::new(Expr::Sample(Box::new(dist)), span)
            }
            Keyword::In | Keyword::Then | Keyword::Else | Keyword::With | Keyword::Return => {
                self.error_unexpected("an expression".to_string());
                self.hole_at(start)
            }
        }
    }

    fn expect_assign(&mut self) {
        if matches!(self.peek().kind, TokenKind::Op(Op::Assign)) {
            self.advance();
        } else {
            self.error_unexpected("'='".to_string());
        }
    }

    fn parse_do_block(&mut self, start: crate::span::Span) -> Spanned<Expr> {
        let mut stmts = Vec::new();
        loop {
            if self.check_keyword(Keyword::Return) {
                self.advance();
                let ret = self.parse_surface(0);
                let end = self.expect_end();
                return Spanned::new(Expr::Do(stmts, Box::new(ret)), start.merge(end));
            }
            if self.at_eof() {
                let end = self.current_span();
                return Spanned::new(Expr::Do(stmts, Box::new(self.hole_at(end))), start.merge(end));
            }
            stmts.push(self.parse_do_statement());
            self.skip_statement_separator();
        }
    }

    fn parse_do_statement(&mut self) -> Spanned<DoStatement> {
        if let TokenKind::Identifier(name) = self.peek().kind.clone() {
            let save = self.pos;
            let name_span = self.advance().span;
            if matches!(self.peek().kind, TokenKind::Punct(Punct::Bind)) {
                self.advance();
                let value = self.parse_surface(0);
                let span = name_span.merge(value.span);
                return Spanned::new(DoStatement::Bind(name, value), span);
            }
            self.pos = save;
        }
        let e = self.parse_surface(0);
        let span = e.span;
        Spanned::new(DoStatement::Expr(e), span)
    }

    /// A statement boundary inside `do` is `;` or a newline; `check_punct`
    /// already skips newlines as it looks for the next significant token, so
    /// they are consumed as a side effect whether or not a `;` follows.
    fn skip_statement_separator(&mut self) {
        if self.check_punct(Punct::Semicolon) {
            self.advance();
        }
    }
}
