//! Scanner: source text to a spanned token stream (C3).

use super::token::{Keyword, Op, Punct, Token, TokenKind};
use crate::error::Error;
use crate::span::Span;

/// Scans BetLang source into tokens. Shared by both surface syntaxes: the
/// parser, not the scanner, decides which grammar a file uses.
pub struct Scanner {
    source: Vec<char>,
    byte_offsets: Vec<usize>,
    start: usize,
    current: usize,
    tokens: Vec<Token>,
    errors: Vec<Error>,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let mut byte_offsets = Vec::with_capacity(chars.len() + 1);
        let mut offset = 0;
        for c in &chars {
            byte_offsets.push(offset);
            offset += c.len_utf8();
        }
        byte_offsets.push(offset);
        Scanner {
            source: chars,
            byte_offsets,
            start: 0,
            current: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Scans the whole source. Lex errors are collected, not fatal: scanning
    /// resumes at the next character so later tokens can still be recovered.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<Error>) {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }
        let eof_span = Span::point(self.byte_offsets[self.current]);
        self.tokens.push(Token::new(TokenKind::Eof, eof_span));
        (self.tokens, self.errors)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        *self.source.get(self.current).unwrap_or(&'\0')
    }

    fn peek_next(&self) -> char {
        *self.source.get(self.current + 1).unwrap_or(&'\0')
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn current_span(&self) -> Span {
        Span::new(self.byte_offsets[self.start], self.byte_offsets[self.current])
    }

    fn add_token(&mut self, kind: TokenKind) {
        let span = self.current_span();
        self.tokens.push(Token::new(kind, span));
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            ' ' | '\t' | '\r' => {}
            '\n' => self.add_token(TokenKind::Punct(Punct::Newline)),
            ';' => self.skip_line_comment(),
            '/' if self.peek() == '/' => self.skip_line_comment(),
            '#' if self.peek() == '|' => self.skip_block_comment(),
            '(' => self.add_token(TokenKind::Punct(Punct::LParen)),
            ')' => self.add_token(TokenKind::Punct(Punct::RParen)),
            '[' => self.add_token(TokenKind::Punct(Punct::LBracket)),
            ']' => self.add_token(TokenKind::Punct(Punct::RBracket)),
            '{' => self.add_token(TokenKind::Punct(Punct::LBrace)),
            '}' => self.add_token(TokenKind::Punct(Punct::RBrace)),
            ',' => self.add_token(TokenKind::Punct(Punct::Comma)),
            '.' => self.add_token(TokenKind::Punct(Punct::Dot)),
            '|' => self.add_token(TokenKind::Punct(Punct::Pipe)),
            '?' => self.add_token(TokenKind::Punct(Punct::Question)),
            ':' => self.add_token(TokenKind::Punct(Punct::Colon)),
            '\'' => self.add_token(TokenKind::Punct(Punct::Quote)),
            '-' if self.peek() == '>' => {
                self.advance();
                self.add_token(TokenKind::Punct(Punct::Arrow));
            }
            '-' if self.peek().is_ascii_digit() => self.scan_number('-'),
            '-' => self.add_token(TokenKind::Op(Op::Minus)),
            '=' if self.peek() == '>' => {
                self.advance();
                self.add_token(TokenKind::Punct(Punct::FatArrow));
            }
            '=' if self.peek() == '=' => {
                self.advance();
                self.add_token(TokenKind::Op(Op::Eq));
            }
            '=' => self.add_token(TokenKind::Op(Op::Assign)),
            '!' if self.peek() == '=' => {
                self.advance();
                self.add_token(TokenKind::Op(Op::NotEq));
            }
            '<' if self.peek() == '-' => {
                self.advance();
                self.add_token(TokenKind::Punct(Punct::Bind));
            }
            '<' if self.peek() == '=' => {
                self.advance();
                self.add_token(TokenKind::Op(Op::Le));
            }
            '<' => self.add_token(TokenKind::Op(Op::Lt)),
            '>' if self.peek() == '=' => {
                self.advance();
                self.add_token(TokenKind::Op(Op::Ge));
            }
            '>' => self.add_token(TokenKind::Op(Op::Gt)),
            '+' => self.add_token(TokenKind::Op(Op::Plus)),
            '*' => self.add_token(TokenKind::Op(Op::Star)),
            '/' => self.add_token(TokenKind::Op(Op::Slash)),
            '"' => self.scan_string(),
            '_' if !Self::is_ident_continue(self.peek()) => {
                self.add_token(TokenKind::Punct(Punct::Underscore))
            }
            c if c.is_ascii_digit() => self.scan_number(c),
            c if Self::is_ident_start(c) => self.scan_identifier_or_keyword(),
            other => {
                let span = self.current_span();
                self.errors.push(Error::LexInvalidChar { found: other, span });
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while self.peek() != '\n' && !self.is_at_end() {
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // consume '|'
        let mut depth = 1usize;
        while depth > 0 && !self.is_at_end() {
            if self.peek() == '#' && self.peek_next() == '|' {
                self.advance();
                self.advance();
                depth += 1;
            } else if self.peek() == '|' && self.peek_next() == '#' {
                self.advance();
                self.advance();
                depth -= 1;
            } else {
                self.advance();
            }
        }
    }

    fn scan_string(&mut self) {
        let mut value = String::new();
        while self.peek() != '"' && !self.is_at_end() {
            let c = self.advance();
            if c == '\\' {
                let escape_start = self.current - 1;
                let esc = self.advance();
                let resolved = match esc {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '"' => '"',
                    '0' => '\0',
                    other => {
                        let span = Span::new(
                            self.byte_offsets[escape_start],
                            self.byte_offsets[self.current],
                        );
                        self.errors.push(Error::LexBadEscape { escape: other, span });
                        other
                    }
                };
                value.push(resolved);
            } else {
                value.push(c);
            }
        }
        if self.is_at_end() {
            self.errors.push(Error::LexUnterminatedString {
                span: self.current_span(),
            });
            return;
        }
        self.advance(); // closing quote
        self.add_token(TokenKind::Str(value));
    }

    fn scan_number(&mut self, first: char) {
        let mut text = String::new();
        text.push(first);
        while self.peek().is_ascii_digit() {
            text.push(self.advance());
        }
        if self.peek() == '/' && self.peek_next().is_ascii_digit() {
            self.advance(); // '/'
            let mut denom = String::new();
            while self.peek().is_ascii_digit() {
                denom.push(self.advance());
            }
            let num: i64 = text.parse().unwrap_or(0);
            let den: i64 = denom.parse().unwrap_or(1);
            self.add_token(TokenKind::Rational(num, den));
            return;
        }
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            text.push(self.advance()); // '.'
            while self.peek().is_ascii_digit() {
                text.push(self.advance());
            }
            if (self.peek() == 'e' || self.peek() == 'E')
                && (self.peek_next().is_ascii_digit()
                    || ((self.peek_next() == '+' || self.peek_next() == '-')))
            {
                text.push(self.advance());
                text.push(self.advance());
                while self.peek().is_ascii_digit() {
                    text.push(self.advance());
                }
            }
            let value: f64 = text.parse().unwrap_or(0.0);
            self.add_token(TokenKind::Float(value));
            return;
        }
        let value: i64 = text.parse().unwrap_or(0);
        self.add_token(TokenKind::Int(value));
    }

    fn is_ident_start(c: char) -> bool {
        c.is_alphabetic() || c == '_'
    }

    fn is_ident_continue(c: char) -> bool {
        c.is_alphanumeric() || c == '_' || c == '-' || c == '?' || c == '!'
    }

    fn scan_identifier_or_keyword(&mut self) {
        while Self::is_ident_continue(self.peek()) {
            self.advance();
        }
        // A trailing hyphen run followed by digits would have been consumed
        // above; hyphenated keywords like `bet-weighted` fall out naturally.
        let text: String = self.source[self.start..self.current].iter().collect();
        match text.as_str() {
            "true" => self.add_token(TokenKind::Bool(true)),
            "false" => self.add_token(TokenKind::Bool(false)),
            "and" => self.add_token(TokenKind::Op(Op::And)),
            "or" => self.add_token(TokenKind::Op(Op::Or)),
            "not" => self.add_token(TokenKind::Op(Op::Not)),
            "end" => self.add_token(TokenKind::End),
            _ => {
                if let Some(kw) = Keyword::from_str(&text) {
                    self.add_token(TokenKind::Keyword(kw));
                } else {
                    self.add_token(TokenKind::Identifier(text));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, errors) = Scanner::new(source).scan_tokens();
        assert!(errors.is_empty(), "unexpected lex errors: {:?}", errors);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scans_sexpr_bet() {
        let ks = kinds("(bet a b c)");
        assert_eq!(
            ks,
            vec![
                TokenKind::Punct(Punct::LParen),
                TokenKind::Keyword(Keyword::Bet),
                TokenKind::Identifier("a".into()),
                TokenKind::Identifier("b".into()),
                TokenKind::Identifier("c".into()),
                TokenKind::Punct(Punct::RParen),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scans_hyphenated_identifier_and_keyword() {
        let ks = kinds("bet-weighted my-var");
        assert_eq!(
            ks,
            vec![
                TokenKind::Keyword(Keyword::BetWeighted),
                TokenKind::Identifier("my-var".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scans_rational_and_negative_number() {
        let ks = kinds("3/4 -5");
        assert_eq!(
            ks,
            vec![
                TokenKind::Rational(3, 4),
                TokenKind::Int(-5),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn minus_with_space_is_an_operator() {
        let ks = kinds("(- 5 3)");
        assert_eq!(
            ks,
            vec![
                TokenKind::Punct(Punct::LParen),
                TokenKind::Op(Op::Minus),
                TokenKind::Int(5),
                TokenKind::Int(3),
                TokenKind::Punct(Punct::RParen),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scans_string_with_escapes() {
        let ks = kinds("\"a\\nb\"");
        assert_eq!(ks, vec![TokenKind::Str("a\nb".into()), TokenKind::Eof]);
    }

    #[test]
    fn unterminated_string_is_a_lex_error() {
        let (_tokens, errors) = Scanner::new("\"abc").scan_tokens();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], Error::LexUnterminatedString { .. }));
    }

    #[test]
    fn nested_block_comments_are_skipped() {
        let ks = kinds("#| outer #| inner |# still-outer |# 42");
        assert_eq!(ks, vec![TokenKind::Int(42), TokenKind::Eof]);
    }

    #[test]
    fn line_comments_both_styles() {
        let ks = kinds("1 ; a comment\n2 // another\n3");
        assert_eq!(
            ks,
            vec![
                TokenKind::Int(1),
                TokenKind::Punct(Punct::Newline),
                TokenKind::Int(2),
                TokenKind::Punct(Punct::Newline),
                TokenKind::Int(3),
                TokenKind::Eof,
            ]
        );
    }
}
