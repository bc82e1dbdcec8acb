//! Lexer (C3): UTF-8 source to spanned tokens.

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Keyword, Op, Punct, Token, TokenKind};

use crate::error::Error;

/// Scans `source` into a token stream. `Punct::Newline` tokens are kept in
/// the stream; the parser skips them everywhere except inside `do` blocks,
/// where a newline is a statement separator.
pub fn lex(source: &str) -> (Vec<Token>, Vec<Error>) {
    Scanner::new(source).scan_tokens()
}
