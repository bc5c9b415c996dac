//! Seam for the downstream token rewriter.
//!
//! The rewriter proper (implicit parens, call disambiguation, postfix
//! conditionals) lives with the parser; the lexer only promises to hand it
//! the raw stream exactly once when rewriting is enabled.

use crate::error::LexError;
use crate::token::Token;

/// A post-processing pass over the token stream.
pub trait Rewrite {
    fn rewrite(&mut self, tokens: Vec<Token>) -> Result<Vec<Token>, LexError>;
}

/// Identity pass used when no rewriter is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRewriter;

impl Rewrite for NullRewriter {
    fn rewrite(&mut self, tokens: Vec<Token>) -> Result<Vec<Token>, LexError> {
        Ok(tokens)
    }
}
