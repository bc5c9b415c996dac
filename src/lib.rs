//! Lexer for Mocha, an indentation-sensitive, expression-oriented scripting
//! language that compiles to JavaScript.
//!
//! The lexer is two layers, the way `rustc_lexer` splits raw scanning from
//! cooking:
//!
//! - a [Logos](https://docs.rs/logos) raw-token DFA over the cleaned source
//!   (`raw`), covering everything regular;
//! - a contextual cooking layer (`lexer`) that owns keyword and alias
//!   resolution, regex-vs-division lookback, the INDENT/OUTDENT/TERMINATOR
//!   indentation engine, delimiter pairing, and the recursive interpolation
//!   sublexer.
//!
//! The output is an ordered stream of [`Token`]s with inclusive line/column
//! spans, ready for an LALR-style parser. Errors are fatal at lex time and
//! carry the position where scanning stopped.
//!
//! ```
//! use mocha_lexer::{tokenize, Options, Tag};
//!
//! let tokens = tokenize("a = 1", &Options::default()).unwrap();
//! let tags: Vec<_> = tokens.iter().map(|t| t.tag).collect();
//! assert_eq!(
//!     tags,
//!     vec![Tag::Identifier, Tag::Assign, Tag::Number, Tag::Terminator]
//! );
//! ```

pub mod error;
pub mod lexer;
mod raw;
pub mod rewriter;
mod strings;
pub mod tables;
pub mod token;

pub use error::{LexError, LexErrorKind};
pub use lexer::Options;
pub use rewriter::{NullRewriter, Rewrite};
pub use tables::{reserved_words, RESERVED, STRICT_PROSCRIBED};
pub use token::{Loc, Tag, Token};

/// Tokenize a source string. When `opts.rewrite` is on the stream passes
/// through the identity rewriter; wire a real one with [`tokenize_with`].
pub fn tokenize(code: &str, opts: &Options) -> Result<Vec<Token>, LexError> {
    tokenize_with(code, opts, &mut NullRewriter)
}

/// Tokenize and, when `opts.rewrite` is on, hand the stream to `rewriter`
/// exactly once.
pub fn tokenize_with<R: Rewrite>(
    code: &str,
    opts: &Options,
    rewriter: &mut R,
) -> Result<Vec<Token>, LexError> {
    let tokens = lexer::tokenize(code, opts)?;
    if opts.rewrite {
        rewriter.rewrite(tokens)
    } else {
        Ok(tokens)
    }
}
