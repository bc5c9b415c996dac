use thiserror::Error;

/// Everything the lexer can reject. Messages carry the offending surface
/// text where it helps the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("reserved word \"{0}\"")]
    ReservedWord(String),
    #[error("reserved word \"{0}\" can't be assigned")]
    ReservedAssignment(String),
    #[error("radix prefix in '{0}' must be lowercase")]
    UppercaseRadixPrefix(String),
    #[error("exponential notation in '{0}' must be indicated with a lowercase 'e'")]
    UppercaseExponent(String),
    #[error("decimal literal '{0}' must not be prefixed with '0'")]
    BadDecimalLiteral(String),
    #[error("octal literal '{0}' must be prefixed with '0o'")]
    LegacyOctalLiteral(String),
    #[error("octal escape sequences are not allowed")]
    OctalEscape,
    #[error("regular expressions cannot begin with `*`")]
    RegexStartsWithStar,
    #[error("block comments cannot contain \"*/\"")]
    BlockCommentTerminator,
    #[error("missing indentation")]
    MissingIndentation,
    #[error("missing {0}")]
    MissingCloser(String),
    #[error("unmatched {0}")]
    Unmatched(String),
    #[error("invalid token")]
    InvalidToken,
}

impl Default for LexErrorKind {
    fn default() -> Self {
        LexErrorKind::InvalidToken
    }
}

/// A fatal syntax error with the zero-based position where lexing stopped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} at {first_line}:{first_column}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub first_line: usize,
    pub first_column: usize,
}

impl LexError {
    pub fn new(kind: LexErrorKind, first_line: usize, first_column: usize) -> Self {
        LexError {
            kind,
            first_line,
            first_column,
        }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}
