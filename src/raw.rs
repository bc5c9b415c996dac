//! Raw token layer: a Logos DFA over the cleaned source.
//!
//! Everything regular lives here. Constructs the DFA cannot recognize —
//! balanced interpolation, regex-vs-division, comment runs with their
//! herecomment carve-out — surface as minimal trigger tokens (`"`,`'`,
//! backtick, `#`, `###`, `/`, `///`) that the cooking layer grows with
//! [`logos::Lexer::bump`] after a hand scan.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawTok {
    // -- Trivia -------------------------------------------------------------
    /// Horizontal whitespace. Kept as a token so the previous token can be
    /// flagged `spaced`.
    #[regex(r"[ \t\x0B\x0C]+")]
    Ws,

    /// One or more newline-terminated whitespace runs; the indentation
    /// engine reads the width after the final newline.
    #[regex(r"(\n[ \t\x0B\x0C]*)+")]
    Line,

    /// Possible herecomment opener; the cooking layer decides between a
    /// `### … ###` block and comment fall-through.
    #[token("###")]
    TripleHash,

    /// Line comment trigger; the run scanner consumes to end of line(s).
    #[token("#")]
    Hash,

    // -- Literals -----------------------------------------------------------
    #[regex(r"[A-Za-z_$\x{80}-\x{10FFFF}][A-Za-z0-9_$\x{80}-\x{10FFFF}]*")]
    Ident,

    /// Binary, octal, hex, or decimal literal. Case errors and legacy octal
    /// forms are diagnosed after the match so `0B1` is one bad number, not a
    /// number and an identifier.
    #[regex(r"0[bB][01]+|0[oO][0-7]+|0[xX][0-9a-fA-F]+|[0-9]*\.?[0-9]+([eE][+-]?[0-9]+)?")]
    Number,

    /// Single-quoted string, no interpolation. Unterminated forms fail this
    /// pattern and surface as `SQuote`.
    #[regex(r"'[^'\\]*(\\[^\n][^'\\]*)*'")]
    SqString,

    /// Double-quote opener; the cooking layer runs the balanced scan to the
    /// matching terminator, honoring interpolation.
    #[token("\"")]
    DQuote,

    /// Triple-quoted heredocs, ending at the first unescaped closer.
    #[regex(r#""""("{0,2}([^"\\]|\\(?s:.)))*""""#)]
    TdqHeredoc,

    #[regex(r"'''('{0,2}([^'\\]|\\(?s:.)))*'''")]
    TsqHeredoc,

    /// Unterminated single-quoted string; falls through to a `'` literal.
    #[token("'")]
    SQuote,

    /// Embedded JavaScript between backticks.
    #[regex(r"`[^`\\]*(\\[^\n][^`\\]*)*`")]
    JsLiteral,

    #[token("`")]
    Backtick,

    // -- Operators ----------------------------------------------------------
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,

    #[token("-=")]
    SubAssign,
    #[token("+=")]
    AddAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    DivAssign,
    #[token("%=")]
    ModAssign,
    #[token("&=")]
    AndAssign,
    #[token("|=")]
    OrAssign,
    #[token("^=")]
    XorAssign,
    #[token("!=")]
    NotEq,
    #[token("?=")]
    ExistsAssign,
    #[token("==")]
    EqEq,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,

    #[token(">>>=")]
    UShrAssign,
    #[token(">>>")]
    UShr,

    #[token("++")]
    Inc,
    #[token("--")]
    Dec,
    #[token("::")]
    Proto,

    #[token("&&=")]
    AndAndAssign,
    #[token("||=")]
    OrOrAssign,
    #[token("<<=")]
    ShlAssign,
    #[token(">>=")]
    ShrAssign,
    #[token("**=")]
    PowAssign,
    #[token("//=")]
    FloorDivAssign,
    #[token("%%=")]
    ModModAssign,

    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("**")]
    Pow,
    #[token("%%")]
    ModMod,

    /// `//` lexes as floor division, never as an empty regex.
    #[token("//")]
    FloorDiv,

    /// Heregex opener `///`; the cooking layer scans for the closing triple
    /// slash and falls back to `//` + `/` when there is none.
    #[token("///")]
    HeregexStart,

    #[token("?.")]
    SoakAccess,
    #[token("?::")]
    SoakProto,

    #[token("...")]
    Ellipsis,
    #[token("..")]
    Range,

    // -- Single characters --------------------------------------------------
    #[token("=")]
    Eq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    /// Division or the start of an inline regex; previous-token lookback
    /// decides.
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("?")]
    Question,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token("@")]
    At,
    #[token("\\")]
    Backslash,

    /// Guaranteed fallback: any stray character becomes a one-char literal.
    #[regex(r"(?s:.)", priority = 0)]
    Any,
}
