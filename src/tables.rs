//! Keyword, alias, and operator tables. Pure data; the lexer consults these
//! during classification.

use crate::token::Tag;

/// Keywords shared with JavaScript, passed through with an uppercased tag.
pub const JS_KEYWORDS: &[&str] = &[
    "true",
    "false",
    "null",
    "this",
    "new",
    "delete",
    "typeof",
    "in",
    "instanceof",
    "return",
    "throw",
    "break",
    "continue",
    "debugger",
    "if",
    "else",
    "switch",
    "for",
    "while",
    "do",
    "try",
    "catch",
    "finally",
    "class",
    "extends",
    "super",
];

/// Keywords that only exist in Mocha.
pub const MOCHA_KEYWORDS: &[&str] = &[
    "undefined",
    "then",
    "unless",
    "until",
    "loop",
    "of",
    "by",
    "when",
    // aliases, resolved through ALIASES below
    "and",
    "or",
    "is",
    "isnt",
    "not",
    "yes",
    "no",
    "on",
    "off",
];

/// Alias surface forms and the values they normalize to.
pub const ALIASES: &[(&str, &str)] = &[
    ("and", "&&"),
    ("or", "||"),
    ("is", "=="),
    ("isnt", "!="),
    ("not", "!"),
    ("yes", "true"),
    ("no", "false"),
    ("on", "true"),
    ("off", "false"),
];

/// Words that cannot be used as identifiers but are not Mocha keywords:
/// future JS reserved words plus the helper names the compiler emits into
/// its JavaScript output.
pub const RESERVED: &[&str] = &[
    "case",
    "default",
    "function",
    "var",
    "void",
    "with",
    "const",
    "let",
    "enum",
    "export",
    "import",
    "native",
    "__hasProp",
    "__extends",
    "__slice",
    "__bind",
    "__indexOf",
    "implements",
    "interface",
    "package",
    "private",
    "protected",
    "public",
    "static",
    "yield",
];

/// Identifiers ECMAScript strict mode forbids as assignment targets.
pub const STRICT_PROSCRIBED: &[&str] = &["arguments", "eval"];

/// The full reserved-word list, for downstream compiler stages.
pub fn reserved_words() -> Vec<&'static str> {
    [JS_KEYWORDS, MOCHA_KEYWORDS, RESERVED, STRICT_PROSCRIBED].concat()
}

/// Words that may never appear as ordinary identifiers.
pub fn is_forbidden(word: &str) -> bool {
    JS_KEYWORDS.contains(&word) || RESERVED.contains(&word) || STRICT_PROSCRIBED.contains(&word)
}

pub fn is_keyword(word: &str) -> bool {
    JS_KEYWORDS.contains(&word) || MOCHA_KEYWORDS.contains(&word)
}

pub fn alias_for(word: &str) -> Option<&'static str> {
    ALIASES.iter().find(|(from, _)| *from == word).map(|(_, to)| *to)
}

// ---------------------------------------------------------------------------
// Operator categories, matched by surface value.
// ---------------------------------------------------------------------------

pub const COMPOUND_ASSIGN: &[&str] = &[
    "-=", "+=", "/=", "*=", "%=", "||=", "&&=", "?=", "<<=", ">>=", ">>>=", "&=", "^=", "|=",
    "**=", "//=", "%%=",
];

/// Keyword operators that tag as UNARY.
pub const UNARY: &[&str] = &["new", "typeof", "delete", "do"];

pub const UNARY_MATH: &[&str] = &["!", "~"];

pub const LOGIC: &[&str] = &["&&", "||", "&", "|", "^"];

pub const SHIFT: &[&str] = &["<<", ">>", ">>>"];

pub const COMPARE: &[&str] = &["==", "!=", "<", ">", "<=", ">="];

pub const MATH: &[&str] = &["*", "/", "%", "//", "%%"];

/// Relation keywords; `in`/`of` turn into FORIN/FOROF inside a `for` clause.
pub const RELATION: &[&str] = &["in", "of", "instanceof"];

pub const BOOL: &[&str] = &["true", "false"];

/// Closers that let an outdent land directly on `)`, `}`, or `]`.
pub const INDENTABLE_CLOSERS: &[char] = &[')', '}', ']'];

// ---------------------------------------------------------------------------
// Lookback sets, matched by tag.
// ---------------------------------------------------------------------------

/// Tags counted as line breaks for context decisions.
pub fn is_line_break(tag: &Tag) -> bool {
    matches!(tag, Tag::Indent | Tag::Outdent | Tag::Terminator)
}

/// Tokens after which a slash can never start a regex.
pub fn not_regex(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Number | Tag::Regex | Tag::Bool | Tag::Null | Tag::Undefined | Tag::Inc | Tag::Dec
    )
}

/// Tokens after which an *unspaced* slash can never start a regex.
pub fn not_spaced_regex(tag: &Tag) -> bool {
    not_regex(tag)
        || matches!(
            tag,
            Tag::RParen | Tag::RBrace | Tag::This | Tag::Identifier | Tag::String | Tag::RBracket
        )
}

/// Tags that, followed without a space by `(`, start a call.
pub fn is_callable(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Identifier
            | Tag::String
            | Tag::Regex
            | Tag::RParen
            | Tag::RBracket
            | Tag::RBrace
            | Tag::Question
            | Tag::Proto
            | Tag::At
            | Tag::This
            | Tag::Super
    )
}

/// Tags that, followed without a space by `[`, start an index operation.
pub fn is_indexable(tag: &Tag) -> bool {
    is_callable(tag) || matches!(tag, Tag::Number | Tag::Bool | Tag::Null | Tag::Undefined)
}

/// Tags whose line is considered unfinished, suppressing the TERMINATOR a
/// newline would otherwise produce.
pub fn unfinished_tag(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Backslash
            | Tag::Dot
            | Tag::SoakAccess
            | Tag::SoakProto
            | Tag::Unary
            | Tag::Math
            | Tag::UnaryMath
            | Tag::Plus
            | Tag::Minus
            | Tag::Pow
            | Tag::Shift
            | Tag::Relation
            | Tag::Compare
            | Tag::Logic
            | Tag::Throw
            | Tag::Extends
    )
}
