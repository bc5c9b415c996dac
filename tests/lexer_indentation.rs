use mocha_lexer::{tokenize, LexErrorKind, Options, Tag, Token};

fn lex(src: &str) -> Vec<Token> {
    match tokenize(src, &Options::default()) {
        Ok(tokens) => tokens,
        Err(e) => panic!("expected {src:?} to lex, got {e}"),
    }
}

fn pairs(src: &str) -> Vec<(Tag, String)> {
    lex(src).into_iter().map(|t| (t.tag, t.value)).collect()
}

fn tags(src: &str) -> Vec<Tag> {
    lex(src).into_iter().map(|t| t.tag).collect()
}

#[test]
fn block_gets_indent_outdent() {
    assert_eq!(
        pairs("if x\n  y\nz"),
        vec![
            (Tag::If, "if".into()),
            (Tag::Identifier, "x".into()),
            (Tag::Indent, "2".into()),
            (Tag::Identifier, "y".into()),
            (Tag::Outdent, "2".into()),
            (Tag::Terminator, "\n".into()),
            (Tag::Identifier, "z".into()),
            (Tag::Terminator, "\n".into()),
        ]
    );
}

#[test]
fn eof_closes_open_indentation() {
    assert_eq!(
        pairs("for own k, v of obj\n  k"),
        vec![
            (Tag::For, "for".into()),
            (Tag::Own, "own".into()),
            (Tag::Identifier, "k".into()),
            (Tag::Comma, ",".into()),
            (Tag::Identifier, "v".into()),
            (Tag::ForOf, "of".into()),
            (Tag::Identifier, "obj".into()),
            (Tag::Indent, "2".into()),
            (Tag::Identifier, "k".into()),
            (Tag::Outdent, "2".into()),
            (Tag::Terminator, "\n".into()),
        ]
    );
}

#[test]
fn same_level_newline_is_terminator() {
    assert_eq!(
        tags("a\nb\nc"),
        vec![
            Tag::Identifier,
            Tag::Terminator,
            Tag::Identifier,
            Tag::Terminator,
            Tag::Identifier,
            Tag::Terminator,
        ]
    );
    // blank lines collapse into one boundary
    assert_eq!(tags("a\n\n\nb").len(), 4);
}

#[test]
fn nested_blocks_unwind_with_debt() {
    assert_eq!(
        pairs("if a\n    if b\n        c\n  d"),
        vec![
            (Tag::If, "if".into()),
            (Tag::Identifier, "a".into()),
            (Tag::Indent, "4".into()),
            (Tag::If, "if".into()),
            (Tag::Identifier, "b".into()),
            (Tag::Indent, "4".into()),
            (Tag::Identifier, "c".into()),
            (Tag::Outdent, "6".into()),
            (Tag::Outdent, "2".into()),
            (Tag::Terminator, "\n".into()),
            (Tag::Identifier, "d".into()),
            (Tag::Terminator, "\n".into()),
        ]
    );
}

#[test]
fn continuation_lines_do_not_open_blocks() {
    // over-indentation after a dangling operator is debt, not an INDENT
    assert_eq!(
        pairs("a = 1 +\n    2\nb"),
        vec![
            (Tag::Identifier, "a".into()),
            (Tag::Assign, "=".into()),
            (Tag::Number, "1".into()),
            (Tag::Plus, "+".into()),
            (Tag::Number, "2".into()),
            (Tag::Terminator, "\n".into()),
            (Tag::Identifier, "b".into()),
            (Tag::Terminator, "\n".into()),
        ]
    );
}

#[test]
fn leading_dot_continues_the_line() {
    assert_eq!(
        tags("a\n  .b"),
        vec![
            Tag::Identifier,
            Tag::Dot,
            Tag::Identifier,
            Tag::Terminator,
        ]
    );
}

#[test]
fn backslash_continuation_is_popped() {
    assert_eq!(
        pairs("a = \\\n  b"),
        vec![
            (Tag::Identifier, "a".into()),
            (Tag::Assign, "=".into()),
            (Tag::Identifier, "b".into()),
            (Tag::Terminator, "\n".into()),
        ]
    );
}

#[test]
fn semicolons_are_terminators() {
    assert_eq!(
        pairs("a; b"),
        vec![
            (Tag::Identifier, "a".into()),
            (Tag::Terminator, ";".into()),
            (Tag::Identifier, "b".into()),
            (Tag::Terminator, "\n".into()),
        ]
    );
    // a semicolon right before a newline folds away
    assert_eq!(
        tags("a;\nb"),
        vec![
            Tag::Identifier,
            Tag::Terminator,
            Tag::Identifier,
            Tag::Terminator,
        ]
    );
}

#[test]
fn premature_closer_auto_closes_indent() {
    assert_eq!(
        tags("(a\n  b)"),
        vec![
            Tag::LParen,
            Tag::Identifier,
            Tag::Indent,
            Tag::Identifier,
            Tag::Outdent,
            Tag::RParen,
            Tag::Terminator,
        ]
    );
}

#[test]
fn outdent_onto_closer_rounds_up() {
    assert_eq!(
        tags("f(\n  a\n)"),
        vec![
            Tag::Identifier,
            Tag::CallStart,
            Tag::Indent,
            Tag::Identifier,
            Tag::Outdent,
            Tag::Terminator,
            Tag::RParen,
            Tag::Terminator,
        ]
    );
}

#[test]
fn indents_and_outdents_balance() {
    let srcs = [
        "if a\n  b",
        "if a\n  if b\n    c",
        "if a\n  if b\n    c\nd",
        "class A\n  m: ->\n    1\n  n: ->\n    2",
    ];
    for src in srcs {
        let tokens = lex(src);
        let indents = tokens.iter().filter(|t| t.tag == Tag::Indent).count();
        let outdents = tokens.iter().filter(|t| t.tag == Tag::Outdent).count();
        assert_eq!(indents, outdents, "unbalanced stream for {src:?}");
    }
}

#[test]
fn first_line_indentation_sets_the_floor() {
    // an indented first line establishes the base without an INDENT token
    assert_eq!(
        tags("  a\n  b"),
        vec![
            Tag::Identifier,
            Tag::Terminator,
            Tag::Identifier,
            Tag::Terminator,
        ]
    );
}

#[test]
fn dedent_below_the_floor_rejects() {
    let err = tokenize("  a\nb", &Options::default()).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::MissingIndentation);
}

#[test]
fn unmatched_and_unclosed_delimiters() {
    assert_eq!(
        tokenize("(]", &Options::default()).unwrap_err().kind,
        LexErrorKind::Unmatched("]".into())
    );
    assert_eq!(
        tokenize("(a", &Options::default()).unwrap_err().kind,
        LexErrorKind::MissingCloser(")".into())
    );
    assert_eq!(
        tokenize("{[", &Options::default()).unwrap_err().kind,
        LexErrorKind::MissingCloser("]".into())
    );
}

#[test]
fn tab_indentation_counts_columns() {
    assert_eq!(
        pairs("if x\n\ty"),
        vec![
            (Tag::If, "if".into()),
            (Tag::Identifier, "x".into()),
            (Tag::Indent, "1".into()),
            (Tag::Identifier, "y".into()),
            (Tag::Outdent, "1".into()),
            (Tag::Terminator, "\n".into()),
        ]
    );
}
