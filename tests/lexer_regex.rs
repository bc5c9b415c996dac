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

#[test]
fn regex_after_operators() {
    let tokens = lex("x = /abc/i");
    assert_eq!(tokens[2].tag, Tag::Regex);
    assert_eq!(tokens[2].value, "/abc/i");

    let tokens = lex("f(/x/g)");
    assert_eq!(tokens[2].tag, Tag::Regex);
    assert_eq!(tokens[2].value, "/x/g");
}

#[test]
fn division_after_values() {
    // unspaced identifiers divide
    assert_eq!(
        pairs("a/b/c"),
        vec![
            (Tag::Identifier, "a".into()),
            (Tag::Math, "/".into()),
            (Tag::Identifier, "b".into()),
            (Tag::Math, "/".into()),
            (Tag::Identifier, "c".into()),
            (Tag::Terminator, "\n".into()),
        ]
    );
    assert_eq!(pairs("1/2")[1], (Tag::Math, "/".into()));
    assert_eq!(pairs("x[0]/2")[4], (Tag::Math, "/".into()));
}

#[test]
fn spaced_identifier_allows_regex() {
    let tokens = lex("a /x/ g");
    assert_eq!(tokens[1].tag, Tag::Regex);
    assert_eq!(tokens[1].value, "/x/");
}

#[test]
fn spaced_number_still_divides() {
    // numbers forbid a following regex even when spaced
    let tokens = lex("1 /2/ 3");
    assert_eq!(tokens[1].tag, Tag::Math);
}

#[test]
fn character_classes_may_hold_slashes() {
    let tokens = lex("x = /[/]/");
    assert_eq!(tokens[2].tag, Tag::Regex);
    assert_eq!(tokens[2].value, "/[/]/");
}

#[test]
fn regex_spans() {
    let tokens = lex("x = /ab/gi");
    assert_eq!(tokens[2].loc.first_column, 4);
    assert_eq!(tokens[2].loc.last_column, 9);
}

#[test]
fn empty_regex_is_floor_division() {
    assert_eq!(
        pairs("a // b"),
        vec![
            (Tag::Identifier, "a".into()),
            (Tag::Math, "//".into()),
            (Tag::Identifier, "b".into()),
            (Tag::Terminator, "\n".into()),
        ]
    );
    assert_eq!(pairs("a //= b")[1], (Tag::CompoundAssign, "//=".into()));
}

#[test]
fn regex_starting_with_star_rejects() {
    assert_eq!(
        tokenize("x = /* y/", &Options::default()).unwrap_err().kind,
        LexErrorKind::RegexStartsWithStar
    );
    assert_eq!(
        tokenize("///* y///", &Options::default()).unwrap_err().kind,
        LexErrorKind::RegexStartsWithStar
    );
}

#[test]
fn heregex_strips_whitespace_and_comments() {
    let tokens = lex("x = ///a  b///g");
    assert_eq!(tokens[2].tag, Tag::Regex);
    assert_eq!(tokens[2].value, "/ab/g");

    let tokens = lex("x = /// a # note\n b ///");
    assert_eq!(tokens[2].value, "/ab/");
}

#[test]
fn heregex_escapes_slashes() {
    let tokens = lex("x = ///a/b///");
    assert_eq!(tokens[2].value, "/a\\/b/");
}

#[test]
fn heregex_ignores_lookback() {
    // unlike inline regexes, a heregex may directly follow a value
    let tokens = lex("a///x///");
    assert_eq!(tokens[1].tag, Tag::Regex);
    assert_eq!(tokens[1].value, "/x/");
}

#[test]
fn interpolated_heregex_becomes_regexp_call() {
    let shape: Vec<_> = lex("///a#{x}///gi")
        .into_iter()
        .map(|t| (t.tag, t.value))
        .collect();
    assert_eq!(
        shape,
        vec![
            (Tag::Identifier, "RegExp".into()),
            (Tag::CallStart, "(".into()),
            (Tag::String, "\"a\"".into()),
            (Tag::Plus, "+".into()),
            (Tag::Identifier, "x".into()),
            (Tag::Comma, ",".into()),
            (Tag::String, "\"gi\"".into()),
            (Tag::RParen, ")".into()),
            (Tag::Terminator, "\n".into()),
        ]
    );
}

#[test]
fn unterminated_heregex_relexes_as_division() {
    assert_eq!(
        pairs("///x"),
        vec![
            (Tag::Math, "//".into()),
            (Tag::Math, "/".into()),
            (Tag::Identifier, "x".into()),
            (Tag::Terminator, "\n".into()),
        ]
    );
}

#[test]
fn regex_flags_stop_at_word_boundaries() {
    // `gx` is not a flag run, so this cannot be a regex at all
    let tokens = lex("a = b /c/gx");
    let has_regex = tokens.iter().any(|t| t.tag == Tag::Regex);
    assert!(!has_regex);
}

#[test]
fn interpolation_skips_embedded_regexes() {
    // the `}` inside the regex must not close the fragment
    let tokens = lex(r##""#{a(/}/)}""##);
    assert!(tokens.iter().any(|t| t.tag == Tag::Regex && t.value == "/}/"));
}
