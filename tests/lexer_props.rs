use mocha_lexer::{tokenize, Options, Tag};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]
    #[test]
    fn never_panics_and_keeps_invariants(s in ".*") {
        // Errors are fine; panics and broken streams are not.
        let Ok(tokens) = tokenize(&s, &Options::default()) else { return Ok(()) };

        let mut indents = 0usize;
        let mut outdents = 0usize;
        for t in &tokens {
            // spans are inclusive and ordered within a token
            prop_assert!(
                t.loc.first_line <= t.loc.last_line,
                "line order: {:?} in {s:?}", t
            );
            if t.loc.first_line == t.loc.last_line {
                prop_assert!(
                    t.loc.first_column <= t.loc.last_column,
                    "column order: {:?} in {s:?}", t
                );
            }
            match t.tag {
                Tag::Indent => indents += 1,
                Tag::Outdent => outdents += 1,
                _ => {}
            }
        }
        // every INDENT has exactly one OUTDENT once lexing succeeds
        prop_assert_eq!(indents, outdents, "unbalanced stream for {:?}", s);
    }

    #[test]
    fn ascii_sources_lex_or_fail_cleanly(s in "[ -~\n]{0,64}") {
        let _ = tokenize(&s, &Options::default());
    }

    #[test]
    fn identifiers_round_trip(name in "[a-zA-Z_$][a-zA-Z0-9_$]{0,12}") {
        let Ok(tokens) = tokenize(&name, &Options::default()) else { return Ok(()) };
        prop_assert!(!tokens.is_empty());
        // whatever classification applies, the surface or its alias survives
        let first = &tokens[0];
        if first.tag == Tag::Identifier {
            prop_assert_eq!(&first.value, &name);
        }
    }
}
