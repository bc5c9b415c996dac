// fuzz_targets/lexer.rs
#![no_main]

use libfuzzer_sys::fuzz_target;
use mocha_lexer::{tokenize, Options, Tag};

fuzz_target!(|data: &[u8]| {
    // Lossy conversion so invalid UTF-8 doesn't end the run early.
    let s = String::from_utf8_lossy(data);

    let Ok(tokens) = tokenize(&s, &Options::default()) else {
        return;
    };

    let mut indents = 0usize;
    let mut outdents = 0usize;

    for t in &tokens {
        assert!(t.loc.first_line <= t.loc.last_line);
        if t.loc.first_line == t.loc.last_line {
            assert!(t.loc.first_column <= t.loc.last_column);
        }
        match t.tag {
            Tag::Indent => indents += 1,
            Tag::Outdent => outdents += 1,
            _ => {}
        }
    }

    assert_eq!(indents, outdents);
});
