use mocha_lexer::{tokenize, Options};
use walkdir::WalkDir;

#[test]
fn lexes_mocha_corpus_if_configured() {
    let Some(root) = std::env::var_os("MOCHA_LEXER_CORPUS") else {
        eprintln!("MOCHA_LEXER_CORPUS not set; skipping corpus test");
        return;
    };

    let root = root.to_string_lossy().to_string();
    let mut total = 0usize;
    let mut failed = 0usize;

    for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("mocha") {
            continue;
        }

        total += 1;
        let src = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(_) => continue,
        };

        if let Err(e) = tokenize(&src, &Options::default()) {
            failed += 1;
            eprintln!("FAILED: {}", path.display());
            eprintln!("  {e}");
            if failed > 16 {
                break;
            }
        }
    }

    eprintln!("corpus: {total} files, {failed} failed");
    assert_eq!(failed, 0, "{failed}/{total} corpus files failed to lex");
}
