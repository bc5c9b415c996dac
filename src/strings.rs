//! Strings, heredocs, regexes, and the interpolation sublexer.
//!
//! Double-quoted bodies are found with an escape-aware balanced scan rather
//! than a pattern, since interpolation admits nested strings, regexes, and
//! brace pairs. Each `#{…}` fragment is handed to a fresh lexer instance
//! started at the fragment's absolute line/column, and the results are
//! spliced back as a parenthesized `+`-joined concatenation.

use crate::error::{LexError, LexErrorKind};
use crate::lexer::{tokenize, Lexer, Options};
use crate::tables;
use crate::token::{Loc, Tag, Token};

/// One segment of an interpolated body: raw text or the token splice of an
/// expression fragment.
pub(crate) enum Piece {
    Str {
        value: String,
        offset: usize,
        len: usize,
    },
    Toks(Vec<Token>),
}

pub(crate) struct InterpOpts<'a> {
    pub heredoc: bool,
    pub offset_in_chunk: usize,
    pub str_offset: usize,
    pub lexed_length: usize,
    /// Chunk offset of each body byte, for bodies that were rewritten
    /// (heredoc dedenting) before interpolation.
    pub offset_map: Option<&'a [usize]>,
}

impl<'src> Lexer<'src> {
    // -- Plain strings -------------------------------------------------------

    pub(crate) fn simple_string_token(&mut self) -> Result<(), LexError> {
        let src = self.src;
        let string = &src[self.raw.span()];
        self.octal_escape_check(string)?;
        let body = &string[1..string.len() - 1];
        let value = format!("'{}'", escape_lines(body, false));
        self.token(Tag::String, &value, 0, string.len());
        Ok(())
    }

    pub(crate) fn double_quote_token(&mut self) -> Result<(), LexError> {
        let src = self.src;
        let chunk = &src[self.chunk_start..];
        let string = match balanced_string(chunk, '"') {
            Ok(s) => s,
            Err(missing) => {
                return Err(self.error_at(LexErrorKind::MissingCloser(missing.to_string()), 0))
            }
        };
        self.octal_escape_check(string)?;
        let len = string.len();
        self.raw.bump(len - 1);
        let body = &string[1..len - 1];
        if body.contains("#{") {
            self.interpolate_string(
                body,
                InterpOpts {
                    heredoc: false,
                    offset_in_chunk: 0,
                    str_offset: 1,
                    lexed_length: len,
                    offset_map: None,
                },
            )
        } else {
            let value = format!("\"{}\"", escape_lines(body, false));
            self.token(Tag::String, &value, 0, len);
            Ok(())
        }
    }

    /// `\1`–`\7` and `\0` followed by another octal digit are JavaScript
    /// octal escapes; strict mode rejects them, so we do too.
    fn octal_escape_check(&self, string: &str) -> Result<(), LexError> {
        let bytes = string.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'\\' {
                match bytes.get(i + 1) {
                    Some(b'0') => {
                        if matches!(bytes.get(i + 2), Some(c) if (b'0'..=b'7').contains(c)) {
                            return Err(self.error_at(LexErrorKind::OctalEscape, 0));
                        }
                    }
                    Some(c) if (b'1'..=b'7').contains(c) => {
                        return Err(self.error_at(LexErrorKind::OctalEscape, 0));
                    }
                    _ => {}
                }
                i += 2;
            } else {
                i += 1;
            }
        }
        Ok(())
    }

    // -- Heredocs ------------------------------------------------------------

    pub(crate) fn heredoc_token(&mut self, quote: char) -> Result<(), LexError> {
        let src = self.src;
        let heredoc = &src[self.raw.span()];
        let len = heredoc.len();
        let mut body = &heredoc[3..len - 3];
        // the closer absorbs one trailing newline plus its indentation
        if let Some(pos) = body.rfind('\n') {
            if body[pos + 1..].chars().all(|c| c != '\n' && c.is_whitespace()) {
                body = &body[..pos];
            }
        }
        // dedenting rewrites the body, so keep a byte-for-byte map back to
        // the chunk for interpolation positions
        let (mut doc, mut map) = dedent_heredoc(body, 3);
        if doc.starts_with('\n') {
            doc.remove(0);
            map.remove(0);
        }
        if quote == '"' && doc.contains("#{") {
            self.interpolate_string(
                &doc,
                InterpOpts {
                    heredoc: true,
                    offset_in_chunk: 0,
                    str_offset: 3,
                    lexed_length: len,
                    offset_map: Some(&map),
                },
            )
        } else {
            let value = make_string(&doc, quote, true);
            self.token(Tag::String, &value, 0, len);
            Ok(())
        }
    }

    // -- Regexes -------------------------------------------------------------

    pub(crate) fn slash_token(&mut self) -> Result<(), LexError> {
        let allowed = match self.tail() {
            Some(prev) if prev.spaced => !tables::not_regex(&prev.tag),
            Some(prev) => !tables::not_spaced_regex(&prev.tag),
            None => true,
        };
        if allowed {
            let src = self.src;
            let chunk = &src[self.chunk_start..];
            if let Some((len, regex, flags)) = match_inline_regex(chunk) {
                if regex.starts_with("/*") {
                    return Err(self.error_at(LexErrorKind::RegexStartsWithStar, 0));
                }
                self.raw.bump(len - 1);
                self.token(Tag::Regex, &format!("{regex}{flags}"), 0, len);
                return Ok(());
            }
        }
        self.literal_token("/")
    }

    pub(crate) fn heregex_token(&mut self) -> Result<(), LexError> {
        let src = self.src;
        let chunk = &src[self.chunk_start..];
        if let Some((len, body, flags)) = match_heregex(chunk) {
            self.raw.bump(len - 3);
            if !body.contains("#{") {
                let mut re = heregex_omit(body).replace('/', "\\/");
                if re.starts_with('*') {
                    return Err(self.error_at(LexErrorKind::RegexStartsWithStar, 0));
                }
                if re.is_empty() {
                    re = "(?:)".into();
                }
                self.token(Tag::Regex, &format!("/{re}/{flags}"), 0, len);
                return Ok(());
            }
            return self.interpolated_heregex(body, flags);
        }
        // no closing ///: `//` is floor division, and the rest re-lexes from
        // the third slash
        self.literal_token("//")?;
        let sub = &src[self.chunk_start + 2..];
        if let Some((len, regex, flags)) = match_inline_regex(sub) {
            if regex.starts_with("/*") {
                return Err(self.error_at(LexErrorKind::RegexStartsWithStar, 2));
            }
            if regex != "//" {
                self.raw.bump(2 + len - 3);
                self.token(Tag::Regex, &format!("{regex}{flags}"), 2, len);
                return Ok(());
            }
        }
        let op_len = if sub.starts_with("//=") {
            3
        } else if sub.starts_with("//") || sub.starts_with("/=") {
            2
        } else {
            1
        };
        self.raw.bump(2 + op_len - 3);
        let op = sub[..op_len].to_string();
        self.literal_token_at(&op, 2)
    }

    /// An interpolated heregex becomes a `RegExp(…)` call over the
    /// concatenated pieces, with the flags as a trailing string argument.
    fn interpolated_heregex(&mut self, body: &str, flags: &str) -> Result<(), LexError> {
        self.token(Tag::Identifier, "RegExp", 0, 0);
        self.token(Tag::CallStart, "(", 0, 0);
        let pieces = self.interpolate_pieces(body, 3, None)?;
        let mut toks: Vec<Token> = Vec::new();
        for piece in pieces {
            match piece {
                Piece::Toks(ts) => toks.extend(ts),
                Piece::Str { value, offset, len } => {
                    let stripped = heregex_omit(&value);
                    if stripped.is_empty() {
                        continue;
                    }
                    let escaped = stripped.replace('\\', "\\\\");
                    let tok = self.make_token(
                        Tag::String,
                        &make_string(&escaped, '"', true),
                        offset,
                        len,
                    );
                    toks.push(tok);
                }
            }
            let at = toks
                .last()
                .map(|t| (t.loc.last_line, t.loc.last_column))
                .unwrap_or((0, 0));
            toks.push(Token::new(
                Tag::Plus,
                "+",
                Loc {
                    first_line: at.0,
                    first_column: at.1,
                    last_line: at.0,
                    last_column: at.1,
                },
            ));
        }
        toks.pop();
        if toks.first().map_or(true, |t| t.tag != Tag::String) {
            self.token(Tag::String, "\"\"", 0, 0);
            self.token(Tag::Plus, "+", 0, 0);
        }
        self.tokens.append(&mut toks);
        if !flags.is_empty() {
            self.token(Tag::Comma, ",", 0, 0);
            self.token(Tag::String, &format!("\"{flags}\""), 0, flags.len());
        }
        self.token(Tag::RParen, ")", 0, 0);
        Ok(())
    }

    // -- Interpolation -------------------------------------------------------

    /// Split an interpolated body into raw segments and `#{…}` fragments.
    /// Fragments are tokenized by a fresh lexer started at the fragment's
    /// absolute coordinates, with its rewriter pass off; a surrounding
    /// TERMINATOR is dropped, and multi-token results are wrapped in
    /// synthetic parens.
    pub(crate) fn interpolate_pieces(
        &mut self,
        body: &str,
        str_offset: usize,
        offset_map: Option<&[usize]>,
    ) -> Result<Vec<Piece>, LexError> {
        // chunk offset of a body byte; rewritten bodies go through the map
        let at = |k: usize| match offset_map {
            Some(map) => match map.get(k) {
                Some(off) => *off,
                None => map.last().map_or(str_offset, |off| off + 1),
            },
            None => str_offset + k,
        };
        let mut pieces = Vec::new();
        let bytes = body.as_bytes();
        let mut pi = 0usize;
        let mut i = 0usize;
        while i < bytes.len() {
            if bytes[i] == b'\\' {
                i += 1;
                i += utf8_width(bytes.get(i).copied());
                continue;
            }
            if bytes[i] == b'#' && bytes.get(i + 1) == Some(&b'{') {
                let expr = match balanced_string(&body[i + 1..], '}') {
                    Ok(e) => e,
                    Err(missing) => {
                        return Err(
                            self.error_at(LexErrorKind::MissingCloser(missing.to_string()), 0)
                        )
                    }
                };
                if i > pi {
                    pieces.push(Piece::Str {
                        value: body[pi..i].to_string(),
                        offset: at(pi),
                        len: at(i - 1) + 1 - at(pi),
                    });
                }
                let inner = &expr[1..expr.len() - 1];
                if !inner.is_empty() {
                    // the expression starts right after `#{`
                    let expr_start = at(i + 2);
                    let (line, column) = self.line_col_at(expr_start);
                    let opts = Options {
                        line: line.max(0) as usize,
                        column,
                        literate: false,
                        rewrite: false,
                    };
                    let mut nested = tokenize(inner, &opts)?;
                    if nested.last().map(|t| &t.tag) == Some(&Tag::Terminator) {
                        nested.pop();
                    }
                    if nested.first().map(|t| &t.tag) == Some(&Tag::Terminator) {
                        nested.remove(0);
                    }
                    if !nested.is_empty() {
                        if nested.len() > 1 {
                            let open = self.make_token(Tag::LParen, "(", expr_start, 0);
                            let close = self.make_token(
                                Tag::RParen,
                                ")",
                                at(i + 2 + inner.len()),
                                0,
                            );
                            nested.insert(0, open);
                            nested.push(close);
                        }
                        pieces.push(Piece::Toks(nested));
                    }
                }
                i += expr.len() + 1;
                pi = i;
                continue;
            }
            i += utf8_width(Some(bytes[i]));
        }
        if i > pi && pi < body.len() {
            pieces.push(Piece::Str {
                value: body[pi..].to_string(),
                offset: at(pi),
                len: at(body.len() - 1) + 1 - at(pi),
            });
        }
        Ok(pieces)
    }

    pub(crate) fn interpolate_string(
        &mut self,
        body: &str,
        opts: InterpOpts<'_>,
    ) -> Result<(), LexError> {
        let mut pieces = self.interpolate_pieces(body, opts.str_offset, opts.offset_map)?;
        if pieces.is_empty() {
            self.token(Tag::String, "\"\"", opts.offset_in_chunk, opts.lexed_length);
            return Ok(());
        }
        // the concatenation must open with a string so `+` means append
        if !matches!(pieces.first(), Some(Piece::Str { .. })) {
            pieces.insert(
                0,
                Piece::Str {
                    value: String::new(),
                    offset: opts.offset_in_chunk,
                    len: 0,
                },
            );
        }
        let interpolated = pieces.len() > 1;
        if interpolated {
            self.token(Tag::LParen, "(", opts.offset_in_chunk, 0);
        }
        for (idx, piece) in pieces.into_iter().enumerate() {
            if idx > 0 {
                // `+` mirrors the start of the piece it introduces
                let (line, column) = match &piece {
                    Piece::Toks(ts) => (ts[0].loc.first_line, ts[0].loc.first_column),
                    Piece::Str { offset, .. } => {
                        let (l, c) = self.line_col_at(*offset);
                        (l.max(0) as usize, c)
                    }
                };
                self.tokens.push(Token::new(
                    Tag::Plus,
                    "+",
                    Loc {
                        first_line: line,
                        first_column: column,
                        last_line: line,
                        last_column: column,
                    },
                ));
            }
            match piece {
                Piece::Toks(ts) => self.tokens.extend(ts),
                Piece::Str { value, offset, len } => {
                    let tok = self.make_token(
                        Tag::String,
                        &make_string(&value, '"', opts.heredoc),
                        offset,
                        len,
                    );
                    self.tokens.push(tok);
                }
            }
        }
        if interpolated {
            let mut rparen = self.make_token(
                Tag::RParen,
                ")",
                opts.offset_in_chunk + opts.lexed_length,
                0,
            );
            rparen.string_end = true;
            self.tokens.push(rparen);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Balanced scanning and pattern helpers
// ---------------------------------------------------------------------------

/// Width of a UTF-8 sequence from its lead byte; callers only probe at
/// character boundaries.
fn utf8_width(byte: Option<u8>) -> usize {
    match byte {
        None => 0,
        Some(b) if b < 0x80 => 1,
        Some(b) if b < 0xE0 => 2,
        Some(b) if b < 0xF0 => 3,
        Some(_) => 4,
    }
}

/// Find the prefix of `s` closed by `end`, honoring escapes and, inside
/// interpolation expressions, nested strings, regexes, and brace pairs.
/// `s[0]` is the opening delimiter. Returns the unmatched closer on error.
pub(crate) fn balanced_string(s: &str, end: char) -> Result<&str, char> {
    let mut continue_count = 0usize;
    let mut stack = vec![end];
    let mut end = end;
    let mut prev: Option<char> = None;
    let mut iter = s.char_indices();
    iter.next();
    for (i, letter) in iter {
        if continue_count > 0 {
            continue_count -= 1;
            continue;
        }
        if letter == '\\' {
            continue_count += 1;
            continue;
        }
        if letter == end {
            stack.pop();
            if stack.is_empty() {
                return Ok(&s[..i + letter.len_utf8()]);
            }
            end = *stack.last().expect("stack still has an opener");
            continue;
        }
        if end == '}' && (letter == '"' || letter == '\'') {
            stack.push(letter);
            end = letter;
        } else if end == '}' && letter == '/' {
            // a regex may contain braces or quotes; skip over it whole
            let rest = &s[i..];
            let skip = match_heregex(rest)
                .map(|(len, _, _)| len)
                .or_else(|| match_inline_regex(rest).map(|(len, _, _)| len));
            if let Some(len) = skip {
                continue_count += rest[..len].chars().count() - 1;
            }
        } else if end == '}' && letter == '{' {
            stack.push('}');
        } else if end == '"' && prev == Some('#') && letter == '{' {
            stack.push('}');
            end = '}';
        }
        prev = Some(letter);
    }
    Err(stack.pop().unwrap_or(end))
}

/// Inline regex at the head of `chunk`: `/` not followed by whitespace or
/// `=`, a class-aware body with no raw newline, up to four flags, and no
/// word character directly after. Returns (total length, `/body/`, flags).
pub(crate) fn match_inline_regex(chunk: &str) -> Option<(usize, &str, &str)> {
    let bytes = chunk.as_bytes();
    if bytes.first() != Some(&b'/') {
        return None;
    }
    match chunk[1..].chars().next() {
        None => return None,
        Some(c) if c.is_whitespace() || c == '=' => return None,
        _ => {}
    }
    let mut i = 1;
    let body_end = loop {
        match bytes.get(i) {
            None | Some(b'\n') => return None,
            Some(b'/') => break i + 1,
            Some(b'\\') => {
                i += 1;
                let w = utf8_width(bytes.get(i).copied());
                if w == 0 {
                    return None;
                }
                i += w;
            }
            Some(b'[') => {
                i += 1;
                loop {
                    match bytes.get(i) {
                        None | Some(b'\n') => return None,
                        Some(b']') => {
                            i += 1;
                            break;
                        }
                        Some(b'\\') => {
                            i += 1;
                            let w = utf8_width(bytes.get(i).copied());
                            if w == 0 {
                                return None;
                            }
                            i += w;
                        }
                        Some(b) => i += utf8_width(Some(*b)),
                    }
                }
            }
            Some(b) => i += utf8_width(Some(*b)),
        }
    };
    let mut j = body_end;
    while matches!(bytes.get(j), Some(b'i' | b'm' | b'g' | b'y')) {
        j += 1;
    }
    if j - body_end > 4 {
        return None;
    }
    if matches!(bytes.get(j), Some(c) if c.is_ascii_alphanumeric() || *c == b'_') {
        return None;
    }
    Some((j, &chunk[..body_end], &chunk[body_end..j]))
}

/// Heregex at the head of `chunk`: `///`, a nonempty body, `///`, flags.
/// When a candidate closer fails the flags boundary, the body extends to the
/// next one. Returns (total length, body, flags).
pub(crate) fn match_heregex(chunk: &str) -> Option<(usize, &str, &str)> {
    if !chunk.starts_with("///") {
        return None;
    }
    let bytes = chunk.as_bytes();
    let mut search = 3;
    loop {
        let rel = chunk[search..].find("///")?;
        let found = search + rel;
        if found > 3 {
            let mut j = found + 3;
            while matches!(bytes.get(j), Some(b'i' | b'm' | b'g' | b'y')) {
                j += 1;
            }
            let ok = j - (found + 3) <= 4
                && !matches!(bytes.get(j), Some(c) if c.is_ascii_alphanumeric() || *c == b'_');
            if ok {
                return Some((j, &chunk[3..found], &chunk[found + 3..j]));
            }
        }
        search = found + 1;
    }
}

/// Strip whitespace runs and `#` comments out of a heregex body.
pub(crate) fn heregex_omit(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            if chars.peek() == Some(&'#') {
                while chars.peek().is_some_and(|c| *c != '\n') {
                    chars.next();
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Remove the smallest per-line indentation from a heredoc body. A line
/// with no indentation at all only wins when it is the first one seen, in
/// which case nothing is stripped. Also returns, for every byte of the
/// dedented body, its offset within the chunk (`chunk_offset` is the offset
/// of `doc[0]`), so interpolation fragments keep their source positions.
fn dedent_heredoc(doc: &str, chunk_offset: usize) -> (String, Vec<usize>) {
    let bytes = doc.as_bytes();
    let mut indent: Option<&str> = None;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            while bytes.get(i) == Some(&b'\n') {
                i += 1;
            }
            let start = i;
            while matches!(bytes.get(i), Some(b' ' | b'\t' | 0x0B | 0x0C)) {
                i += 1;
            }
            let attempt = &doc[start..i];
            let better = match indent {
                None => true,
                Some(cur) => !attempt.is_empty() && attempt.len() < cur.len(),
            };
            if better {
                indent = Some(attempt);
            }
        } else {
            i += 1;
        }
    }
    let indent = match indent {
        Some(ind) if !ind.is_empty() => ind,
        _ => {
            let map = (chunk_offset..chunk_offset + doc.len()).collect();
            return (doc.to_string(), map);
        }
    };
    let mut out = String::with_capacity(doc.len());
    let mut map = Vec::with_capacity(doc.len());
    let mut chars = doc.char_indices();
    while let Some((i, c)) = chars.next() {
        out.push(c);
        for b in 0..c.len_utf8() {
            map.push(chunk_offset + i + b);
        }
        if c == '\n' && doc[i + 1..].starts_with(indent) {
            for _ in 0..indent.len() {
                chars.next();
            }
        }
    }
    (out, map)
}

/// Quote a string piece: unescape escaped newlines and delimiters, re-escape
/// every delimiter, then fold newlines (`\n` escapes in heredocs, removed
/// elsewhere).
pub(crate) fn make_string(body: &str, quote: char, heredoc: bool) -> String {
    if body.is_empty() {
        return format!("{quote}{quote}");
    }
    let mut unescaped = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) if next == '\n' || next == quote => unescaped.push(next),
                Some(next) => {
                    unescaped.push('\\');
                    unescaped.push(next);
                }
                None => unescaped.push('\\'),
            }
        } else {
            unescaped.push(c);
        }
    }
    let escaped = unescaped.replace(quote, &format!("\\{quote}"));
    format!("{quote}{}{quote}", escape_lines(&escaped, heredoc))
}

pub(crate) fn escape_lines(s: &str, heredoc: bool) -> String {
    if heredoc {
        s.replace('\n', "\\n")
    } else {
        s.replace('\n', "")
    }
}
