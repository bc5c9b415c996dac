//! The cooking layer: pulls raw tokens off the Logos DFA and turns them into
//! the tagged stream the grammar consumes.
//!
//! Raw tokens arrive in source order with byte spans. This layer owns all
//! context: keyword and alias resolution, previous-token classification,
//! the indentation engine with its debt accounting, delimiter pairing, and
//! the balanced scans that grow a raw trigger token over a whole string or
//! regex via `bump`.

use logos::{Lexer as LogosLexer, Logos};
use smallvec::SmallVec;

use crate::error::{LexError, LexErrorKind};
use crate::raw::RawTok;
use crate::tables;
use crate::token::{Loc, Tag, Token};

/// Options for a tokenize call.
#[derive(Debug, Clone)]
pub struct Options {
    /// Zero-based line the source starts on.
    pub line: usize,
    /// Zero-based column the source starts on.
    pub column: usize,
    /// Strip Markdown prose before lexing.
    pub literate: bool,
    /// Hand the stream to the rewriter after lexing.
    pub rewrite: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            line: 0,
            column: 0,
            literate: false,
            rewrite: true,
        }
    }
}

/// Expected closers, innermost last. Every `(`/`{`/`[` pushes its inverse;
/// every INDENT pushes `Outdent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndMark {
    Paren,
    Brace,
    Bracket,
    Outdent,
}

impl EndMark {
    pub(crate) fn name(self) -> &'static str {
        match self {
            EndMark::Paren => ")",
            EndMark::Brace => "}",
            EndMark::Bracket => "]",
            EndMark::Outdent => "OUTDENT",
        }
    }
}

/// Single-use lexer state; one instance per tokenize call.
pub(crate) struct Lexer<'src> {
    pub(crate) raw: LogosLexer<'src, RawTok>,
    pub(crate) src: &'src str,
    pub(crate) tokens: Vec<Token>,
    /// Current indentation column.
    pub(crate) indent: isize,
    /// Opening indentation of the outermost block.
    base_indent: isize,
    /// Over-indentation on a continuation line, not promoted to an INDENT.
    indebt: isize,
    /// Surplus columns from outdents that overshot recorded indent steps.
    pub(crate) outdebt: isize,
    /// Magnitude of each unclosed INDENT.
    pub(crate) indents: SmallVec<[isize; 8]>,
    pub(crate) ends: SmallVec<[EndMark; 8]>,
    /// Line of the current chunk start. May be -1 after `clean` prepends a
    /// newline; no token is ever emitted there.
    pub(crate) chunk_line: isize,
    pub(crate) chunk_column: usize,
    /// Byte offset of the current chunk in the cleaned source.
    pub(crate) chunk_start: usize,
    /// Between a FOR and the next in/of of the same clause.
    seen_for: bool,
}

/// Tokenize cleaned-up source into a raw (un-rewritten) token stream.
pub(crate) fn tokenize(code: &str, opts: &Options) -> Result<Vec<Token>, LexError> {
    let mut line = opts.line as isize;
    let cleaned = clean(code, opts.literate, &mut line);
    let mut lexer = Lexer {
        raw: RawTok::lexer(&cleaned),
        src: &cleaned,
        tokens: Vec::new(),
        indent: 0,
        base_indent: 0,
        indebt: 0,
        outdebt: 0,
        indents: SmallVec::new(),
        ends: SmallVec::new(),
        chunk_line: line,
        chunk_column: opts.column,
        chunk_start: 0,
        seen_for: false,
    };
    lexer.scan()?;
    lexer.close_indentation()?;
    if let Some(end) = lexer.ends.pop() {
        return Err(lexer.error_at(LexErrorKind::MissingCloser(end.name().into()), 0));
    }
    Ok(lexer.tokens)
}

/// Strip a BOM, delete carriage returns, trim trailing whitespace on every
/// line, and guard a leading-whitespace first line with a synthetic newline
/// (shifting the starting line up by one so columns stay honest). Literate
/// sources then have their prose commented out.
fn clean(code: &str, literate: bool, chunk_line: &mut isize) -> String {
    let code = code.strip_prefix('\u{FEFF}').unwrap_or(code);
    let code = code.replace('\r', "");
    let mut out = String::with_capacity(code.len() + 1);
    for (i, line) in code.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.trim_end_matches(char::is_whitespace));
    }
    while out.ends_with('\n') {
        out.pop();
    }
    if out
        .chars()
        .next()
        .is_some_and(|c| c != '\n' && c.is_whitespace())
    {
        out.insert(0, '\n');
        *chunk_line -= 1;
    }
    if literate {
        out = invert_literate(&out);
    }
    out
}

/// Markdown-style literate source: only lines indented by four spaces (or up
/// to three spaces and a tab) are code. Prose is commented out rather than
/// removed so line numbers survive. A prose line ends the code eligibility
/// of the lines after it until a blank line resets it.
fn invert_literate(code: &str) -> String {
    fn is_code_line(line: &str) -> bool {
        if line.starts_with("    ") {
            return true;
        }
        let spaces = line.bytes().take_while(|b| *b == b' ').count();
        spaces <= 3 && line[spaces..].starts_with('\t')
    }

    let mut out = String::with_capacity(code.len());
    let mut maybe_code = true;
    for (i, line) in code.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if maybe_code && is_code_line(line) {
            out.push_str(line);
        } else {
            maybe_code = line.chars().all(char::is_whitespace);
            if maybe_code {
                out.push_str(line);
            } else {
                out.push_str("# ");
                out.push_str(line);
            }
        }
    }
    out
}

impl<'src> Lexer<'src> {
    // -- Scan loop ----------------------------------------------------------

    fn scan(&mut self) -> Result<(), LexError> {
        while let Some(res) = self.raw.next() {
            // The catch-all pattern makes raw scanning total.
            let tok = res.unwrap_or(RawTok::Any);
            self.dispatch(tok)?;
            let end = self.raw.span().end;
            self.advance_to(end);
        }
        Ok(())
    }

    fn dispatch(&mut self, tok: RawTok) -> Result<(), LexError> {
        match tok {
            RawTok::Ws => {
                if let Some(prev) = self.tokens.last_mut() {
                    prev.spaced = true;
                }
                Ok(())
            }
            RawTok::Line => self.line_dispatch(),
            RawTok::Hash => {
                self.comment_run();
                Ok(())
            }
            RawTok::TripleHash => self.here_comment(),
            RawTok::Ident => self.identifier_token(),
            RawTok::Number => self.number_token(),
            RawTok::SqString => self.simple_string_token(),
            RawTok::DQuote => self.double_quote_token(),
            RawTok::TdqHeredoc => self.heredoc_token('"'),
            RawTok::TsqHeredoc => self.heredoc_token('\''),
            RawTok::JsLiteral => {
                self.js_token();
                Ok(())
            }
            RawTok::Slash => self.slash_token(),
            RawTok::HeregexStart => self.heregex_token(),
            _ => {
                let src = self.src;
                let value = &src[self.raw.span()];
                self.literal_token_at(value, 0)
            }
        }
    }

    // -- Location tracking --------------------------------------------------

    /// Line/column of the character at `offset` bytes into the current
    /// chunk. Clamps at end of input.
    pub(crate) fn line_col_at(&self, offset: usize) -> (isize, usize) {
        let mut line = self.chunk_line;
        let mut col = self.chunk_column;
        for (i, c) in self.src[self.chunk_start..].char_indices() {
            if i >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    /// Position of the last character of a `length`-byte region starting at
    /// `offset`; zero-length regions collapse onto their start.
    fn last_col_at(&self, offset: usize, length: usize) -> (isize, usize) {
        if length == 0 {
            return self.line_col_at(offset);
        }
        let end = offset + length;
        let mut line = self.chunk_line;
        let mut col = self.chunk_column;
        let mut at = (line, col);
        for (i, c) in self.src[self.chunk_start..].char_indices() {
            if i >= end {
                break;
            }
            at = (line, col);
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        at
    }

    fn advance_to(&mut self, end: usize) {
        let (line, col) = self.line_col_at(end - self.chunk_start);
        self.chunk_line = line;
        self.chunk_column = col;
        self.chunk_start = end;
    }

    pub(crate) fn error_at(&self, kind: LexErrorKind, offset: usize) -> LexError {
        let (line, col) = self.line_col_at(offset);
        LexError::new(kind, line.max(0) as usize, col)
    }

    // -- Token building and the tail view ------------------------------------

    pub(crate) fn make_token(
        &self,
        tag: Tag,
        value: &str,
        offset: usize,
        length: usize,
    ) -> Token {
        let (first_line, first_column) = self.line_col_at(offset);
        let (last_line, last_column) = self.last_col_at(offset, length);
        Token::new(
            tag,
            value,
            Loc {
                first_line: first_line.max(0) as usize,
                first_column,
                last_line: last_line.max(0) as usize,
                last_column,
            },
        )
    }

    pub(crate) fn token(&mut self, tag: Tag, value: &str, offset: usize, length: usize) {
        let token = self.make_token(tag, value, offset, length);
        self.tokens.push(token);
    }

    pub(crate) fn tail(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub(crate) fn tail_tag(&self) -> Option<&Tag> {
        self.tokens.last().map(|t| &t.tag)
    }

    pub(crate) fn tail_value(&self) -> Option<&str> {
        self.tokens.last().map(|t| t.value.as_str())
    }

    // -- Identifiers ---------------------------------------------------------

    fn identifier_token(&mut self) -> Result<(), LexError> {
        let src = self.src;
        let id = &src[self.raw.span()];
        let id_len = id.len();

        // `for own k of obj`; the colon suffix is not consumed on this path.
        if id == "own" && self.tail_tag() == Some(&Tag::For) {
            self.token(Tag::Own, id, 0, id_len);
            return Ok(());
        }

        // Optional `[ \t]*:` suffix marks an object key; `::` stays
        // prototype access.
        let rest = self.raw.remainder().as_bytes();
        let mut ws = 0;
        while matches!(rest.get(ws), Some(b' ' | b'\t' | 0x0B | 0x0C)) {
            ws += 1;
        }
        let colon = rest.get(ws) == Some(&b':') && rest.get(ws + 1) != Some(&b':');
        if colon {
            self.raw.bump(ws + 1);
        }

        let prev_spaced = self.tail().map_or(false, |t| t.spaced);
        let forced = colon
            || matches!(
                self.tail_tag(),
                Some(Tag::Dot | Tag::SoakAccess | Tag::Proto | Tag::SoakProto)
            )
            || (self.tail_tag() == Some(&Tag::At) && !prev_spaced);

        let mut tag = Tag::Identifier;
        let mut value = id.to_string();
        let mut popped: Option<Token> = None;

        if !forced && tables::is_keyword(id) {
            tag = keyword_base_tag(id);
            if tag == Tag::When
                && self.tail_tag().is_some_and(tables::is_line_break)
            {
                tag = Tag::LeadingWhen;
            } else if tag == Tag::For {
                self.seen_for = true;
            } else if tag == Tag::Relation {
                if id != "instanceof" && self.seen_for {
                    tag = if id == "in" { Tag::ForIn } else { Tag::ForOf };
                    self.seen_for = false;
                } else if self.tail_value() == Some("!") {
                    popped = self.tokens.pop();
                    value = format!("!{id}");
                }
            }
        }

        let mut reserved = false;
        if tables::is_forbidden(id) {
            if forced {
                reserved = true;
            } else if tables::RESERVED.contains(&id) {
                return Err(self.error_at(LexErrorKind::ReservedWord(id.into()), 0));
            }
        }

        let mut origin = None;
        if !forced {
            if let Some(alias) = tables::alias_for(id) {
                origin = Some(Box::new(self.make_token(tag, id, 0, id_len)));
                value = alias.to_string();
            }
            tag = match value.as_str() {
                "!" => Tag::Unary,
                "==" | "!=" => Tag::Compare,
                "&&" | "||" => Tag::Logic,
                "true" | "false" => Tag::Bool,
                "break" | "continue" => Tag::Statement,
                _ => tag,
            };
        }

        let mut token = self.make_token(tag, &value, 0, id_len);
        token.reserved = reserved;
        token.origin = origin;
        if let Some(bang) = popped {
            // widen `!in` / `!of` back over the popped `!`
            token.loc.first_line = bang.loc.first_line;
            token.loc.first_column = bang.loc.first_column;
        }
        self.tokens.push(token);

        if colon {
            self.token(Tag::Colon, ":", id_len + ws, 1);
        }
        Ok(())
    }

    // -- Numbers -------------------------------------------------------------

    fn number_token(&mut self) -> Result<(), LexError> {
        let src = self.src;
        let number = &src[self.raw.span()];
        let bytes = number.as_bytes();

        if bytes[0] == b'0' && matches!(bytes.get(1), Some(b'B' | b'O' | b'X')) {
            return Err(self.error_at(
                LexErrorKind::UppercaseRadixPrefix(number.into()),
                0,
            ));
        }
        if number.contains('E') && !number.starts_with("0x") {
            return Err(self.error_at(LexErrorKind::UppercaseExponent(number.into()), 0));
        }
        if bytes[0] == b'0' {
            let digits = bytes[1..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .collect::<Vec<_>>();
            if digits.iter().any(|b| **b == b'8' || **b == b'9') {
                return Err(self.error_at(
                    LexErrorKind::BadDecimalLiteral(number.into()),
                    0,
                ));
            }
            if !digits.is_empty() {
                return Err(self.error_at(
                    LexErrorKind::LegacyOctalLiteral(number.into()),
                    0,
                ));
            }
        }

        let lexed_length = number.len();
        let value = if let Some(digits) = number.strip_prefix("0o") {
            match u128::from_str_radix(digits, 8) {
                Ok(n) => format!("0x{n:x}"),
                Err(_) => number.to_string(),
            }
        } else if let Some(digits) = number.strip_prefix("0b") {
            match u128::from_str_radix(digits, 2) {
                Ok(n) => format!("0x{n:x}"),
                Err(_) => number.to_string(),
            }
        } else {
            number.to_string()
        };
        self.token(Tag::Number, &value, 0, lexed_length);
        Ok(())
    }

    // -- Newlines and indentation --------------------------------------------

    fn line_dispatch(&mut self) -> Result<(), LexError> {
        // The comment matcher outranks the line matcher, so a newline run
        // leading straight into a line comment is trivia: the indentation of
        // comment-only lines never produces INDENT/OUTDENT.
        if line_comment_follows(self.raw.remainder()) {
            return Ok(());
        }
        if let Some(prev) = self.tokens.last_mut() {
            prev.new_line = true;
        }
        self.line_token()
    }

    fn line_token(&mut self) -> Result<(), LexError> {
        let src = self.src;
        let indent = &src[self.raw.span()];
        let match_len = indent.len();
        let size = (match_len - 1 - indent.rfind('\n').expect("line run has a newline")) as isize;

        self.seen_for = false;
        let no_newlines = self.unfinished();

        if size - self.indebt == self.indent {
            if no_newlines {
                self.suppress_newlines();
            } else {
                self.newline_token(0);
            }
            return Ok(());
        }

        if size > self.indent {
            if no_newlines {
                self.indebt = size - self.indent;
                self.suppress_newlines();
                return Ok(());
            }
            if self.tokens.is_empty() {
                // the first real line establishes the floor
                self.base_indent = size;
                self.indent = size;
                return Ok(());
            }
            let diff = size - self.indent + self.outdebt;
            self.token(
                Tag::Indent,
                &diff.to_string(),
                match_len - size as usize,
                size as usize,
            );
            self.indents.push(diff);
            self.ends.push(EndMark::Outdent);
            self.outdebt = 0;
            self.indebt = 0;
            self.indent = size;
        } else if size < self.base_indent {
            return Err(self.error_at(LexErrorKind::MissingIndentation, match_len));
        } else {
            self.indebt = 0;
            self.outdent_token(self.indent - size, no_newlines, match_len)?;
        }
        Ok(())
    }

    /// Record zero or more OUTDENTs while paying down outdent debt; a closer
    /// right after the newline rounds the final step up to the full popped
    /// magnitude. Ported operation-for-operation; the debt interplay is
    /// deliberate.
    pub(crate) fn outdent_token(
        &mut self,
        mut move_out: isize,
        no_newlines: bool,
        outdent_length: usize,
    ) -> Result<(), LexError> {
        let mut decreased = self.indent - move_out;
        let mut dent: Option<isize> = None;
        while move_out > 0 {
            match self.indents.last().copied() {
                None | Some(0) => {
                    move_out = 0;
                }
                Some(last_indent) if last_indent == self.outdebt => {
                    move_out -= self.outdebt;
                    self.outdebt = 0;
                }
                Some(last_indent) if last_indent < self.outdebt => {
                    self.outdebt -= last_indent;
                    move_out -= last_indent;
                }
                Some(_) => {
                    let step = self.indents.pop().expect("indent stack checked") + self.outdebt;
                    if outdent_length > 0 && self.indentable_closer_at(outdent_length) {
                        decreased -= step - move_out;
                        move_out = step;
                    }
                    self.outdebt = 0;
                    self.pair(EndMark::Outdent)?;
                    self.token(Tag::Outdent, &move_out.to_string(), 0, outdent_length);
                    move_out -= step;
                    dent = Some(step);
                }
            }
        }
        if dent.is_some() {
            self.outdebt -= move_out;
        }
        while self.tail_value() == Some(";") {
            self.tokens.pop();
        }
        if self.tail_tag() != Some(&Tag::Terminator) && !no_newlines && !self.tokens.is_empty() {
            self.token(Tag::Terminator, "\n", outdent_length, 0);
        }
        self.indent = decreased;
        Ok(())
    }

    fn indentable_closer_at(&self, offset: usize) -> bool {
        self.src[self.chunk_start + offset..]
            .chars()
            .next()
            .is_some_and(|c| tables::INDENTABLE_CLOSERS.contains(&c))
    }

    fn newline_token(&mut self, offset: usize) {
        while self.tail_value() == Some(";") {
            self.tokens.pop();
        }
        if self.tail_tag() != Some(&Tag::Terminator) {
            self.token(Tag::Terminator, "\n", offset, 0);
        }
    }

    fn suppress_newlines(&mut self) {
        if self.tail_value() == Some("\\") {
            self.tokens.pop();
        }
    }

    pub(crate) fn close_indentation(&mut self) -> Result<(), LexError> {
        self.outdent_token(self.indent, false, 0)
    }

    /// The chunk continues the previous line: it opens with a continuation
    /// mark, or the last token cannot end an expression.
    fn unfinished(&self) -> bool {
        line_continuer(&self.src[self.chunk_start..])
            || self.tail_tag().is_some_and(tables::unfinished_tag)
    }

    // -- Comments ------------------------------------------------------------

    /// Consume a run of line comments (and any blank lines between them)
    /// starting at the current chunk. Produces no tokens.
    fn comment_run(&mut self) {
        let n = line_comment_run(&self.src[self.chunk_start..]);
        if n > 1 {
            self.raw.bump(n - 1);
        }
    }

    fn here_comment(&mut self) -> Result<(), LexError> {
        let src = self.src;
        let chunk = &src[self.chunk_start..];
        if let Some((total, here_len)) = match_herecomment(chunk) {
            let body = self.sanitize_herecomment(&chunk[3..3 + here_len])?;
            self.raw.bump(total - 3);
            self.token(Tag::HereComment, &body, 0, total);
            return Ok(());
        }
        let bytes = chunk.as_bytes();
        if matches!(bytes.get(3), Some(b'#') | None) {
            // four-plus hashes, or a bare `###` at end of input: an ordinary
            // comment run
            let n = line_comment_run(chunk);
            self.raw.bump(n - 3);
            return Ok(());
        }
        // `###x…` with no closer: a stray `#`, then a comment from the
        // second hash on
        self.literal_token_at("#", 0)?;
        let n = line_comment_run(&chunk[1..]);
        self.raw.bump(1 + n - 3);
        Ok(())
    }

    /// Herecomment bodies are re-indented by the current indent; a `*/`
    /// would break the emitted JavaScript block comment.
    fn sanitize_herecomment(&self, doc: &str) -> Result<String, LexError> {
        if doc.contains("*/") {
            return Err(self.error_at(LexErrorKind::BlockCommentTerminator, 0));
        }
        if !doc.contains('\n') {
            return Ok(doc.to_string());
        }
        let indent = " ".repeat(self.indent.max(0) as usize);
        if indent.is_empty() {
            return Ok(doc.to_string());
        }
        Ok(doc.replace(&format!("\n{indent}"), "\n"))
    }

    // -- Embedded JavaScript -------------------------------------------------

    fn js_token(&mut self) {
        let src = self.src;
        let script = &src[self.raw.span()];
        let value = script[1..script.len() - 1].to_string();
        self.token(Tag::Js, &value, 0, script.len());
    }

    // -- Literals and operators ----------------------------------------------

    pub(crate) fn literal_token(&mut self, value: &str) -> Result<(), LexError> {
        self.literal_token_at(value, 0)
    }

    pub(crate) fn literal_token_at(&mut self, value: &str, offset: usize) -> Result<(), LexError> {
        if value == "->" || value == "=>" {
            self.tag_parameters();
        }

        if value == "=" {
            if let Some(prev) = self.tail() {
                if !prev.reserved && tables::is_forbidden(&prev.value) {
                    let word = prev.value.clone();
                    return Err(
                        self.error_at(LexErrorKind::ReservedAssignment(word), offset)
                    );
                }
                if prev.value == "||" || prev.value == "&&" {
                    let prev = self.tokens.last_mut().expect("tail checked");
                    prev.tag = Tag::CompoundAssign;
                    prev.value.push('=');
                    return Ok(());
                }
            }
        }

        let prev_spaced = self.tail().map_or(false, |t| t.spaced);
        let mut tag = if value == ";" {
            self.seen_for = false;
            Tag::Terminator
        } else if tables::MATH.contains(&value) {
            Tag::Math
        } else if tables::COMPARE.contains(&value) {
            Tag::Compare
        } else if tables::COMPOUND_ASSIGN.contains(&value) {
            Tag::CompoundAssign
        } else if tables::UNARY_MATH.contains(&value) {
            Tag::UnaryMath
        } else if tables::SHIFT.contains(&value) {
            Tag::Shift
        } else if tables::LOGIC.contains(&value) || (value == "?" && prev_spaced) {
            Tag::Logic
        } else {
            self_tag(value)
        };

        if !prev_spaced {
            if value == "(" && self.tail_tag().is_some_and(tables::is_callable) {
                if self.tail_tag() == Some(&Tag::Question) {
                    self.tokens.last_mut().expect("tail checked").tag = Tag::FuncExist;
                }
                tag = Tag::CallStart;
            } else if value == "[" && self.tail_tag().is_some_and(tables::is_indexable) {
                if self.tail_tag() == Some(&Tag::Question) {
                    self.tokens.last_mut().expect("tail checked").tag = Tag::IndexSoak;
                }
                tag = Tag::IndexStart;
            }
        }

        match value {
            "(" => self.ends.push(EndMark::Paren),
            "{" => self.ends.push(EndMark::Brace),
            "[" => self.ends.push(EndMark::Bracket),
            ")" => self.pair(EndMark::Paren)?,
            "}" => self.pair(EndMark::Brace)?,
            "]" => self.pair(EndMark::Bracket)?,
            _ => {}
        }

        self.token(tag, value, offset, value.len());
        Ok(())
    }

    /// Walk back from a `)` preceding `->`/`=>`, matching nested pairs; the
    /// outermost unmatched `(` becomes PARAM_START and the `)` PARAM_END, so
    /// the grammar can tell parameter lists from argument lists.
    fn tag_parameters(&mut self) {
        if self.tail_tag() != Some(&Tag::RParen) {
            return;
        }
        let mut depth = 0usize;
        let mut i = self.tokens.len() - 1;
        self.tokens[i].tag = Tag::ParamEnd;
        while i > 0 {
            i -= 1;
            match self.tokens[i].tag {
                Tag::RParen => depth += 1,
                Tag::LParen | Tag::CallStart => {
                    if depth > 0 {
                        depth -= 1;
                    } else {
                        if self.tokens[i].tag == Tag::LParen {
                            self.tokens[i].tag = Tag::ParamStart;
                        }
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    // -- Pairing -------------------------------------------------------------

    /// Close the innermost open construct. A pending OUTDENT is auto-closed
    /// first, so a block can end on the same line as its opener's closer.
    pub(crate) fn pair(&mut self, tag: EndMark) -> Result<(), LexError> {
        loop {
            match self.ends.last().copied() {
                Some(wanted) if wanted == tag => {
                    self.ends.pop();
                    return Ok(());
                }
                Some(EndMark::Outdent) => {
                    let last_indent = self.indents.last().copied().unwrap_or(0);
                    self.outdent_token(last_indent, true, 0)?;
                }
                _ => {
                    return Err(
                        self.error_at(LexErrorKind::Unmatched(tag.name().into()), 0)
                    )
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Free helpers
// ---------------------------------------------------------------------------

fn keyword_base_tag(id: &str) -> Tag {
    match id {
        "if" | "unless" => Tag::If,
        "else" => Tag::Else,
        "then" => Tag::Then,
        "until" => Tag::Until,
        "loop" => Tag::Loop,
        "by" => Tag::By,
        "when" => Tag::When,
        "for" => Tag::For,
        "while" => Tag::While,
        "switch" => Tag::Switch,
        "try" => Tag::Try,
        "catch" => Tag::Catch,
        "finally" => Tag::Finally,
        "class" => Tag::Class,
        "extends" => Tag::Extends,
        "super" => Tag::Super,
        "return" => Tag::Return,
        "throw" => Tag::Throw,
        "debugger" => Tag::Debugger,
        "this" => Tag::This,
        "null" => Tag::Null,
        "undefined" => Tag::Undefined,
        "true" | "false" => Tag::Bool,
        "break" | "continue" => Tag::Statement,
        "new" | "typeof" | "delete" | "do" => Tag::Unary,
        "in" | "of" | "instanceof" => Tag::Relation,
        _ => Tag::Identifier,
    }
}

fn self_tag(value: &str) -> Tag {
    match value {
        "(" => Tag::LParen,
        ")" => Tag::RParen,
        "{" => Tag::LBrace,
        "}" => Tag::RBrace,
        "[" => Tag::LBracket,
        "]" => Tag::RBracket,
        "," => Tag::Comma,
        "." => Tag::Dot,
        ":" => Tag::Colon,
        "@" => Tag::At,
        "?" => Tag::Question,
        "\\" => Tag::Backslash,
        "=" => Tag::Assign,
        "+" => Tag::Plus,
        "-" => Tag::Minus,
        "**" => Tag::Pow,
        "->" => Tag::Arrow,
        "=>" => Tag::FatArrow,
        "++" => Tag::Inc,
        "--" => Tag::Dec,
        "::" => Tag::Proto,
        "?." => Tag::SoakAccess,
        "?::" => Tag::SoakProto,
        ".." => Tag::Range,
        "..." => Tag::Ellipsis,
        _ => Tag::Literal(value.chars().next().unwrap_or('\0')),
    }
}

/// `^\s*(?:,|\??\.(?![.\d])|::)` — the next line opens with something that
/// can only continue the current expression.
fn line_continuer(chunk: &str) -> bool {
    let rest = chunk.trim_start_matches(char::is_whitespace);
    let bytes = rest.as_bytes();
    let dot_continues = |at: usize| {
        !matches!(bytes.get(at), Some(c) if *c == b'.' || c.is_ascii_digit())
    };
    match bytes.first() {
        Some(b',') => true,
        Some(b':') => bytes.get(1) == Some(&b':'),
        Some(b'.') => dot_continues(1),
        Some(b'?') => bytes.get(1) == Some(&b'.') && dot_continues(2),
        _ => false,
    }
}

/// Does the text after a newline run open a line comment? A herecomment
/// opener (`###` followed by anything but a fourth `#`) binds tighter and
/// takes the indentation path instead.
fn line_comment_follows(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    if bytes.first() != Some(&b'#') {
        return false;
    }
    !(bytes.get(1) == Some(&b'#')
        && bytes.get(2) == Some(&b'#')
        && matches!(bytes.get(3), Some(c) if *c != b'#'))
}

/// Length of a run of line comments: whitespace (newlines included), then a
/// `#` that does not open a herecomment, then the rest of the line; repeated.
pub(crate) fn line_comment_run(chunk: &str) -> usize {
    let bytes = chunk.as_bytes();
    let mut i = 0;
    loop {
        let start = i;
        while matches!(bytes.get(i), Some(b' ' | b'\t' | b'\n' | 0x0B | 0x0C)) {
            i += 1;
        }
        let opens_comment = bytes.get(i) == Some(&b'#')
            && !(bytes.get(i + 1) == Some(&b'#')
                && bytes.get(i + 2) == Some(&b'#')
                && matches!(bytes.get(i + 3), Some(c) if *c != b'#'));
        if !opens_comment {
            return start;
        }
        i += 1;
        while bytes.get(i).is_some_and(|b| *b != b'\n') {
            i += 1;
        }
    }
}

/// `^###([^#][\s\S]*?)(?:###[^\n\S]*|###$)` — a closed herecomment. Returns
/// (total length including trailing blanks, body length).
pub(crate) fn match_herecomment(chunk: &str) -> Option<(usize, usize)> {
    let bytes = chunk.as_bytes();
    match bytes.get(3) {
        Some(b'#') | None => return None,
        _ => {}
    }
    // the byte after `###` is not `#`, so a match can only start at 4+
    let close = chunk[3..].find("###")? + 3;
    let here_len = close - 3;
    let mut end = close + 3;
    while matches!(bytes.get(end), Some(b' ' | b'\t' | 0x0B | 0x0C)) {
        end += 1;
    }
    Some((end, here_len))
}
