//! # Scanner
//!
//! Produces a flat symbol stream with single-token lookahead rewriting,
//! plus comment/line-break indices and a highlighting token stream (§6).
//!
//! Tokenization runs in two passes over the text: the first pass (`lex`)
//! produces the raw symbol list with no lookahead; a second pass
//! (`rewrite_lookahead`) walks that list once more and replaces `NOT`,
//! `NULLS` and `WITH` tokens that are followed by a qualifying keyword.
//! This is equivalent to doing the rewrite inline with a one-token
//! lookahead buffer, just easier to express against a completed `Vec`.

use sqlscript_ast::Location;

use crate::error::{ScanDiagnostic, ScanErrorKind};
use crate::names::NamesTable;
use crate::token::{HighlightType, Keyword, Symbol, TokenKind};

/// Parallel-array highlighting stream: `(offsets[i], lengths[i], types[i])`
/// in increasing offset order, plus `breaks[l]` = index of the first token
/// on line `l`.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Highlighting {
    pub offsets: Vec<u32>,
    pub lengths: Vec<u32>,
    pub types: Vec<HighlightType>,
    pub breaks: Vec<u32>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ScannedScript {
    pub text: String,
    pub symbol_list: Vec<Symbol>,
    pub comment_locations: Vec<Location>,
    pub line_break_locations: Vec<Location>,
    pub names_table: NamesTable,
    pub errors: Vec<ScanDiagnostic>,
    pub highlight: Highlighting,
}

impl ScannedScript {
    /// The symbol whose range contains `offset`, if any (§6 `MoveCursor`).
    pub fn symbol_at_offset(&self, offset: u32) -> Option<usize> {
        self.symbol_list
            .iter()
            .position(|sym| sym.location.contains_offset(offset))
    }
}

struct Lexer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    names: NamesTable,
    symbols: Vec<Symbol>,
    comments: Vec<Location>,
    line_breaks: Vec<Location>,
    errors: Vec<ScanDiagnostic>,
    comment_depth: u32,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            names: NamesTable::new(),
            symbols: Vec::new(),
            comments: Vec::new(),
            line_breaks: Vec::new(),
            errors: Vec::new(),
            comment_depth: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn push_symbol(&mut self, kind: TokenKind, start: usize, name: Option<crate::names::NameId>) {
        let loc = Location::new(start as u32, (self.pos - start) as u32);
        self.symbols.push(Symbol { kind, location: loc, name });
    }

    fn run(mut self) -> (Vec<Symbol>, Vec<Location>, Vec<Location>, NamesTable, Vec<ScanDiagnostic>) {
        loop {
            self.skip_trivia();
            let start = self.pos;
            let Some(c) = self.peek() else {
                self.symbols.push(Symbol {
                    kind: TokenKind::Eof,
                    location: Location::new(start as u32, 0),
                    name: None,
                });
                break;
            };
            match c {
                b'0'..=b'9' => self.lex_number(start),
                b'\'' => self.lex_string(start),
                b'"' => self.lex_quoted_ident(start),
                c if c == b'_' || c.is_ascii_alphabetic() => self.lex_ident(start),
                _ => self.lex_punct(start),
            }
        }
        (self.symbols, self.comments, self.line_breaks, self.names, self.errors)
    }

    /// Skip whitespace and comments, recording line breaks and comment
    /// spans as it goes. Nested block comments are tracked via a depth
    /// counter, mirroring the stacked begin/end counters of the source.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b'\n') => {
                    let start = self.pos;
                    self.bump();
                    self.line_breaks.push(Location::new(start as u32, 1));
                }
                Some(c) if c == b' ' || c == b'\t' || c == b'\r' => {
                    self.bump();
                }
                Some(b'-') if self.peek_at(1) == Some(b'-') => {
                    let start = self.pos;
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.bump();
                    }
                    self.comments.push(Location::new(start as u32, (self.pos - start) as u32));
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.skip_block_comment();
                }
                _ => break,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let outer_start = self.pos;
        self.comment_depth += 1;
        self.bump();
        self.bump();
        while self.comment_depth > 0 {
            match (self.peek(), self.peek_at(1)) {
                (Some(b'/'), Some(b'*')) => {
                    self.comment_depth += 1;
                    self.bump();
                    self.bump();
                }
                (Some(b'*'), Some(b'/')) => {
                    self.comment_depth -= 1;
                    self.bump();
                    self.bump();
                }
                (Some(_), _) => {
                    self.bump();
                }
                (None, _) => break,
            }
        }
        self.comments
            .push(Location::new(outer_start as u32, (self.pos - outer_start) as u32));
    }

    fn lex_number(&mut self, start: usize) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.bump();
        }
        let mut is_float = false;
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            is_float = true;
            self.bump();
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.bump();
            }
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let save = self.pos;
            self.bump();
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.bump();
            }
            if matches!(self.peek(), Some(b'0'..=b'9')) {
                is_float = true;
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.bump();
                }
            } else {
                self.pos = save;
            }
        }
        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntegerLiteral
        };
        self.push_symbol(kind, start, None);
    }

    fn lex_string(&mut self, start: usize) {
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                Some(b'\'') if self.peek_at(1) == Some(b'\'') => {
                    value.push('\'');
                    self.bump();
                    self.bump();
                }
                Some(b'\'') => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    let rest = &self.text[self.pos..];
                    let ch = rest.chars().next().unwrap();
                    value.push(ch);
                    self.pos += ch.len_utf8();
                }
                None => {
                    self.errors.push(ScanDiagnostic {
                        kind: ScanErrorKind::InvalidLiteral,
                        location: Location::new(start as u32, (self.pos - start) as u32),
                        message: "unterminated string literal".to_string(),
                    });
                    break;
                }
            }
        }
        let name = self.names.intern(&value);
        self.push_symbol(TokenKind::StringLiteral, start, Some(name));
    }

    /// Double-quoted identifier; interned like a plain identifier but never
    /// matched against the keyword table.
    fn lex_quoted_ident(&mut self, start: usize) {
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek() {
                Some(b'"') if self.peek_at(1) == Some(b'"') => {
                    value.push('"');
                    self.bump();
                    self.bump();
                }
                Some(b'"') => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    let rest = &self.text[self.pos..];
                    let ch = rest.chars().next().unwrap();
                    value.push(ch);
                    self.pos += ch.len_utf8();
                }
                None => {
                    self.errors.push(ScanDiagnostic {
                        kind: ScanErrorKind::InvalidLiteral,
                        location: Location::new(start as u32, (self.pos - start) as u32),
                        message: "unterminated quoted identifier".to_string(),
                    });
                    break;
                }
            }
        }
        let name = self.names.intern(&value);
        self.push_symbol(TokenKind::Ident, start, Some(name));
    }

    fn lex_ident(&mut self, start: usize) {
        while matches!(self.peek(), Some(c) if c == b'_' || c.is_ascii_alphanumeric()) {
            self.bump();
        }
        let text = &self.text[start..self.pos];
        if let Some(keyword) = Keyword::from_ident(text) {
            self.push_symbol(TokenKind::Keyword(keyword), start, None);
        } else {
            let name = self.names.intern(text);
            self.push_symbol(TokenKind::Ident, start, Some(name));
        }
    }

    fn lex_punct(&mut self, start: usize) {
        let c = self.bump().unwrap();
        let kind = match c {
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b';' => TokenKind::Semicolon,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'^' => TokenKind::Caret,
            b'=' => TokenKind::Eq,
            b'<' => {
                if self.peek() == Some(b'=') {
                    self.bump();
                    TokenKind::LtEq
                } else if self.peek() == Some(b'>') {
                    self.bump();
                    TokenKind::NotEq
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.bump();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.bump();
                    TokenKind::NotEq
                } else {
                    self.errors.push(ScanDiagnostic {
                        kind: ScanErrorKind::InvalidParameter,
                        location: Location::new(start as u32, 1),
                        message: format!("unexpected character '{}'", c as char),
                    });
                    self.push_symbol(TokenKind::Eof, start, None);
                    return;
                }
            }
            other => {
                self.errors.push(ScanDiagnostic {
                    kind: ScanErrorKind::InvalidParameter,
                    location: Location::new(start as u32, 1),
                    message: format!("unexpected character '{}'", other as char),
                });
                TokenKind::Eof
            }
        };
        self.push_symbol(kind, start, None);
    }
}

/// Rewrite `NOT`, `NULLS`, `WITH` tokens into their lookahead-qualified
/// variant when immediately followed by a qualifying keyword (§4.B).
fn rewrite_lookahead(symbols: &mut [Symbol]) {
    for i in 0..symbols.len() {
        let Some(next) = symbols.get(i + 1) else { continue };
        let next_kind = next.kind;
        let Symbol { kind, .. } = symbols[i];
        let rewritten = match kind {
            TokenKind::Keyword(Keyword::Not) => matches!(
                next_kind,
                TokenKind::Keyword(Keyword::Between)
                    | TokenKind::Keyword(Keyword::In)
                    | TokenKind::Keyword(Keyword::Like)
                    | TokenKind::Keyword(Keyword::Ilike)
                    | TokenKind::Keyword(Keyword::Similar)
            )
            .then_some(TokenKind::NotLa),
            TokenKind::Keyword(Keyword::Nulls) => matches!(
                next_kind,
                TokenKind::Keyword(Keyword::First) | TokenKind::Keyword(Keyword::Last)
            )
            .then_some(TokenKind::NullsLa),
            TokenKind::Keyword(Keyword::With) => matches!(
                next_kind,
                TokenKind::Keyword(Keyword::Time) | TokenKind::Keyword(Keyword::Ordinality)
            )
            .then_some(TokenKind::WithLa),
            _ => None,
        };
        if let Some(new_kind) = rewritten {
            symbols[i].kind = new_kind;
        }
    }
}

fn highlight_type_of(kind: TokenKind) -> HighlightType {
    match kind {
        TokenKind::Keyword(_) | TokenKind::NotLa | TokenKind::NullsLa | TokenKind::WithLa => {
            HighlightType::Keyword
        }
        TokenKind::Ident => HighlightType::Identifier,
        TokenKind::IntegerLiteral => HighlightType::LiteralInteger,
        TokenKind::FloatLiteral => HighlightType::LiteralFloat,
        TokenKind::StringLiteral => HighlightType::LiteralString,
        TokenKind::Dot => HighlightType::Dot,
        TokenKind::Eof => HighlightType::None,
        _ => HighlightType::Operator,
    }
}

fn build_highlighting(symbols: &[Symbol], comments: &[Location], line_breaks: &[Location]) -> Highlighting {
    let mut entries: Vec<(u32, u32, HighlightType)> = symbols
        .iter()
        .filter(|s| s.kind != TokenKind::Eof)
        .map(|s| (s.location.offset, s.location.length, highlight_type_of(s.kind)))
        .collect();
    entries.extend(comments.iter().map(|c| (c.offset, c.length, HighlightType::Comment)));
    // Stable sort by offset; later-pushed entries at a coincident offset
    // overwrite earlier ones once deduped below, matching "later emissions
    // overwrite the type tag" (comments are pushed after symbols, so a
    // comment wins over a token at the same offset, which cannot happen in
    // practice since comments are skipped as trivia, but keeps the
    // documented tie-break explicit).
    entries.sort_by_key(|(offset, _, _)| *offset);

    let mut offsets = Vec::with_capacity(entries.len());
    let mut lengths = Vec::with_capacity(entries.len());
    let mut types = Vec::with_capacity(entries.len());
    for (offset, length, ty) in &entries {
        if let Some(&last_offset) = offsets.last() {
            if last_offset == *offset {
                *types.last_mut().unwrap() = *ty;
                continue;
            }
        }
        offsets.push(*offset);
        lengths.push(*length);
        types.push(*ty);
    }

    let mut breaks = Vec::with_capacity(line_breaks.len() + 1);
    let mut line_start = 0u32;
    let mut token_idx = 0usize;
    for line_break in line_breaks {
        while token_idx < offsets.len() && offsets[token_idx] < line_start {
            token_idx += 1;
        }
        breaks.push(token_idx as u32);
        line_start = line_break.end();
    }
    while token_idx < offsets.len() && offsets[token_idx] < line_start {
        token_idx += 1;
    }
    breaks.push(token_idx as u32);

    Highlighting { offsets, lengths, types, breaks }
}

/// Scan `text` into a [`ScannedScript`]. Never fails: lexical errors are
/// collected into `ScannedScript::errors` rather than aborting the scan, so
/// downstream passes always have a usable (if partial) symbol stream.
#[tracing::instrument(skip(text), fields(len = text.len()))]
pub fn scan(text: &str) -> ScannedScript {
    let (mut symbols, comments, line_breaks, names_table, errors) = Lexer::new(text).run();
    rewrite_lookahead(&mut symbols);
    let highlight = build_highlighting(&symbols, &comments, &line_breaks);
    ScannedScript {
        text: text.to_string(),
        symbol_list: symbols,
        comment_locations: comments,
        line_break_locations: line_breaks,
        names_table,
        errors,
        highlight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(script: &ScannedScript) -> Vec<TokenKind> {
        script.symbol_list.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn scans_simple_select() {
        let script = scan("select * from A");
        assert!(script.errors.is_empty());
        assert_eq!(
            kinds(&script),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Star,
                TokenKind::Keyword(Keyword::From),
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn not_rewrites_before_between() {
        let script = scan("a not between 1 and 2");
        assert_eq!(kinds(&script)[1], TokenKind::NotLa);
    }

    #[test]
    fn not_unchanged_before_other_tokens() {
        let script = scan("not true");
        assert_eq!(kinds(&script)[0], TokenKind::Keyword(Keyword::Not));
    }

    #[test]
    fn nested_block_comments_close_at_matching_depth() {
        let script = scan("select /* outer /* inner */ still outer */ 1");
        assert_eq!(script.comment_locations.len(), 1);
        let comment_text = &script.text[script.comment_locations[0].offset as usize
            ..script.comment_locations[0].end() as usize];
        assert!(comment_text.starts_with("/*"));
        assert!(comment_text.ends_with("*/"));
    }

    #[test]
    fn string_literal_unescapes_doubled_quote() {
        let script = scan("select 'it''s'");
        let sym = script.symbol_list[1];
        assert_eq!(sym.kind, TokenKind::StringLiteral);
        assert_eq!(script.names_table.text(sym.name.unwrap()), "it's");
    }

    #[test]
    fn interning_identifiers_is_idempotent_across_occurrences() {
        let script = scan("select a from t where a = a");
        let idents: Vec<_> = script
            .symbol_list
            .iter()
            .filter(|s| s.kind == TokenKind::Ident)
            .map(|s| s.name.unwrap())
            .collect();
        assert_eq!(idents[0], idents[2]);
        assert_eq!(idents[2], idents[3]);
    }

    #[test]
    fn line_breaks_and_highlighting_breaks_track_lines() {
        let script = scan("select 1\nfrom t");
        assert_eq!(script.line_break_locations.len(), 1);
        assert_eq!(script.highlight.breaks.len(), 2);
        assert_eq!(script.highlight.breaks[0], 0);
    }
}
