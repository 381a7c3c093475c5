//! # Token kinds
//!
//! Keywords are a closed set recognized case-insensitively. `NOT`, `NULLS`
//! and `WITH` additionally rewrite to a lookahead-dependent variant; see
//! [`crate::scanner::Scanner::produce`].

use serde::{Deserialize, Serialize};

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyword {
    Select,
    From,
    Where,
    As,
    Distinct,
    Create,
    Table,
    And,
    Or,
    Not,
    Null,
    True,
    False,
    Between,
    In,
    Like,
    Ilike,
    Similar,
    Nulls,
    First,
    Last,
    With,
    Time,
    Ordinality,
}

impl Keyword {
    pub fn from_ident(text: &str) -> Option<Keyword> {
        Some(match text.to_ascii_uppercase().as_str() {
            "SELECT" => Keyword::Select,
            "FROM" => Keyword::From,
            "WHERE" => Keyword::Where,
            "AS" => Keyword::As,
            "DISTINCT" => Keyword::Distinct,
            "CREATE" => Keyword::Create,
            "TABLE" => Keyword::Table,
            "AND" => Keyword::And,
            "OR" => Keyword::Or,
            "NOT" => Keyword::Not,
            "NULL" => Keyword::Null,
            "TRUE" => Keyword::True,
            "FALSE" => Keyword::False,
            "BETWEEN" => Keyword::Between,
            "IN" => Keyword::In,
            "LIKE" => Keyword::Like,
            "ILIKE" => Keyword::Ilike,
            "SIMILAR" => Keyword::Similar,
            "NULLS" => Keyword::Nulls,
            "FIRST" => Keyword::First,
            "LAST" => Keyword::Last,
            "WITH" => Keyword::With,
            "TIME" => Keyword::Time,
            "ORDINALITY" => Keyword::Ordinality,
            _ => return None,
        })
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Keyword(Keyword),
    /// `NOT` rewritten because it is followed by `BETWEEN|IN|LIKE|ILIKE|SIMILAR`.
    NotLa,
    /// `NULLS` rewritten because it is followed by `FIRST|LAST`.
    NullsLa,
    /// `WITH` rewritten because it is followed by `TIME|ORDINALITY`.
    WithLa,
    Ident,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    Comma,
    Dot,
    LParen,
    RParen,
    Semicolon,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub kind: TokenKind,
    pub location: sqlscript_ast::Location,
    /// Interned name for `Ident`/`StringLiteral` symbols; `None` otherwise
    /// (keywords and punctuation are never interned).
    pub name: Option<crate::names::NameId>,
}

/// Token types of the highlighting stream (§6): one entry per emitted
/// symbol plus comments, in increasing offset order.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighlightType {
    Keyword,
    LiteralString,
    LiteralInteger,
    LiteralFloat,
    Operator,
    Identifier,
    Dot,
    Comment,
    None,
}
