use std::fmt;

/// Lexemes of the kernel-definition dialect.
///
/// Only parentheses, commas and `*` carry meaning for signature extraction;
/// every other punctuation character is kept as [`Lexeme::Punct`] so the
/// token stream stays faithful to the source order.
#[derive(Clone, Debug, PartialEq)]
pub enum Lexeme {
    Ident(String),
    Number(String),
    Str(String),
    Char(String),

    LParen, // (
    RParen, // )
    Comma,  // ,
    Star,   // *
    Punct(char),

    Eof,
}

impl Lexeme {
    /// True if this is the identifier `name`.
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(self, Lexeme::Ident(s) if s == name)
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Lexeme::Ident(s) => Some(s),
            _ => None,
        }
    }

    /// Human-readable description for diagnostics.
    pub fn description(&self) -> String {
        match self {
            Lexeme::Eof => "end of file".to_string(),
            other => format!("`{}`", other),
        }
    }
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lexeme::Ident(s) | Lexeme::Number(s) => f.write_str(s),
            Lexeme::Str(s) => write!(f, "\"{}\"", s),
            Lexeme::Char(s) => write!(f, "'{}'", s),
            Lexeme::LParen => f.write_str("("),
            Lexeme::RParen => f.write_str(")"),
            Lexeme::Comma => f.write_str(","),
            Lexeme::Star => f.write_str("*"),
            Lexeme::Punct(c) => write!(f, "{}", c),
            Lexeme::Eof => Ok(()),
        }
    }
}
