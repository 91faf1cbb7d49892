use crate::diagnostic::Diagnostic;
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};

/// Tokens that exist in the dialect only as aliasing or optimization hints.
/// They carry no weight for signature extraction and are dropped.
const DENYLIST: &[&str] = &["__restrict__"];

/// Whether a token is elided from the token stream.
pub fn is_noise(text: &str) -> bool {
    DENYLIST.contains(&text)
}

pub(crate) struct Lexer<'src> {
    text: &'src str,
    source: &'src [u8],
    pos: usize,
}

impl<'src> Lexer<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            text: source,
            source: source.as_bytes(),
            pos: 0,
        }
    }

    /// Lex the whole file. The returned sequence always ends with `Eof`.
    ///
    /// The first lexical error aborts the scan; there is no resync.
    pub(crate) fn tokenize(mut self) -> Result<Vec<Spanned<Lexeme>>, Diagnostic> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            if let Lexeme::Ident(name) = &tok.node {
                if is_noise(name) {
                    continue;
                }
            }
            let is_eof = tok.node == Lexeme::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Spanned<Lexeme>, Diagnostic> {
        self.skip_whitespace_and_comments()?;

        if self.pos >= self.source.len() {
            return Ok(self.make_token(Lexeme::Eof, self.pos, self.pos));
        }

        let start = self.pos;
        let ch = self.source[self.pos];

        if is_ident_start(ch) {
            return Ok(self.scan_ident());
        }

        if ch.is_ascii_digit() || (ch == b'.' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()))
        {
            return Ok(self.scan_number());
        }

        match ch {
            b'"' => self.scan_quoted(b'"'),
            b'\'' => self.scan_quoted(b'\''),
            _ => self.scan_symbol(start),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), Diagnostic> {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }

            if self.peek_at(0) == Some(b'/') && self.peek_at(1) == Some(b'/') {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }

            if self.peek_at(0) == Some(b'/') && self.peek_at(1) == Some(b'*') {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos + 1 >= self.source.len() {
                        self.pos = self.source.len();
                        return Err(Diagnostic::error(
                            "unterminated block comment".to_string(),
                            Span::new(start as u32, (start + 2) as u32),
                        )
                        .with_help("close the comment with `*/`".to_string()));
                    }
                    if self.source[self.pos] == b'*' && self.source[self.pos + 1] == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }

            return Ok(());
        }
    }

    fn scan_ident(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.source.len() && is_ident_continue(self.source[self.pos]) {
            self.pos += 1;
        }
        let text = &self.text[start..self.pos];
        self.make_token(Lexeme::Ident(text.to_string()), start, self.pos)
    }

    /// Numbers are kept as text: decimal, hex, floats with exponents and
    /// `f`/`u`/`l` suffixes. Their value never matters for signatures.
    fn scan_number(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        let hex = self.peek_at(0) == Some(b'0') && matches!(self.peek_at(1), Some(b'x' | b'X'));
        while let Some(c) = self.peek_at(0) {
            let exponent = if hex {
                matches!(c, b'p' | b'P')
            } else {
                matches!(c, b'e' | b'E')
            };
            if exponent && matches!(self.peek_at(1), Some(b'+' | b'-')) {
                self.pos += 2;
            } else if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = &self.text[start..self.pos];
        self.make_token(Lexeme::Number(text.to_string()), start, self.pos)
    }

    fn scan_quoted(&mut self, quote: u8) -> Result<Spanned<Lexeme>, Diagnostic> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek_at(0) {
                None | Some(b'\n') => {
                    let what = if quote == b'"' { "string" } else { "character" };
                    return Err(Diagnostic::error(
                        format!("unterminated {} literal", what),
                        Span::new(start as u32, self.pos as u32),
                    ));
                }
                Some(b'\\') => self.pos += 2.min(self.source.len() - self.pos),
                Some(c) if c == quote => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        let body = self.text[start + 1..self.pos - 1].to_string();
        let token = if quote == b'"' {
            Lexeme::Str(body)
        } else {
            Lexeme::Char(body)
        };
        Ok(self.make_token(token, start, self.pos))
    }

    fn scan_symbol(&mut self, start: usize) -> Result<Spanned<Lexeme>, Diagnostic> {
        let ch = self.source[self.pos];

        if !ch.is_ascii() || ch.is_ascii_control() {
            let c = self.text[start..].chars().next().unwrap_or('\u{FFFD}');
            let end = start + c.len_utf8();
            return Err(Diagnostic::error(
                format!("unexpected character '{}' (U+{:04X})", c.escape_default(), c as u32),
                Span::new(start as u32, end as u32),
            )
            .with_help("kernel sources must be plain ASCII outside comments and literals".to_string()));
        }

        self.pos += 1;
        let token = match ch {
            b'(' => Lexeme::LParen,
            b')' => Lexeme::RParen,
            b',' => Lexeme::Comma,
            b'*' => Lexeme::Star,
            other => Lexeme::Punct(other as char),
        };
        Ok(self.make_token(token, start, self.pos))
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn make_token(&self, token: Lexeme, start: usize, end: usize) -> Spanned<Lexeme> {
        Spanned::new(token, Span::new(start as u32, end as u32))
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

#[cfg(test)]
mod tests;
