//! Kernel signature extraction.
//!
//! The dialect allows exactly one shape of kernel declaration:
//!
//! ```text
//! __global__ void <name> ( <param>, <param>, ... )
//! ```
//!
//! The extractor walks the token stream with a small state machine so every
//! malformed declaration fails with a diagnostic pointing at the offending
//! token instead of running off the end of the sequence.

mod params;

use crate::diagnostic::Diagnostic;
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};

pub use params::parse_params;

/// Marker that introduces a device kernel.
pub const KERNEL_QUALIFIER: &str = "__global__";

/// The only return type a kernel may declare.
pub const KERNEL_RETURN_TYPE: &str = "void";

/// One declared kernel parameter, before host type resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    /// Normalized device type, e.g. `float`, `int` or `float*`.
    pub device_type: String,
    pub name: String,
    /// Span of the whole declaration group.
    pub span: Span,
}

/// Name and ordered parameter list of the kernel in one source file.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelSignature {
    pub name: String,
    pub name_span: Span,
    /// In declaration order: call-site order and argument-address order.
    pub params: Vec<Param>,
}

impl KernelSignature {
    pub fn param_types(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.device_type.as_str()).collect()
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Position in the kernel declaration shape.
#[derive(Clone, Debug, PartialEq)]
enum State {
    ReturnType,
    Name,
    OpenParen { name: String, name_span: Span },
    Params { name: String, name_span: Span, open_paren: Span },
}

pub(crate) struct Parser<'t> {
    tokens: &'t [Spanned<Lexeme>],
}

impl<'t> Parser<'t> {
    /// `tokens` must end with `Eof`, as produced by the lexer.
    pub(crate) fn new(tokens: &'t [Spanned<Lexeme>]) -> Self {
        Self { tokens }
    }

    pub(crate) fn parse_kernel(&self) -> Result<KernelSignature, Diagnostic> {
        let marker = self.find_marker()?;

        let mut state = State::ReturnType;
        let mut pos = marker + 1;

        loop {
            let tok = self.at(pos);
            state = match state {
                State::ReturnType => {
                    if !tok.node.is_ident(KERNEL_RETURN_TYPE) {
                        return Err(Diagnostic::error(
                            format!(
                                "kernel return type must be `{}`, found {}",
                                KERNEL_RETURN_TYPE,
                                tok.node.description()
                            ),
                            tok.span,
                        )
                        .with_help("declare the kernel as `__global__ void name(...)`".to_string()));
                    }
                    State::Name
                }
                State::Name => match tok.node.as_ident() {
                    Some(ident) => State::OpenParen {
                        name: ident.to_string(),
                        name_span: tok.span,
                    },
                    None => {
                        return Err(Diagnostic::error(
                            format!("expected kernel name, found {}", tok.node.description()),
                            tok.span,
                        ));
                    }
                },
                State::OpenParen { name, name_span } => {
                    if tok.node != Lexeme::LParen {
                        return Err(Diagnostic::error(
                            format!(
                                "expected `(` after kernel name `{}`, found {}",
                                name,
                                tok.node.description()
                            ),
                            tok.span,
                        ));
                    }
                    State::Params {
                        name,
                        name_span,
                        open_paren: tok.span,
                    }
                }
                State::Params {
                    name,
                    name_span,
                    open_paren,
                } => {
                    let close = self.find_close_paren(pos, open_paren)?;
                    let params = parse_params(&self.tokens[pos..close], self.tokens[close].span)?;
                    return Ok(KernelSignature {
                        name,
                        name_span,
                        params,
                    });
                }
            };
            pos += 1;
        }
    }

    fn find_marker(&self) -> Result<usize, Diagnostic> {
        self.tokens
            .iter()
            .position(|t| t.node.is_ident(KERNEL_QUALIFIER))
            .ok_or_else(|| {
                Diagnostic::error(
                    format!("no `{}` kernel found", KERNEL_QUALIFIER),
                    self.eof_span(),
                )
                .with_help(format!(
                    "each file must define exactly one `{} void name(...)` kernel",
                    KERNEL_QUALIFIER
                ))
            })
    }

    /// A warning for every kernel marker after the first, which is the only
    /// one wrapped.
    pub(crate) fn extra_markers(&self) -> Vec<Diagnostic> {
        self.tokens
            .iter()
            .filter(|t| t.node.is_ident(KERNEL_QUALIFIER))
            .skip(1)
            .map(|tok| {
                Diagnostic::warning(
                    format!("ignoring additional `{}` declaration", KERNEL_QUALIFIER),
                    tok.span,
                )
                .with_help("only the first kernel of a file is wrapped; move this one to its own file".to_string())
            })
            .collect()
    }

    /// Index of the first `)` at or after `start`.
    fn find_close_paren(&self, start: usize, open_paren: Span) -> Result<usize, Diagnostic> {
        self.tokens[start..]
            .iter()
            .position(|t| t.node == Lexeme::RParen)
            .map(|offset| start + offset)
            .ok_or_else(|| {
                Diagnostic::error(
                    "unterminated parameter list".to_string(),
                    open_paren.merge(self.eof_span()),
                )
                .with_help("close the parameter list with `)`".to_string())
            })
    }

    /// Token at `pos`, clamped to the trailing `Eof`.
    fn at(&self, pos: usize) -> &Spanned<Lexeme> {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[pos.min(last)]
    }

    fn eof_span(&self) -> Span {
        self.tokens.last().map(|t| t.span).unwrap_or_else(Span::dummy)
    }
}

#[cfg(test)]
mod tests;
