use std::collections::HashSet;

use super::Param;
use crate::diagnostic::Diagnostic;
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};

/// Split the tokens between `(` and `)` into parameter declarations.
///
/// Each comma-separated group is `[type-tokens..., name]`. The closing
/// parenthesis terminates the last group. A `*` declarator is folded into
/// the type (`float * x` has type `float*`), so spacing never matters.
/// An empty list and a lone `void` both declare no parameters.
pub fn parse_params(tokens: &[Spanned<Lexeme>], close_paren: Span) -> Result<Vec<Param>, Diagnostic> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }
    if tokens.len() == 1 && tokens[0].node.is_ident("void") {
        return Ok(Vec::new());
    }

    let mut groups: Vec<(&[Spanned<Lexeme>], Span)> = Vec::new();
    let mut start = 0;
    for (i, tok) in tokens.iter().enumerate() {
        if tok.node == Lexeme::Comma {
            groups.push((&tokens[start..i], tok.span));
            start = i + 1;
        }
    }
    groups.push((&tokens[start..], close_paren));

    let mut params = Vec::with_capacity(groups.len());
    let mut seen = HashSet::new();
    for (group, terminator) in groups {
        let param = parse_group(group, terminator)?;
        if !seen.insert(param.name.clone()) {
            return Err(Diagnostic::error(
                format!("duplicate parameter name `{}`", param.name),
                param.span,
            ));
        }
        params.push(param);
    }
    Ok(params)
}

/// Parse one declaration group. `terminator` is the `,` or `)` that ended it,
/// used to place diagnostics for empty groups.
fn parse_group(group: &[Spanned<Lexeme>], terminator: Span) -> Result<Param, Diagnostic> {
    let (last, type_tokens) = match group.split_last() {
        Some(split) => split,
        None => {
            return Err(Diagnostic::error(
                "empty parameter declaration".to_string(),
                terminator,
            )
            .with_help("remove the extra `,`".to_string()));
        }
    };
    let span = group[0].span.merge(last.span);

    let name = match last.node.as_ident() {
        Some(name) => name.to_string(),
        None => {
            return Err(Diagnostic::error(
                format!("expected parameter name, found {}", last.node.description()),
                last.span,
            ));
        }
    };

    let device_type = match type_tokens {
        [] => {
            return Err(Diagnostic::error(
                format!("parameter `{}` has no type", name),
                span,
            ));
        }
        // Scalar shape: [type, name].
        [ty] => type_word(ty)?.to_string(),
        // Pointer shape: [type, *, name].
        [ty, star] if star.node == Lexeme::Star => format!("{}*", type_word(ty)?),
        // Anything longer is folded into one type string so the type mapper
        // can name it in its error.
        _ => join_type(type_tokens)?,
    };

    Ok(Param {
        device_type,
        name,
        span,
    })
}

fn type_word(tok: &Spanned<Lexeme>) -> Result<&str, Diagnostic> {
    tok.node.as_ident().ok_or_else(|| {
        Diagnostic::error(
            format!("expected a parameter type, found {}", tok.node.description()),
            tok.span,
        )
    })
}

/// `struct Foo` stays space separated, `*` declarators attach: `float**`.
fn join_type(tokens: &[Spanned<Lexeme>]) -> Result<String, Diagnostic> {
    let mut out = String::new();
    for (i, tok) in tokens.iter().enumerate() {
        match &tok.node {
            Lexeme::Star if i > 0 => out.push('*'),
            Lexeme::Ident(word) => {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(word);
            }
            other => {
                return Err(Diagnostic::error(
                    format!("unexpected {} in parameter declaration", other.description()),
                    tok.span,
                ));
            }
        }
    }
    Ok(out)
}
