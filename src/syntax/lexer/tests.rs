use super::*;

fn lex(source: &str) -> Vec<Lexeme> {
    Lexer::new(source)
        .tokenize()
        .unwrap_or_else(|e| panic!("lex error: {}", e.message))
        .into_iter()
        .map(|t| t.node)
        .collect()
}

fn lex_err(source: &str) -> Diagnostic {
    match Lexer::new(source).tokenize() {
        Ok(tokens) => panic!("expected a lex error, got {:?}", tokens),
        Err(d) => d,
    }
}

fn ident(s: &str) -> Lexeme {
    Lexeme::Ident(s.to_string())
}

#[test]
fn test_kernel_declaration() {
    let tokens = lex("__global__ void add(float* a, int n)");
    assert_eq!(
        tokens,
        vec![
            ident("__global__"),
            ident("void"),
            ident("add"),
            Lexeme::LParen,
            ident("float"),
            Lexeme::Star,
            ident("a"),
            Lexeme::Comma,
            ident("int"),
            ident("n"),
            Lexeme::RParen,
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_pointer_spacing_variants_lex_identically() {
    let a = lex("float* x");
    let b = lex("float *x");
    let c = lex("float * x");
    let d = lex("float*x");
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(c, d);
}

#[test]
fn test_restrict_is_elided() {
    let tokens = lex("float* __restrict__ dst");
    assert_eq!(tokens, vec![ident("float"), Lexeme::Star, ident("dst"), Lexeme::Eof]);
}

#[test]
fn test_restrict_prefix_is_an_ordinary_ident() {
    let tokens = lex("__restrict__x");
    assert_eq!(tokens, vec![ident("__restrict__x"), Lexeme::Eof]);
}

#[test]
fn test_comments_are_skipped() {
    let tokens = lex("// header\nint /* inline */ x // trailing\n/* multi\nline */");
    assert_eq!(tokens, vec![ident("int"), ident("x"), Lexeme::Eof]);
}

#[test]
fn test_numbers() {
    let tokens = lex("1 0x1F 3.5f 1e-3 .5 2.0E+10f 10u");
    assert_eq!(
        tokens,
        vec![
            Lexeme::Number("1".to_string()),
            Lexeme::Number("0x1F".to_string()),
            Lexeme::Number("3.5f".to_string()),
            Lexeme::Number("1e-3".to_string()),
            Lexeme::Number(".5".to_string()),
            Lexeme::Number("2.0E+10f".to_string()),
            Lexeme::Number("10u".to_string()),
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_subtraction_after_number_is_punct() {
    let tokens = lex("i-1");
    assert_eq!(
        tokens,
        vec![
            ident("i"),
            Lexeme::Punct('-'),
            Lexeme::Number("1".to_string()),
            Lexeme::Eof
        ]
    );
}

#[test]
fn test_preprocessor_line() {
    let tokens = lex("#include \"stencil.h\"\n");
    assert_eq!(
        tokens,
        vec![
            Lexeme::Punct('#'),
            ident("include"),
            Lexeme::Str("stencil.h".to_string()),
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_string_and_char_escapes() {
    let tokens = lex(r#"extern "C" '\'' "a\"b""#);
    assert_eq!(
        tokens,
        vec![
            ident("extern"),
            Lexeme::Str("C".to_string()),
            Lexeme::Char("\\'".to_string()),
            Lexeme::Str("a\\\"b".to_string()),
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_spans_point_into_source() {
    let source = "__global__ void k()";
    let tokens = Lexer::new(source).tokenize().unwrap();
    let name = &tokens[2];
    assert_eq!(&source[name.span.range()], "k");
    let eof = tokens.last().unwrap();
    assert_eq!(eof.node, Lexeme::Eof);
    assert_eq!(eof.span.start as usize, source.len());
}

#[test]
fn test_empty_source_is_just_eof() {
    assert_eq!(lex(""), vec![Lexeme::Eof]);
    assert_eq!(lex("  \n\t "), vec![Lexeme::Eof]);
}

#[test]
fn test_unterminated_block_comment() {
    let d = lex_err("int x; /* never closed");
    assert!(d.message.contains("unterminated block comment"));
    assert_eq!(d.span.start, 7);
}

#[test]
fn test_unterminated_string() {
    let d = lex_err("\"abc\nint x;");
    assert!(d.message.contains("unterminated string literal"));
}

#[test]
fn test_unterminated_char() {
    let d = lex_err("'a");
    assert!(d.message.contains("unterminated character literal"));
}

#[test]
fn test_non_ascii_outside_comment_is_rejected() {
    let d = lex_err("float λ");
    assert!(d.message.contains("unexpected character"));
    assert!(d.message.contains("U+03BB"));
}

#[test]
fn test_non_ascii_inside_comment_is_fine() {
    assert_eq!(lex("// λ\nint"), vec![ident("int"), Lexeme::Eof]);
}

#[test]
fn test_is_noise() {
    assert!(is_noise("__restrict__"));
    assert!(!is_noise("float"));
}
