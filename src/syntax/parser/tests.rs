use super::*;
use crate::lexer::Lexer;

fn parse(source: &str) -> Result<KernelSignature, Diagnostic> {
    let tokens = Lexer::new(source).tokenize().expect("lex");
    Parser::new(&tokens).parse_kernel()
}

fn sig(source: &str) -> KernelSignature {
    parse(source).unwrap_or_else(|e| panic!("parse error: {}", e))
}

fn err(source: &str) -> Diagnostic {
    match parse(source) {
        Ok(s) => panic!("expected an error, got {:?}", s),
        Err(d) => d,
    }
}

#[test]
fn test_name_and_params() {
    let s = sig("extern \"C\" __global__ void madd(float* dst, float a, int n) { dst[0] = a; }");
    assert_eq!(s.name, "madd");
    assert_eq!(s.param_types(), vec!["float*", "float", "int"]);
    assert_eq!(s.param_names(), vec!["dst", "a", "n"]);
}

#[test]
fn test_declaration_order_is_preserved() {
    let s = sig("__global__ void k(float a, float* b, int c) {}");
    assert_eq!(s.param_names(), vec!["a", "b", "c"]);
    assert_eq!(s.param_types(), vec!["float", "float*", "int"]);
}

#[test]
fn test_pointer_spacing_is_irrelevant() {
    let variants = [
        "__global__ void k(float* x) {}",
        "__global__ void k(float *x) {}",
        "__global__ void k(float * x) {}",
        "__global__ void k(float*x) {}",
        "__global__ void k(float* __restrict__ x) {}",
    ];
    for src in variants {
        let s = sig(src);
        assert_eq!(s.params.len(), 1, "{}", src);
        assert_eq!(s.params[0].device_type, "float*", "{}", src);
        assert_eq!(s.params[0].name, "x", "{}", src);
    }
}

#[test]
fn test_zero_parameters() {
    assert!(sig("__global__ void tick() {}").params.is_empty());
    assert!(sig("__global__ void tick(void) {}").params.is_empty());
}

#[test]
fn test_multiline_declaration_with_comments() {
    let s = sig("// scale a field\n__global__ void\nscale(float* f, // field\n      float s /* factor */)\n{\n}\n");
    assert_eq!(s.name, "scale");
    assert_eq!(s.param_names(), vec!["f", "s"]);
}

#[test]
fn test_only_first_kernel_is_used() {
    let s = sig("__global__ void first(int a) {}\n__global__ void second(float b) {}");
    assert_eq!(s.name, "first");
    assert_eq!(s.param_names(), vec!["a"]);
}

#[test]
fn test_extra_markers_are_warnings() {
    let src = "__global__ void a() {}
__global__ void b() {}
__global__ void c() {}";
    let tokens = Lexer::new(src).tokenize().unwrap();
    let warnings = Parser::new(&tokens).extra_markers();
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|w| w.severity == crate::diagnostic::Severity::Warning));
    assert_eq!(warnings[0].span.start, 23);
    assert_eq!(warnings[1].span.start, 46);
    insta::assert_snapshot!(warnings[0].message, @"ignoring additional `__global__` declaration");

    let tokens = Lexer::new("__global__ void only() {}").tokenize().unwrap();
    assert!(Parser::new(&tokens).extra_markers().is_empty());
}

#[test]
fn test_helper_functions_before_kernel_are_skipped() {
    let s = sig("__device__ float sq(float x) { return x * x; }\n__global__ void apply(float* v, int n) {}");
    assert_eq!(s.name, "apply");
    assert_eq!(s.param_types(), vec!["float*", "int"]);
}

#[test]
fn test_multi_token_types_are_joined() {
    let s = sig("__global__ void k(struct Vec3 v, float ** pp) {}");
    assert_eq!(s.param_types(), vec!["struct Vec3", "float**"]);
    assert_eq!(s.param_names(), vec!["v", "pp"]);
}

#[test]
fn test_name_span_points_at_name() {
    let src = "__global__ void kern(int a) {}";
    let s = sig(src);
    assert_eq!(&src[s.name_span.range()], "kern");
    assert_eq!(&src[s.params[0].span.range()], "int a");
}

#[test]
fn test_missing_marker() {
    let d = err("void host_only(int a) {}");
    assert!(d.message.contains("no `__global__` kernel found"));
}

#[test]
fn test_empty_file() {
    let d = err("");
    assert!(d.message.contains("no `__global__` kernel found"));
}

#[test]
fn test_non_void_return() {
    let d = err("__global__ int k(int a) {}");
    assert!(d.message.contains("must be `void`"), "{}", d.message);
    assert!(d.message.contains("`int`"));
}

#[test]
fn test_missing_name() {
    let d = err("__global__ void (int a) {}");
    assert!(d.message.contains("expected kernel name, found `(`"), "{}", d.message);
}

#[test]
fn test_marker_at_end_of_file() {
    let d = err("__global__");
    assert!(d.message.contains("found end of file"), "{}", d.message);
}

#[test]
fn test_missing_open_paren() {
    let d = err("__global__ void k int a) {}");
    assert!(d.message.contains("expected `(` after kernel name `k`"), "{}", d.message);
}

#[test]
fn test_unterminated_parameter_list() {
    let src = "__global__ void k(int a, float b";
    let d = err(src);
    assert_eq!(d.message, "unterminated parameter list");
    assert_eq!(d.span.start as usize, src.find('(').unwrap());
}

#[test]
fn test_empty_group() {
    let d = err("__global__ void k(int a, , float b) {}");
    assert_eq!(d.message, "empty parameter declaration");
}

#[test]
fn test_trailing_comma() {
    let d = err("__global__ void k(int a,) {}");
    assert_eq!(d.message, "empty parameter declaration");
}

#[test]
fn test_parameter_without_name() {
    let d = err("__global__ void k(float*) {}");
    assert!(d.message.contains("expected parameter name, found `*`"), "{}", d.message);
}

#[test]
fn test_parameter_without_type() {
    let d = err("__global__ void k(a, int b) {}");
    assert!(d.message.contains("parameter `a` has no type"), "{}", d.message);
}

#[test]
fn test_duplicate_parameter() {
    let d = err("__global__ void k(int a, float a) {}");
    assert!(d.message.contains("duplicate parameter name `a`"));
}

#[test]
fn test_pointer_without_base_type() {
    let d = err("__global__ void k(* x) {}");
    assert!(d.message.contains("expected a parameter type"), "{}", d.message);
}
