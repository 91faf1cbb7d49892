//! PTX sanitizing.
//!
//! The device compiler writes absolute build paths into `.file` directives and
//! tool banners into `//` comments. Both change between machines and rebuilds
//! without changing the code, so they are removed before the PTX is embedded.

/// Prefix of a PTX line comment. Only comments starting in column 0 are removed.
pub const COMMENT_MARKER: &str = "//";

/// PTX directive naming a source file.
pub const FILE_DIRECTIVE: &str = ".file";

/// True if the line is a comment or a `.file` directive.
pub fn is_volatile_line(line: &str) -> bool {
    if line.starts_with(COMMENT_MARKER) {
        return true;
    }
    match line.trim_start_matches([' ', '\t']).strip_prefix(FILE_DIRECTIVE) {
        Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
        None => false,
    }
}

/// Drop comment and `.file` lines, keeping every other line verbatim,
/// including its terminator and a final line without one.
pub fn sanitize_ptx(ptx: &str) -> String {
    let mut out = String::with_capacity(ptx.len());
    for line in ptx.split_inclusive('\n') {
        if !is_volatile_line(line) {
            out.push_str(line);
        }
    }
    out
}
