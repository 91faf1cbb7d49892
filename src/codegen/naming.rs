/// Keywords that are accepted as raw identifiers (`r#type`).
const RAW_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// Names that cannot be spelled as identifiers at all, raw or not.
const FORBIDDEN: &[&str] = &["_", "crate", "self", "Self", "super"];

/// Spell `name` as a Rust identifier, escaping keywords. `None` if that is
/// impossible.
pub fn rust_ident(name: &str) -> Option<String> {
    if name.is_empty() || FORBIDDEN.contains(&name) {
        return None;
    }
    if RAW_KEYWORDS.contains(&name) {
        Some(format!("r#{}", name))
    } else {
        Some(name.to_string())
    }
}

/// `vecAdd` → `vec_add`, `PTXKernel` → `ptx_kernel`. Underscores are kept.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_uppercase() {
            out.push(c);
            continue;
        }
        let boundary = match i.checked_sub(1).map(|p| chars[p]) {
            Some(prev) if prev.is_ascii_lowercase() || prev.is_ascii_digit() => true,
            Some(prev) if prev.is_ascii_uppercase() => {
                chars.get(i + 1).is_some_and(|next| next.is_ascii_lowercase())
            }
            _ => false,
        };
        if boundary && !out.ends_with('_') {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// `vec_add` or `vecAdd` → `VecAdd`. Empty when `name` has no letters or
/// digits.
pub fn pascal_case(name: &str) -> String {
    snake_case(name)
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
