//! Identifier sanitization.
//!
//! Every component that manufactures a type or member name goes through
//! [`clean_name`], so the rules live in exactly one place.

/// Rust keywords that cannot be used as identifiers.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while",
];

/// Turns a raw declared name into a guaranteed-valid identifier.
///
/// Spaces are removed, other invalid characters become underscores, a
/// leading digit gets an underscore prefix, keywords get an underscore
/// suffix, and `None` becomes `None_` to keep clear of `Option::None`
/// in generated code.
#[must_use]
pub fn clean_name(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == ' ' {
            continue;
        }
        if c.is_alphanumeric() || c == '_' {
            name.push(c);
        } else {
            name.push('_');
        }
    }
    if name.is_empty() {
        return "_".to_string();
    }
    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if name == "None" || KEYWORDS.contains(&name.as_str()) {
        name.push('_');
    }
    name
}
