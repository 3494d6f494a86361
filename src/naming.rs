//! Identifier helpers shared by the emitters.

use std::collections::HashSet;

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

const TS_RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true",
    "try", "typeof", "var", "void", "while", "with",
];

/// Replace every non-identifier character with `_` and make sure the result
/// does not start with a digit.
pub fn sanitize_identifier(name: &str) -> String {
    let mut s: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if s.is_empty() {
        s.push('_');
    }
    if s.starts_with(|c: char| c.is_ascii_digit()) {
        s.insert(0, '_');
    }
    s
}

/// Python identifier for a field or parameter; keywords get a trailing `_`
pub fn python_identifier(name: &str) -> String {
    let s = sanitize_identifier(name);
    if PYTHON_KEYWORDS.contains(&s.as_str()) {
        format!("{s}_")
    } else {
        s
    }
}

/// TypeScript identifier for a parameter; reserved words get a trailing `_`
pub fn ts_identifier(name: &str) -> String {
    let s = sanitize_identifier(name);
    if TS_RESERVED.contains(&s.as_str()) {
        format!("{s}_")
    } else {
        s
    }
}

/// Whether `name` can be written as a bare TypeScript property key
pub fn is_ts_property_key(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Declaration name for a component (`user-profile` → `UserProfile`).
///
/// Names that are already valid identifiers are kept verbatim so that
/// `HTTPValidationError` stays as written.
pub fn type_name(name: &str) -> String {
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && !name.is_empty()
    {
        return name.to_string();
    }
    let joined: String = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect();
    sanitize_identifier(&joined)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// `get_random_quote` → `getRandomQuote`
pub fn camel_case(name: &str) -> String {
    let mut parts = name.split('_').filter(|p| !p.is_empty());
    let mut out = parts.next().map(str::to_string).unwrap_or_default();
    for part in parts {
        out.push_str(&capitalize(part));
    }
    out
}

/// `getRandomQuote` or `get_random_quote` → `GET_RANDOM_QUOTE`
pub fn upper_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        out.push(c.to_ascii_uppercase());
    }
    out
}

/// Fallback operation identifier built from the verb and path.
///
/// Path-parameter braces are stripped, every other non-identifier character
/// becomes `_`, runs of `_` collapse and the ends are trimmed:
/// `get` + `/api/v1/items/{id}` → `get_api_v1_items_id`.
pub fn fallback_operation_id(method: &str, path: &str) -> String {
    let raw = format!("{method}_{}", path.replace(['{', '}'], ""));
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}

/// Return `name`, or `name_N` for the first N that has not been seen yet
pub(crate) fn unique_name(seen: &mut HashSet<String>, name: &str) -> String {
    if seen.insert(name.to_string()) {
        return name.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{name}_{counter}");
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}
