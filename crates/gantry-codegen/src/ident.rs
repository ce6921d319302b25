//! Entity name to exported Go identifier.

/// Prefix used when a name yields no leading letter.
const FALLBACK_PREFIX: &str = "Service";

/// Turns a free-form entity name into an exported identifier: segments
/// separated by any non-alphanumeric character are capitalized and joined.
///
/// `web-api` → `WebApi`, `db_primary.v2` → `DbPrimaryV2`, `2fa` → `Service2fa`.
#[must_use]
pub fn resolve_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for segment in name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
    {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.chars().next().is_none_or(|c| c.is_ascii_digit()) {
        out.insert_str(0, FALLBACK_PREFIX);
    }
    out
}

/// Returns true if `name` is a valid Go identifier.
#[must_use]
pub fn is_go_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
