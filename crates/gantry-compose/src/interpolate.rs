//! Variable interpolation over descriptor values.
//!
//! Supported forms: `$VAR`, `${VAR}`, `${VAR:-default}`, `${VAR-default}`,
//! `${VAR:?message}`, `${VAR?message}`, `${VAR:+alt}`, `${VAR+alt}` and the
//! `$$` escape. Defaults and alternates are interpolated recursively.

use gantry_common::error::{GantryError, Result};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    combinator::{recognize, value},
    sequence::pair,
};
use serde_yaml::Value;

/// Operator following the variable name inside `${…}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    /// `:-` / `-`: fall back to the default.
    Default { when_empty: bool },
    /// `:?` / `?`: fail with the message.
    Required { when_empty: bool },
    /// `:+` / `+`: substitute the alternate when set.
    Alternate { when_empty: bool },
}

fn variable_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

fn modifier(input: &str) -> IResult<&str, Modifier> {
    alt((
        value(Modifier::Default { when_empty: true }, tag(":-")),
        value(Modifier::Required { when_empty: true }, tag(":?")),
        value(Modifier::Alternate { when_empty: true }, tag(":+")),
        value(Modifier::Default { when_empty: false }, tag("-")),
        value(Modifier::Required { when_empty: false }, tag("?")),
        value(Modifier::Alternate { when_empty: false }, tag("+")),
    ))
    .parse(input)
}

/// Returns the text up to the `}` that closes the current `${`, honouring
/// nested `${…}` groups, and the remainder after that brace.
fn braced_body(input: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut chars = input.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        match c {
            '$' if chars.peek().map(|(_, n)| *n) == Some('{') => {
                depth += 1;
                let _ = chars.next();
            }
            '}' if depth == 0 => return Some((&input[..idx], &input[idx + 1..])),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Interpolates a single string using `lookup` to resolve variables.
///
/// Unset variables without a modifier expand to the empty string.
///
/// # Errors
///
/// Returns [`GantryError::Interpolation`] for an unterminated `${`, an
/// invalid variable name, or a required variable that is unset.
pub fn interpolate<F>(input: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
        } else if let Some(inner) = after.strip_prefix('{') {
            let (body, tail) = braced_body(inner).ok_or_else(|| GantryError::Interpolation {
                message: format!("unterminated variable reference in {input:?}"),
            })?;
            out.push_str(&expand_braced(body, lookup)?);
            rest = tail;
        } else if let Ok((tail, name)) = variable_name(after) {
            out.push_str(&lookup(name).unwrap_or_default());
            rest = tail;
        } else {
            out.push('$');
            rest = after;
        }
    }
    out.push_str(rest);
    Ok(out)
}

fn expand_braced<F>(body: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let (after_name, name) = variable_name(body).map_err(|_| GantryError::Interpolation {
        message: format!("invalid variable name in ${{{body}}}"),
    })?;
    let current = lookup(name);

    if after_name.is_empty() {
        return Ok(current.unwrap_or_default());
    }

    let (argument, op) = modifier(after_name).map_err(|_| GantryError::Interpolation {
        message: format!("invalid modifier in ${{{body}}}"),
    })?;

    let is_unset = |when_empty: bool| match current.as_deref() {
        None => true,
        Some(v) => when_empty && v.is_empty(),
    };

    match op {
        Modifier::Default { when_empty } => {
            if is_unset(when_empty) {
                interpolate(argument, lookup)
            } else {
                Ok(current.unwrap_or_default())
            }
        }
        Modifier::Required { when_empty } => {
            if is_unset(when_empty) {
                Err(GantryError::Interpolation {
                    message: if argument.is_empty() {
                        format!("required variable {name} is missing a value")
                    } else {
                        format!("required variable {name} is missing a value: {argument}")
                    },
                })
            } else {
                Ok(current.unwrap_or_default())
            }
        }
        Modifier::Alternate { when_empty } => {
            if is_unset(when_empty) {
                Ok(String::new())
            } else {
                interpolate(argument, lookup)
            }
        }
    }
}

/// Interpolates every string scalar of a YAML tree in place. Mapping keys
/// are left untouched.
///
/// # Errors
///
/// Returns the first interpolation error encountered.
pub fn interpolate_value<F>(node: &mut Value, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    match node {
        Value::String(text) => {
            if text.contains('$') {
                *text = interpolate(text, lookup)?;
            }
        }
        Value::Sequence(items) => {
            for item in items {
                interpolate_value(item, lookup)?;
            }
        }
        Value::Mapping(map) => {
            for (_, item) in map.iter_mut() {
                interpolate_value(item, lookup)?;
            }
        }
        Value::Tagged(tagged) => interpolate_value(&mut tagged.value, lookup)?,
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn plain_and_braced() {
        let lookup = env(&[("TAG", "1.25"), ("NAME", "web")]);
        assert_eq!(
            interpolate("nginx:$TAG", &lookup).expect("interpolate"),
            "nginx:1.25"
        );
        assert_eq!(
            interpolate("${NAME}-svc", &lookup).expect("interpolate"),
            "web-svc"
        );
    }

    #[test]
    fn unset_expands_to_empty() {
        let lookup = env(&[]);
        assert_eq!(interpolate("a${MISSING}b", &lookup).expect("interpolate"), "ab");
    }

    #[test]
    fn dollar_escape() {
        let lookup = env(&[("X", "1")]);
        assert_eq!(
            interpolate("echo $$X", &lookup).expect("interpolate"),
            "echo $X"
        );
    }

    #[test]
    fn default_forms() {
        let lookup = env(&[("EMPTY", "")]);
        assert_eq!(
            interpolate("${EMPTY:-fallback}", &lookup).expect("interpolate"),
            "fallback"
        );
        assert_eq!(
            interpolate("${EMPTY-fallback}", &lookup).expect("interpolate"),
            ""
        );
        assert_eq!(
            interpolate("${UNSET-fallback}", &lookup).expect("interpolate"),
            "fallback"
        );
    }

    #[test]
    fn nested_default() {
        let lookup = env(&[("INNER", "deep")]);
        assert_eq!(
            interpolate("${OUTER:-${INNER}}", &lookup).expect("interpolate"),
            "deep"
        );
    }

    #[test]
    fn required_variable_errors() {
        let lookup = env(&[]);
        let err = interpolate("${DB_PASSWORD:?set a password}", &lookup)
            .expect_err("should fail");
        let msg = err.to_string();
        assert!(msg.contains("DB_PASSWORD"), "got: {msg}");
        assert!(msg.contains("set a password"), "got: {msg}");
    }

    #[test]
    fn alternate_value() {
        let lookup = env(&[("DEBUG", "1")]);
        assert_eq!(
            interpolate("${DEBUG:+--verbose}", &lookup).expect("interpolate"),
            "--verbose"
        );
        assert_eq!(
            interpolate("${QUIET:+--quiet}", &lookup).expect("interpolate"),
            ""
        );
    }

    #[test]
    fn unterminated_reference_errors() {
        let lookup = env(&[]);
        assert!(interpolate("${OOPS", &lookup).is_err());
    }

    #[test]
    fn lone_dollar_is_kept() {
        let lookup = env(&[]);
        assert_eq!(interpolate("cost: 5$", &lookup).expect("interpolate"), "cost: 5$");
    }

    #[test]
    fn value_tree_strings_only() {
        let lookup = env(&[("PORT", "8080")]);
        let mut doc: Value =
            serde_yaml::from_str("ports:\n  - \"${PORT}:80\"\nreplicas: 2\n").expect("yaml");
        interpolate_value(&mut doc, &lookup).expect("interpolate");
        let rendered = serde_yaml::to_string(&doc).expect("yaml");
        assert!(rendered.contains("8080:80"), "got: {rendered}");
        assert!(rendered.contains("replicas: 2"), "got: {rendered}");
    }
}
