//! `.env` file reader.

use std::collections::HashMap;
use std::path::Path;

use gantry_common::error::{GantryError, Result};

/// Parses dotenv text: `KEY=VALUE` lines, optional `export ` prefix,
/// `#` comments, single- or double-quoted values. Later keys win.
///
/// # Errors
///
/// Returns [`GantryError::Config`] for a line without `=` or with an
/// unterminated quote.
pub fn parse(text: &str) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = line.split_once('=').ok_or_else(|| GantryError::Config {
            message: format!("line {}: expected KEY=VALUE, got {raw:?}", idx + 1),
        })?;
        let value = unquote(value.trim()).ok_or_else(|| GantryError::Config {
            message: format!("line {}: unterminated quoted value", idx + 1),
        })?;
        let _ = vars.insert(key.trim().to_string(), value);
    }
    Ok(vars)
}

fn unquote(value: &str) -> Option<String> {
    let Some(quote) = value.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        // Unquoted values end at an inline comment.
        let end = value.find(" #").unwrap_or(value.len());
        return Some(value[..end].trim_end().to_string());
    };
    let inner = &value[1..];
    let close = inner.rfind(quote)?;
    let body = &inner[..close];
    if quote == '\'' {
        return Some(body.to_string());
    }
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// Reads and parses a dotenv file.
///
/// # Errors
///
/// Returns [`GantryError::Io`] if the file cannot be read, or the parse
/// errors of [`parse`].
pub fn read(path: &Path) -> Result<HashMap<String, String>> {
    tracing::debug!(path = %path.display(), "reading env file");
    let text = std::fs::read_to_string(path).map_err(|source| GantryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_pairs() {
        let vars = parse("A=1\nB = two\n").expect("parse");
        assert_eq!(vars.get("A").map(String::as_str), Some("1"));
        assert_eq!(vars.get("B").map(String::as_str), Some("two"));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let vars = parse("# header\n\nTAG=1.0 # pinned\n").expect("parse");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("TAG").map(String::as_str), Some("1.0"));
    }

    #[test]
    fn handles_export_and_quotes() {
        let vars = parse("export NAME=\"hello\\nworld\"\nRAW='a $b # c'\n").expect("parse");
        assert_eq!(vars.get("NAME").map(String::as_str), Some("hello\nworld"));
        assert_eq!(vars.get("RAW").map(String::as_str), Some("a $b # c"));
    }

    #[test]
    fn rejects_line_without_equals() {
        assert!(parse("JUSTAKEY\n").is_err());
    }

    #[test]
    fn rejects_unterminated_quote() {
        assert!(parse("X=\"open\n").is_err());
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".env");
        std::fs::write(&path, "IMAGE_TAG=3.19\n").expect("write");
        let vars = read(&path).expect("read");
        assert_eq!(vars.get("IMAGE_TAG").map(String::as_str), Some("3.19"));
    }
}
