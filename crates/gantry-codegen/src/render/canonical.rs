//! Final text pass over rendered source.
//!
//! [`ImportPruner`] is the built-in pass. It rejects text with unbalanced
//! delimiters or unterminated literals, drops imports no code refers to,
//! and canonicalizes whitespace. Any other [`Canonicalize`] implementation
//! (an external formatter, say) can take its place.

use gantry_common::error::{GantryError, Result};

/// A whole-text formatting pass applied to generated source.
pub trait Canonicalize {
    /// Returns the canonical form of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`GantryError::Format`] when the source cannot be formatted.
    fn canonicalize(&self, source: &str) -> Result<String>;
}

/// Built-in canonicalizer: import pruning plus whitespace cleanup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportPruner;

impl Canonicalize for ImportPruner {
    fn canonicalize(&self, source: &str) -> Result<String> {
        let code = strip_literals(source)?;
        let lines: Vec<&str> = source.lines().collect();
        let code_lines: Vec<&str> = code.lines().collect();

        let kept = prune_imports(&lines, &code_lines);
        Ok(normalize_whitespace(&kept))
    }
}

/// Returns `source` with the contents of strings, runes and comments blanked
/// out (newlines kept), after checking that delimiters balance.
fn strip_literals(source: &str) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut line = 1usize;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                out.push(' ');
                let mut closed = false;
                while let Some(inner) = chars.next() {
                    match inner {
                        '\\' => {
                            let _ = chars.next();
                            out.push_str("  ");
                        }
                        '\n' => break,
                        q if q == c => {
                            closed = true;
                            break;
                        }
                        _ => out.push(' '),
                    }
                }
                if !closed {
                    return Err(GantryError::format(format!(
                        "unterminated literal on line {line}"
                    )));
                }
                out.push(' ');
            }
            '`' => {
                out.push(' ');
                let start = line;
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '`' {
                        closed = true;
                        break;
                    }
                    if inner == '\n' {
                        line += 1;
                        out.push('\n');
                    } else {
                        out.push(' ');
                    }
                }
                if !closed {
                    return Err(GantryError::format(format!(
                        "unterminated raw string starting on line {start}"
                    )));
                }
                out.push(' ');
            }
            '/' if chars.peek() == Some(&'/') => {
                out.push(' ');
                while let Some(&inner) = chars.peek() {
                    if inner == '\n' {
                        break;
                    }
                    let _ = chars.next();
                    out.push(' ');
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                let _ = chars.next();
                out.push_str("  ");
                let start = line;
                let mut prev = '\0';
                let mut closed = false;
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        closed = true;
                        out.push(' ');
                        break;
                    }
                    if inner == '\n' {
                        line += 1;
                        out.push('\n');
                    } else {
                        out.push(' ');
                    }
                    prev = inner;
                }
                if !closed {
                    return Err(GantryError::format(format!(
                        "unterminated comment starting on line {start}"
                    )));
                }
            }
            '(' | '[' | '{' => {
                stack.push((c, line));
                out.push(c);
            }
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => out.push(c),
                    _ => {
                        return Err(GantryError::format(format!(
                            "unbalanced '{c}' on line {line}"
                        )));
                    }
                }
            }
            '\n' => {
                line += 1;
                out.push('\n');
            }
            other => out.push(other),
        }
    }

    if let Some((open, at)) = stack.pop() {
        return Err(GantryError::format(format!(
            "unclosed '{open}' opened on line {at}"
        )));
    }
    Ok(out)
}

/// One import line inside the import block.
struct ImportLine {
    index: usize,
    qualifier: String,
}

/// Drops import lines whose qualifier never appears as `qualifier.` in code
/// outside the import declaration. An emptied block is removed entirely.
fn prune_imports(lines: &[&str], code: &[&str]) -> Vec<String> {
    let Some((open, close)) = import_block(lines) else {
        return lines.iter().map(|l| (*l).to_string()).collect();
    };

    let imports: Vec<ImportLine> = (open + 1..close)
        .filter_map(|index| {
            parse_import(lines[index]).map(|qualifier| ImportLine { index, qualifier })
        })
        .collect();
    let unused: Vec<usize> = imports
        .iter()
        .filter(|import| {
            !code
                .iter()
                .enumerate()
                .filter(|(i, _)| *i < open || *i > close)
                .any(|(_, line)| references(line, &import.qualifier))
        })
        .map(|import| import.index)
        .collect();
    for index in &unused {
        tracing::debug!(import = lines[*index].trim(), "unused import pruned");
    }

    let remaining = imports.len() - unused.len();
    lines
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            if remaining == 0 {
                *i < open || *i > close
            } else {
                !unused.contains(i)
            }
        })
        .map(|(_, l)| (*l).to_string())
        .fold(Vec::new(), |mut acc: Vec<String>, line| {
            // Blank lines directly inside `import (` or before `)` are dropped.
            let after_open = acc.last().is_some_and(|l| l.trim() == "import (");
            if line.trim().is_empty() && after_open {
                return acc;
            }
            if line.trim() == ")" && acc.last().is_some_and(|l| l.trim().is_empty()) {
                let _ = acc.pop();
            }
            acc.push(line);
            acc
        })
}

/// Line indices of `import (` and its closing `)`.
fn import_block(lines: &[&str]) -> Option<(usize, usize)> {
    let open = lines.iter().position(|l| l.trim() == "import (")?;
    let close = lines[open..].iter().position(|l| l.trim() == ")")? + open;
    Some((open, close))
}

/// Returns the qualifier an import line binds: its alias, or the last
/// segment of its path.
fn parse_import(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (alias, path) = match line.split_once(char::is_whitespace) {
        Some((alias, path)) => (Some(alias), path.trim()),
        None => (None, line),
    };
    let path = path.strip_prefix('"')?.strip_suffix('"')?;
    match alias {
        Some("_" | ".") => None,
        Some(alias) => Some(alias.to_string()),
        None => path.rsplit('/').next().map(str::to_string),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `line` contains `qualifier.` not preceded by an identifier
/// character or a dot.
fn references(line: &str, qualifier: &str) -> bool {
    let needle = format!("{qualifier}.");
    line.match_indices(&needle).any(|(at, _)| {
        line[..at]
            .chars()
            .next_back()
            .is_none_or(|c| !is_ident_char(c) && c != '.')
    })
}

/// Trims trailing whitespace, collapses blank-line runs, drops leading
/// blank lines, and ends the text with exactly one newline.
fn normalize_whitespace(lines: &[String]) -> String {
    let mut out = String::new();
    let mut blank_run = false;
    for line in lines {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run = !out.is_empty();
            continue;
        }
        if blank_run {
            out.push('\n');
            blank_run = false;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "package main\n\
        \n\
        import (\n\
        \t\"context\"\n\
        \t\"time\"\n\
        \n\
        \t\"example.com/api/gantry\"\n\
        )\n\
        \n\
        // time is not a reference: time.Second\n\
        func Project() *gantry.Project {   \n\
        \treturn gantry.NewProject(\"context.Background\")\n\
        }\n\
        \n\
        \n\
        \n";

    #[test]
    fn prunes_imports_only_seen_in_strings_and_comments() {
        let out = ImportPruner.canonicalize(SOURCE).expect("canonicalize");
        assert!(!out.contains("\"context\""), "got:\n{out}");
        assert!(!out.contains("\"time\""), "got:\n{out}");
        assert!(out.contains("\t\"example.com/api/gantry\"\n)"), "got:\n{out}");
        assert!(out.contains("import (\n\t\"example.com"), "got:\n{out}");
    }

    #[test]
    fn canonical_whitespace() {
        let out = ImportPruner.canonicalize(SOURCE).expect("canonicalize");
        assert!(out.ends_with("}\n"));
        assert!(!out.ends_with("\n\n"));
        assert!(!out.contains("   \n"));
        assert!(!out.contains("\n\n\n"));
    }

    #[test]
    fn removes_emptied_import_block() {
        let src = "package main\n\nimport (\n\t\"os\"\n)\n\nfunc main() {\n}\n";
        let out = ImportPruner.canonicalize(src).expect("canonicalize");
        assert_eq!(out, "package main\n\nfunc main() {\n}\n");
    }

    #[test]
    fn keeps_used_imports() {
        let src = "package main\n\nimport (\n\t\"os\"\n)\n\nfunc main() {\n\tos.Exit(0)\n}\n";
        let out = ImportPruner.canonicalize(src).expect("canonicalize");
        assert_eq!(out, src);
    }

    #[test]
    fn selector_on_other_value_is_not_a_reference() {
        assert!(!references("x := cfg.os.Name", "os"));
        assert!(!references("myos.Exit(1)", "os"));
        assert!(references("\tos.Exit(1)", "os"));
        assert!(references("f(os.Stdout)", "os"));
    }

    #[test]
    fn unbalanced_delimiters_fail() {
        let err = ImportPruner
            .canonicalize("func main() {\n")
            .expect_err("unclosed brace");
        assert!(matches!(err, GantryError::Format { .. }));
        assert!(ImportPruner.canonicalize("f(]").is_err());
    }

    #[test]
    fn unterminated_string_fails() {
        let err = ImportPruner
            .canonicalize("x := \"open\n")
            .expect_err("unterminated");
        assert!(matches!(err, GantryError::Format { .. }));
    }

    #[test]
    fn delimiters_inside_strings_are_ignored() {
        let src = "package main\n\nvar s = \"({[\"\n";
        assert_eq!(ImportPruner.canonicalize(src).expect("canonicalize"), src);
    }

    #[test]
    fn aliased_import_qualifier() {
        assert_eq!(parse_import("\tgx \"example.com/api/gantry\""), Some("gx".into()));
        assert_eq!(parse_import("\t\"os/signal\""), Some("signal".into()));
        assert_eq!(parse_import("\t_ \"embed\""), None);
    }
}
