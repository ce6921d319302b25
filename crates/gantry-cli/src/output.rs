//! Output helpers: where the generated source goes and the summary line
//! printed after writing a file.

use std::io::Write;
use std::path::Path;

use anyhow::Context;

/// Writes `source` to `path`, or to stdout when no path is given.
///
/// Writing to a file also prints a one-line summary to stdout.
///
/// # Errors
///
/// Returns an error if the file or stdout cannot be written.
pub fn write_source(path: Option<&Path>, source: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    match path {
        Some(path) => {
            std::fs::write(path, source)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = source.len(), "generated source written");
            writeln!(stdout, "{}", summary(path, source))?;
        }
        None => stdout.write_all(source.as_bytes())?,
    }
    stdout.flush()?;
    Ok(())
}

/// `Wrote deploy.go (1.2 KiB, 3 functions)`.
fn summary(path: &Path, source: &str) -> String {
    let functions = source.lines().filter(|l| l.starts_with("func ")).count();
    format!(
        "Wrote {} ({}, {functions} function{})",
        path.display(),
        format_bytes(source.len() as u64),
        if functions == 1 { "" } else { "s" }
    )
}

/// Formats a byte count into a human-readable string (e.g., "128 MiB").
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;

    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
