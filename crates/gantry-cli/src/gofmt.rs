//! External `gofmt` as the final canonicalize pass.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use gantry_codegen::{Canonicalize, ImportPruner};
use gantry_common::error::{GantryError, Result};

/// Name of the formatter binary looked up on `PATH`.
const GOFMT: &str = "gofmt";

/// Runs the built-in import pruning, then pipes the text through an
/// external formatter.
#[derive(Debug, Clone)]
pub struct ExternalFormatter {
    program: PathBuf,
}

impl ExternalFormatter {
    /// Finds `gofmt` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`GantryError::Format`] when the binary cannot be found.
    pub fn locate() -> Result<Self> {
        let program = which::which(GOFMT)
            .map_err(|e| GantryError::format(format!("{GOFMT} not found on PATH: {e}")))?;
        tracing::debug!(program = %program.display(), "external formatter located");
        Ok(Self::new(program))
    }

    /// Uses `program` as the formatter.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Canonicalize for ExternalFormatter {
    fn canonicalize(&self, source: &str) -> Result<String> {
        let pruned = ImportPruner.canonicalize(source)?;
        let name = self.program.display();

        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GantryError::format(format!("failed to start {name}: {e}")))?;

        // The formatter reads all input before writing, so feeding stdin
        // up front cannot block on a full stdout pipe.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(pruned.as_bytes()) {
                drop(stdin);
                // The child is reaped on every exit path.
                let _ = child.kill();
                let _ = child.wait();
                return Err(GantryError::format(format!("failed to feed {name}: {e}")));
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| GantryError::format(format!("{name} did not finish: {e}")))?;
        if !output.status.success() {
            return Err(GantryError::format(format!(
                "{name} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| GantryError::format(format!("{name} produced invalid UTF-8: {e}")))
    }
}
