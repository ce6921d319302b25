//! The single command: load descriptors, generate Go, write it out.

use anyhow::Context;
use clap::CommandFactory;

use crate::cli::Cli;
use crate::gofmt::ExternalFormatter;

/// Executes a generation run.
///
/// With no `-f` given, usage is printed and the run succeeds.
///
/// # Errors
///
/// Returns an error if loading, generation, formatting, or writing fails.
pub fn execute(cli: &Cli) -> anyhow::Result<()> {
    if cli.files.is_empty() {
        tracing::debug!("no descriptor files, printing usage");
        Cli::command().print_help()?;
        return Ok(());
    }

    let files = cli.files.clone();
    for file in &files {
        if !file.exists() {
            anyhow::bail!("file not found: {}", file.display());
        }
    }

    let project = gantry_compose::load(&cli.load_options(files))
        .context("failed to load descriptors")?;
    let options = cli.generate_options();

    let source = if cli.gofmt {
        let formatter = ExternalFormatter::locate()?;
        gantry_codegen::generate_with(&project, &options, &formatter)
    } else {
        gantry_codegen::generate(&project, &options)
    }
    .context("failed to generate Go source")?;

    crate::output::write_source(cli.output.as_deref(), &source)
}
