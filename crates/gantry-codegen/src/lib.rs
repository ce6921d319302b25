//! # gantry-codegen
//!
//! Lowers a loaded deployment descriptor into Go source that rebuilds the
//! same deployment through a fluent builder API.
//!
//! The pipeline runs one way:
//!
//! 1. **Lowering**: each entity becomes an ordered list of call nodes
//!    ([`lower`]).
//! 2. **Assembly**: call nodes become function declarations
//!    ([`assemble`]).
//! 3. **Rendering**: the tree is printed ([`render`]) and passed through a
//!    [`Canonicalize`] pass.
//!
//! Generation is pure: the same project and options always produce the same
//! bytes, and a failure yields an error with no partial output.

pub mod assemble;
pub mod ast;
mod entry;
pub mod ident;
pub mod lower;
pub mod namespace;
pub mod render;

use gantry_common::config::GenerateOptions;
use gantry_common::error::Result;
use gantry_compose::model::Project;

pub use render::canonical::{Canonicalize, ImportPruner};

/// Generates Go source for `project` with the built-in canonicalize pass.
///
/// # Errors
///
/// Returns an error on identifier collisions, on render failures, and when
/// the canonicalize pass rejects the output.
pub fn generate(project: &Project, options: &GenerateOptions) -> Result<String> {
    generate_with(project, options, &ImportPruner)
}

/// Generates Go source for `project`, finishing with `canonicalizer`.
///
/// # Errors
///
/// Same as [`generate`], plus any error `canonicalizer` reports.
pub fn generate_with(
    project: &Project,
    options: &GenerateOptions,
    canonicalizer: &dyn Canonicalize,
) -> Result<String> {
    tracing::info!(
        project = %options.effective_project_name(&project.name),
        services = project.services.len(),
        networks = project.networks.len(),
        volumes = project.volumes.len(),
        emit_main = options.emit_main,
        "generating Go source"
    );

    let file = assemble::assemble(project, options)?;
    tracing::debug!(functions = file.funcs.len(), "program assembled");

    let source = render::render(&file, &options.api_module)?;
    let source = canonicalizer.canonicalize(&source)?;
    tracing::debug!(bytes = source.len(), "source rendered");
    Ok(source)
}
