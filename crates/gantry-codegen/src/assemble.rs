//! Program assembly: the project constructor, one container constructor per
//! service, orchestration constructors where needed, and the optional entry
//! point.

use std::collections::HashMap;

use gantry_common::config::GenerateOptions;
use gantry_common::constants::APP_NAME;
use gantry_common::error::{GantryError, Result};
use gantry_compose::model::Project;

use crate::ast::{Expr, File, FuncDecl, Stmt, TypeExpr};
use crate::entry;
use crate::lower::network::lower_networks;
use crate::lower::service::{ServiceLowering, lower_services};
use crate::lower::volume::lower_volumes;
use crate::namespace::Namespace;

/// Local variable holding the project inside `Project()`.
pub const PROJECT_VAR: &str = "proj";

/// Name of the generated project constructor.
pub const PROJECT_FUNC: &str = "Project";

/// Builds the whole file tree for one project.
///
/// # Errors
///
/// Returns [`GantryError::NameCollision`] when two service names resolve to
/// the same identifier.
pub fn assemble(project: &Project, options: &GenerateOptions) -> Result<File> {
    let services = lower_services(project);
    check_collisions(&services)?;

    let name = options.effective_project_name(&project.name);
    let mut funcs = vec![project_func(project, name, &services)];
    for service in &services {
        funcs.push(
            FuncDecl::new(
                service.container_func(),
                vec![TypeExpr::pointer_to(Namespace::Gantry, "Container")],
                vec![Stmt::Return(Some(service.container.clone()))],
            )
            .with_doc(format!(
                "{} builds the container of service {:?}.",
                service.container_func(),
                service.name
            )),
        );
        if let Some(orchestration) = &service.orchestration {
            funcs.push(
                FuncDecl::new(
                    service.service_func(),
                    vec![TypeExpr::pointer_to(Namespace::Gantry, "Service")],
                    vec![Stmt::Return(Some(orchestration.clone()))],
                )
                .with_doc(format!(
                    "{} builds the orchestration settings of service {:?}.",
                    service.service_func(),
                    service.name
                )),
            );
        }
    }
    if options.emit_main {
        funcs.extend(entry::entry_point(&options.profiles));
    }

    Ok(File {
        header: vec![format!("Code generated by {APP_NAME}. DO NOT EDIT.")],
        package: options.package.clone(),
        funcs,
    })
}

fn project_func(project: &Project, name: &str, services: &[ServiceLowering]) -> FuncDecl {
    let proj = || Expr::ident(PROJECT_VAR);
    let mut body = vec![Stmt::define(
        PROJECT_VAR,
        Expr::call(Namespace::Gantry, "NewProject", vec![Expr::str(name)]),
    )];

    let sections: [Vec<Stmt>; 3] = [
        lower_networks(project)
            .into_iter()
            .map(|n| Stmt::Expr(Expr::method(proj(), "AddNetwork", vec![n])))
            .collect(),
        lower_volumes(project)
            .into_iter()
            .map(|v| Stmt::Expr(Expr::method(proj(), "AddVolume", vec![v])))
            .collect(),
        services
            .iter()
            .map(|s| Stmt::Expr(Expr::method(proj(), "AddService", registration(s))))
            .collect(),
    ];
    for section in sections.into_iter().filter(|s| !s.is_empty()) {
        body.push(Stmt::Blank);
        body.extend(section);
    }
    body.push(Stmt::Blank);
    body.push(Stmt::Return(Some(proj())));

    FuncDecl::new(
        PROJECT_FUNC,
        vec![TypeExpr::pointer_to(Namespace::Gantry, "Project")],
        body,
    )
    .with_doc(format!("{PROJECT_FUNC} assembles the {name:?} deployment."))
}

fn registration(service: &ServiceLowering) -> Vec<Expr> {
    let mut args = vec![
        Expr::str(service.name.as_str()),
        Expr::ident(service.container_func()),
    ];
    if service.orchestration.is_some() {
        args.push(Expr::ident(service.service_func()));
    }
    args
}

/// Fails on the first pair of services whose names resolve to the same
/// identifier. Services arrive sorted, so `first` sorts before `second`.
fn check_collisions(services: &[ServiceLowering]) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::with_capacity(services.len());
    for service in services {
        if let Some(first) = seen.insert(&service.ident, &service.name) {
            return Err(GantryError::NameCollision {
                identifier: service.ident.clone(),
                first: first.to_string(),
                second: service.name.clone(),
            });
        }
    }
    Ok(())
}
