//! Per-service lowering: container constructor chain and orchestration
//! constructor.

use gantry_compose::model::{Project, Service};

use super::container::lower_container;
use super::endpoint::lower_endpoints;
use super::host::lower_host;
use super::orchestration::lower_orchestration;
use super::platform::lower_platform;
use crate::ast::Expr;
use crate::ident::resolve_identifier;
use crate::namespace::Namespace;

/// The lowered form of one service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceLowering {
    /// Service name as declared.
    pub name: String,
    /// Exported identifier derived from the name.
    pub ident: String,
    /// `gantry.NewContainer()` chained with the non-empty setting groups.
    pub container: Expr,
    /// `gantry.NewService(...)`, when any orchestration concern is set.
    pub orchestration: Option<Expr>,
}

impl ServiceLowering {
    /// Name of the generated container constructor function.
    #[must_use]
    pub fn container_func(&self) -> String {
        format!("{}Container", self.ident)
    }

    /// Name of the generated orchestration constructor function.
    #[must_use]
    pub fn service_func(&self) -> String {
        format!("{}Service", self.ident)
    }
}

/// Lowers every service, in ascending name order.
pub fn lower_services(project: &Project) -> Vec<ServiceLowering> {
    project.sorted_services().into_iter().map(lower_service).collect()
}

/// Lowers one service.
pub fn lower_service(service: &Service) -> ServiceLowering {
    let groups = [
        ("WithConfig", lower_container(service)),
        ("WithHostConfig", lower_host(service)),
        ("WithNetworkingConfig", lower_endpoints(service)),
        ("WithPlatform", lower_platform(service)),
    ];
    let container = groups.into_iter().filter(|(_, calls)| !calls.is_empty()).fold(
        Expr::call(Namespace::Gantry, "NewContainer", vec![]),
        |chain, (method, calls)| Expr::method(chain, method, vec![Expr::Group(calls)]),
    );

    let orchestration = lower_orchestration(service);
    let orchestration = (!orchestration.is_empty())
        .then(|| Expr::call(Namespace::Gantry, "NewService", vec![Expr::Group(orchestration)]));

    ServiceLowering {
        name: service.name.clone(),
        ident: resolve_identifier(&service.name),
        container,
        orchestration,
    }
}
