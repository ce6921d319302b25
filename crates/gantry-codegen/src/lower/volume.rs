//! Volume lowering.

use gantry_compose::model::{Project, Volume, sorted};

use super::{Calls, non_empty};
use crate::ast::Expr;
use crate::namespace::Namespace;

/// Lowers every non-external volume, in ascending key order.
pub fn lower_volumes(project: &Project) -> Vec<Expr> {
    sorted(&project.volumes)
        .into_iter()
        .filter(|(_, volume)| !volume.external)
        .map(|(key, volume)| lower_volume(key, volume))
        .collect()
}

/// Lowers one volume. A trivial volume yields the name-only form.
pub fn lower_volume(key: &str, volume: &Volume) -> Expr {
    let name = non_empty(volume.name.as_ref()).unwrap_or(key);
    let mut args = vec![Expr::str(name)];
    if !volume.is_trivial() {
        let mut opts = Calls::new(Namespace::Volume);
        opts.string("Driver", volume.driver.as_ref());
        opts.pairs("DriverOpt", &volume.driver_opts);
        opts.pairs("Label", &volume.labels);
        args.extend(opts.into_vec());
    }
    Expr::call(Namespace::Volume, "New", args)
}
