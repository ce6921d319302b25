//! Mount dispatch by mount type.

use gantry_common::constants::{ANONYMOUS_VOLUME, DEFAULT_TMPFS_MODE};
use gantry_compose::model::ServiceVolume;

use super::non_empty;
use crate::ast::Expr;
use crate::namespace::Namespace;

/// Lowers one mount to a `host.*Mount` call.
///
/// The type defaults to `bind`. A bind mount without a source and any
/// unsupported type produce nothing.
pub fn lower_mount(mount: &ServiceVolume) -> Option<Expr> {
    let kind = non_empty(mount.kind.as_ref()).unwrap_or("bind");
    let target = Expr::str(mount.target.as_str());
    match kind {
        "bind" => {
            let Some(source) = non_empty(mount.source.as_ref()) else {
                tracing::debug!(path = %mount.target, "bind mount without source dropped");
                return None;
            };
            let name = if mount.read_only {
                "BindMountReadOnly"
            } else {
                "BindMount"
            };
            Some(Expr::call(Namespace::Host, name, vec![Expr::str(source), target]))
        }
        "volume" => {
            let source = non_empty(mount.source.as_ref()).unwrap_or(ANONYMOUS_VOLUME);
            let name = if mount.read_only {
                "VolumeMountReadOnly"
            } else {
                "VolumeMount"
            };
            Some(Expr::call(Namespace::Host, name, vec![Expr::str(source), target]))
        }
        "tmpfs" => {
            let opts = mount.tmpfs.as_ref();
            let size = opts.and_then(|t| t.size).unwrap_or(0);
            let mode = opts.and_then(|t| t.mode).unwrap_or(DEFAULT_TMPFS_MODE);
            Some(Expr::call(
                Namespace::Host,
                "TmpfsMount",
                vec![target, Expr::int(size), Expr::file_mode(mode)],
            ))
        }
        other => {
            tracing::debug!(kind = other, path = %mount.target, "unsupported mount type dropped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use gantry_compose::model::TmpfsConfig;

    use super::*;

    fn mount(kind: Option<&str>, source: Option<&str>, read_only: bool) -> ServiceVolume {
        ServiceVolume {
            kind: kind.map(str::to_string),
            source: source.map(str::to_string),
            target: "/data".into(),
            read_only,
            tmpfs: None,
        }
    }

    #[test]
    fn bind_is_default_type() {
        assert_eq!(
            lower_mount(&mount(None, Some("./src"), false)),
            Some(Expr::call(
                Namespace::Host,
                "BindMount",
                vec![Expr::str("./src"), Expr::str("/data")]
            ))
        );
    }

    #[test]
    fn read_only_bind() {
        assert_eq!(
            lower_mount(&mount(Some("bind"), Some("/etc/app"), true)),
            Some(Expr::call(
                Namespace::Host,
                "BindMountReadOnly",
                vec![Expr::str("/etc/app"), Expr::str("/data")]
            ))
        );
    }

    #[test]
    fn bind_without_source_is_omitted() {
        assert_eq!(lower_mount(&mount(Some("bind"), None, false)), None);
        assert_eq!(lower_mount(&mount(None, Some(""), false)), None);
    }

    #[test]
    fn volume_without_source_is_anonymous() {
        assert_eq!(
            lower_mount(&mount(Some("volume"), None, false)),
            Some(Expr::call(
                Namespace::Host,
                "VolumeMount",
                vec![Expr::str("anonymous"), Expr::str("/data")]
            ))
        );
        assert_eq!(
            lower_mount(&mount(Some("volume"), Some("pgdata"), true)),
            Some(Expr::call(
                Namespace::Host,
                "VolumeMountReadOnly",
                vec![Expr::str("pgdata"), Expr::str("/data")]
            ))
        );
    }

    #[test]
    fn tmpfs_defaults() {
        assert_eq!(
            lower_mount(&mount(Some("tmpfs"), None, false)),
            Some(Expr::call(
                Namespace::Host,
                "TmpfsMount",
                vec![Expr::str("/data"), Expr::int(0), Expr::file_mode(0o777)]
            ))
        );
    }

    #[test]
    fn tmpfs_options() {
        let mut m = mount(Some("tmpfs"), None, false);
        m.tmpfs = Some(TmpfsConfig {
            size: Some(1024),
            mode: Some(0o1777),
        });
        assert_eq!(
            lower_mount(&m),
            Some(Expr::call(
                Namespace::Host,
                "TmpfsMount",
                vec![Expr::str("/data"), Expr::int(1024), Expr::file_mode(0o1777)]
            ))
        );
    }

    #[test]
    fn other_types_are_omitted() {
        assert_eq!(lower_mount(&mount(Some("npipe"), Some("x"), false)), None);
        assert_eq!(lower_mount(&mount(Some("cluster"), Some("x"), false)), None);
    }
}
