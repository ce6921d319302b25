//! Platform selector.

use gantry_compose::model::Service;

use super::{Calls, non_empty};
use crate::ast::Expr;
use crate::namespace::Namespace;

/// Lowers `os[/arch[/variant]]` into platform calls.
///
/// One segment is the architecture, two are OS and architecture, three add
/// the variant. Any other shape passes the whole string as the architecture.
pub fn lower_platform(service: &Service) -> Vec<Expr> {
    let Some(platform) = non_empty(service.platform.as_ref()) else {
        return Vec::new();
    };
    let segments: Vec<&str> = platform.split('/').collect();
    let (os, arch, variant) = match segments.as_slice() {
        [arch] => (None, *arch, None),
        [os, arch] => (Some(*os), *arch, None),
        [os, arch, variant] => (Some(*os), *arch, Some(*variant)),
        _ => (None, platform, None),
    };

    let mut calls = Calls::new(Namespace::Platform);
    if let Some(os) = os {
        calls.push("OS", vec![Expr::str(os)]);
    }
    calls.push("Architecture", vec![Expr::str(arch)]);
    if let Some(variant) = variant {
        calls.push("Variant", vec![Expr::str(variant)]);
    }
    calls.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str, value: &str) -> Expr {
        Expr::call(Namespace::Platform, name, vec![Expr::str(value)])
    }

    fn lower(platform: &str) -> Vec<Expr> {
        lower_platform(&Service {
            platform: Some(platform.into()),
            ..Service::named("a")
        })
    }

    #[test]
    fn absent_platform() {
        assert!(lower_platform(&Service::named("a")).is_empty());
        assert!(lower("").is_empty());
    }

    #[test]
    fn segment_shapes() {
        assert_eq!(lower("arm64"), vec![p("Architecture", "arm64")]);
        assert_eq!(
            lower("linux/amd64"),
            vec![p("OS", "linux"), p("Architecture", "amd64")]
        );
        assert_eq!(
            lower("linux/arm/v7"),
            vec![p("OS", "linux"), p("Architecture", "arm"), p("Variant", "v7")]
        );
    }

    #[test]
    fn degenerate_shape_is_whole_architecture() {
        assert_eq!(lower("a/b/c/d"), vec![p("Architecture", "a/b/c/d")]);
    }
}
