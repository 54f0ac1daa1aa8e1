//! `[bundles.*]` and `[overrides]` checks.
//!
//! Graph-wide problems (cycles) are left to `assetry check` and to
//! resolution; this pass reports what is wrong with each entry on its own.

use indexmap::IndexMap;

use crate::bundle::{AssetKind, BundleId, BundleOverride, BundleSpec};
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::publish::PathFilter;
use crate::utils::url;

pub fn validate_bundles(
    bundles: &IndexMap<BundleId, BundleSpec>,
    overrides: &IndexMap<BundleId, BundleOverride>,
    diag: &mut ConfigDiagnostics,
) {
    for (id, spec) in bundles {
        check_depends(id, spec, bundles, diag);
        check_filters(id, spec, diag);
        check_location(id, spec, diag);
    }

    for id in overrides.keys() {
        if !bundles.contains_key(id) {
            diag.warn(FieldPath::override_of(id.as_str()), "override for unknown bundle is ignored");
        }
    }
}

fn check_depends(
    id: &BundleId,
    spec: &BundleSpec,
    bundles: &IndexMap<BundleId, BundleSpec>,
    diag: &mut ConfigDiagnostics,
) {
    for dep in &spec.depends {
        if dep == id {
            diag.error(FieldPath::bundle(id.as_str(), "depends"), "bundle depends on itself");
        } else if !bundles.contains_key(dep) {
            diag.error_with_hint(
                FieldPath::bundle(id.as_str(), "depends"),
                format!("unknown bundle `{dep}`"),
                format!("define it as [bundles.{dep}]"),
            );
        }
    }
}

fn check_filters(id: &BundleId, spec: &BundleSpec, diag: &mut ConfigDiagnostics) {
    let options = &spec.publish_options;
    for (field, patterns) in [("publish_options.only", &options.only), ("publish_options.except", &options.except)] {
        for pattern in patterns {
            if let Err(e) = PathFilter::check(pattern) {
                diag.error(FieldPath::bundle(id.as_str(), field), e.to_string());
            }
        }
    }
}

/// Relative files need somewhere to be served from.
fn check_location(id: &BundleId, spec: &BundleSpec, diag: &mut ConfigDiagnostics) {
    if spec.source_path.is_some() {
        if spec.base_path.is_some() && spec.base_url.is_some() {
            diag.warn(
                FieldPath::bundle(id.as_str(), "source_path"),
                "not published: base_path and base_url are both set",
            );
        }
        return;
    }
    if spec.base_url.is_some() {
        return;
    }
    let has_relative = AssetKind::ALL
        .iter()
        .flat_map(|kind| spec.files(*kind))
        .any(|f| url::is_relative(f.path()) && !f.path().starts_with('@'));
    if has_relative {
        diag.error_with_hint(
            FieldPath::bundle(id.as_str(), "base_url"),
            "bundle lists relative files but has neither source_path nor base_url",
            "set source_path to publish the files, or base_path and base_url if they are already public",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(toml_src: &str) -> ConfigDiagnostics {
        #[derive(serde::Deserialize)]
        struct Doc {
            #[serde(default)]
            bundles: IndexMap<BundleId, BundleSpec>,
            #[serde(default)]
            overrides: IndexMap<BundleId, BundleOverride>,
        }
        let doc: Doc = toml::from_str(toml_src).unwrap();
        let mut diag = ConfigDiagnostics::new();
        validate_bundles(&doc.bundles, &doc.overrides, &mut diag);
        diag
    }

    fn fields(diag: &ConfigDiagnostics) -> Vec<&str> {
        diag.errors().iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_valid_bundles() {
        let diag = check(
            r#"
[bundles.jquery]
source_path = "vendor/jquery"
js = ["jquery.js"]

[bundles.app]
base_url = "/app"
js = ["app.js", "https://cdn.example.com/x.js"]
depends = ["jquery"]
"#,
        );
        assert!(diag.is_empty(), "{diag}");
    }

    #[test]
    fn test_unknown_and_self_dependency() {
        let diag = check(
            r#"
[bundles.app]
depends = ["ghost", "app"]
"#,
        );
        assert_eq!(fields(&diag), vec!["bundles.app.depends", "bundles.app.depends"]);
        assert!(diag.errors()[0].message.contains("ghost"));
        assert!(diag.errors()[1].message.contains("itself"));
    }

    #[test]
    fn test_invalid_glob() {
        let diag = check(
            r#"
[bundles.app]
source_path = "src"
publish_options = { only = ["js/["] }
"#,
        );
        assert_eq!(fields(&diag), vec!["bundles.app.publish_options.only"]);
    }

    #[test]
    fn test_relative_files_need_location() {
        let diag = check(
            r#"
[bundles.app]
css = ["site.css"]

[bundles.cdn]
js = ["https://cdn.example.com/x.js", "/rooted.js", "@web/app.js"]
"#,
        );
        assert_eq!(fields(&diag), vec!["bundles.app.base_url"]);
    }

    #[test]
    fn test_source_with_full_location_warns() {
        let diag = check(
            r#"
[bundles.served]
source_path = "vendor/x"
base_path = "public/x"
base_url = "/x"
js = ["x.js"]

[bundles.cdn]
source_path = "vendor/y"
base_url = "https://cdn.example.com/y"
js = ["y.js"]
"#,
        );
        assert!(diag.is_empty(), "{diag}");
        let warned: Vec<&str> = diag.warnings().iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(warned, vec!["bundles.served.source_path"]);
    }

    #[test]
    fn test_unknown_override_warns() {
        let diag = check(
            r#"
[overrides]
legacy = false
"#,
        );
        assert!(diag.is_empty());
        assert_eq!(diag.warnings()[0].0.as_str(), "overrides.legacy");
    }
}
