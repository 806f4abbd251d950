//! Catalog commands
//!
//! Implements `catalog show` and `catalog validate`.

use std::path::Path;

use privchain_core::catalog::{Catalog, CatalogLoader, PrivilegeLevel, TargetComponent};
use privchain_core::error::{CatalogError, Severity, ValidationIssue};
use serde::Serialize;
use tracing::info;

use super::load_catalog;
use crate::cli::args::{CatalogShowArgs, CatalogValidateArgs, OutputFormat};
use crate::error::PrivChainError;

/// JSON view of a catalog.
#[derive(Serialize)]
struct CatalogView<'a> {
    name: &'a str,
    start_level: &'a str,
    terminal_levels: Vec<&'a str>,
    levels: Vec<&'a PrivilegeLevel>,
    components: &'a [TargetComponent],
}

impl<'a> CatalogView<'a> {
    fn new(catalog: &'a Catalog) -> Self {
        Self {
            name: catalog.name(),
            start_level: catalog.start_level(),
            terminal_levels: catalog.terminal_levels().iter().map(String::as_str).collect(),
            levels: catalog.levels(),
            components: catalog.components(),
        }
    }
}

/// Print the active catalog.
///
/// # Errors
///
/// Returns a catalog error if the catalog cannot be loaded.
pub fn show(args: &CatalogShowArgs, catalog_path: Option<&Path>) -> Result<(), PrivChainError> {
    let catalog = load_catalog(catalog_path)?;

    match args.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&CatalogView::new(&catalog))?
            );
        }
        OutputFormat::Human => print!("{}", render_human(&catalog)),
    }
    Ok(())
}

fn render_human(catalog: &Catalog) -> String {
    let mut out = format!(
        "{} (start: {}, {} levels, {} components, {} techniques)\n",
        catalog.name(),
        catalog.start_level(),
        catalog.levels().len(),
        catalog.components().len(),
        catalog.technique_count()
    );

    for level in catalog.levels() {
        let marker = if catalog.is_terminal(&level.name) {
            " (terminal)"
        } else {
            ""
        };
        out.push_str(&format!("\n{}{marker}\n", level.name));

        for component in catalog.components_by_source_level(&level.name) {
            out.push_str(&format!(
                "  {:<12} {} -> {}\n",
                component.id, component.name, component.target_privilege
            ));
            for technique in &component.techniques {
                let cves = if technique.cves.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", technique.cves.join(", "))
                };
                out.push_str(&format!(
                    "    {}/{}  {}{cves}\n",
                    component.id, technique.id, technique.name
                ));
            }
        }
    }
    out
}

/// Validate catalog files.
///
/// With `--strict`, a file that loads with warnings fails validation.
///
/// # Errors
///
/// Returns the first file's catalog error, or a validation error built
/// from its warnings in strict mode.
pub fn validate(args: &CatalogValidateArgs) -> Result<(), PrivChainError> {
    let loader = CatalogLoader::with_defaults();

    for path in &args.files {
        info!(file = %path.display(), "validating catalog");
        let result = loader.load(path)?;

        if result.warnings.is_empty() {
            println!("{}: ok", path.display());
        } else {
            println!(
                "{}: ok ({} warning(s))",
                path.display(),
                result.warnings.len()
            );
            for warning in &result.warnings {
                println!("  warning: {warning}");
            }
        }

        if args.strict && !result.warnings.is_empty() {
            let errors = result
                .warnings
                .into_iter()
                .map(|w| ValidationIssue {
                    path: w.location.unwrap_or_default(),
                    message: w.message,
                    severity: Severity::Error,
                })
                .collect();
            return Err(CatalogError::ValidationError {
                path: path.display().to_string(),
                errors,
            }
            .into());
        }

        info!(file = %path.display(), "catalog valid");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use privchain_core::catalog::builtin_catalog;

    #[test]
    fn test_human_listing_groups_by_source_level() {
        let catalog = builtin_catalog().unwrap().catalog;
        let out = render_human(&catalog);

        assert!(out.starts_with("browser-escalation (start: Sandbox"));
        assert!(out.contains("\nSystem/Root (terminal)\n"));
        assert!(out.contains("    v8/jit-type-confusion  JIT Type Confusion"));
        let sandbox = out.find("\nSandbox\n").unwrap();
        let renderer = out.find("\nRenderer\n").unwrap();
        let v8 = out.find("v8/jit-type-confusion").unwrap();
        assert!(sandbox < v8 && v8 < renderer);
    }

    #[test]
    fn test_json_view_fields() {
        let catalog = builtin_catalog().unwrap().catalog;
        let json = serde_json::to_value(CatalogView::new(&catalog)).unwrap();
        assert_eq!(json["start_level"], "Sandbox");
        assert_eq!(json["terminal_levels"], serde_json::json!(["System/Root"]));
        assert_eq!(json["components"][0]["id"], "v8");
    }

    #[test]
    fn test_strict_validation_fails_on_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warn.yaml");
        std::fs::write(
            &path,
            r"
name: warn
start_level: Sandbox
levels:
  - name: Sandbox
  - name: Root
  - name: Orphan
components:
  - id: A
    name: A
    source_privilege: Sandbox
    target_privilege: Root
    techniques:
      - id: T1
        name: T1
",
        )
        .unwrap();

        let lenient = CatalogValidateArgs {
            files: vec![path.clone()],
            strict: false,
        };
        assert!(validate(&lenient).is_ok());

        let strict = CatalogValidateArgs {
            files: vec![path],
            strict: true,
        };
        let err = validate(&strict).unwrap_err();
        assert!(matches!(
            err,
            PrivChainError::Catalog(CatalogError::ValidationError { .. })
        ));
    }
}
