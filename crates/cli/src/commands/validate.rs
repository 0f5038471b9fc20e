//! `validate` command implementation.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    reader_count: usize,
    recorder_count: usize,
    route_count: usize,
    engine_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            // Validation already proved the route table compiles.
            let engine_count = routing::compile(&blueprint.routes)
                .map(|adjacency| adjacency.len())
                .unwrap_or(0);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    reader_count: blueprint.readers.len(),
                    recorder_count: blueprint.recorders.len(),
                    route_count: blueprint.routes.len(),
                    engine_count,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::RelayBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.routes.is_empty() {
        warnings.push("No routes configured - no engine will be started".to_string());
    }

    let routed_readers: BTreeSet<&str> = blueprint
        .routes
        .values()
        .flat_map(|r| r.readers.iter().map(String::as_str))
        .collect();
    let routed_recorders: BTreeSet<&str> = blueprint
        .routes
        .values()
        .flat_map(|r| r.recorders.iter().map(String::as_str))
        .collect();

    for reader in &blueprint.readers {
        if !routed_readers.contains(reader.name.as_str()) {
            warnings.push(format!(
                "Reader '{}' is not referenced by any route and will never be polled",
                reader.name
            ));
        }
    }

    for recorder in &blueprint.recorders {
        if !routed_recorders.contains(recorder.name.as_str()) {
            warnings.push(format!(
                "Recorder '{}' is not referenced by any route and will never receive jobs",
                recorder.name
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Readers: {}", summary.reader_count);
            println!("  Recorders: {}", summary.recorder_count);
            println!("  Routes: {}", summary.route_count);
            println!("  Engines: {}", summary.engine_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(path: std::path::PathBuf) -> ValidateArgs {
        ValidateArgs {
            config: path,
            json: false,
        }
    }

    #[test]
    fn test_validate_missing_file() {
        let result = validate_config(&args("/nonexistent/relay.toml".into()));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_validate_good_config_with_orphan_warning() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[[readers]]
name = "app"
url = "http://localhost:1234/debug/vars"

[[recorders]]
name = "log"
index = "metrics"

[[recorders]]
name = "orphan"
index = "metrics"

[routes.everything]
readers = "app"
recorders = "log"
"#
        )
        .unwrap();

        let result = validate_config(&args(file.path().to_path_buf()));
        assert!(result.valid, "got: {:?}", result.error);

        let summary = result.summary.unwrap();
        assert_eq!(summary.reader_count, 1);
        assert_eq!(summary.engine_count, 1);

        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("orphan")));
    }

    #[test]
    fn test_validate_broken_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[[readers]]
name = "app"
url = "http://localhost:1234/debug/vars"

[[recorders]]
name = "log"
index = "metrics"

[routes.broken]
readers = "ghost"
recorders = "log"
"#
        )
        .unwrap();

        let result = validate_config(&args(file.path().to_path_buf()));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("'ghost' not in readers"));
    }
}
