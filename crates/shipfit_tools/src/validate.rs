//! Data validation utilities.

use std::fs;
use std::path::{Path, PathBuf};

use shipfit_core::catalog::Catalog;
use shipfit_core::config::FitConfig;
use shipfit_core::error::FitError;
use thiserror::Error;

/// File name of the catalog inside a data directory.
pub const CATALOG_FILE: &str = "catalog.ron";

/// File name of the optional fitting config inside a data directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Errors raised by the development tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A data file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A document failed to parse, or a fit operation failed.
    #[error(transparent)]
    Fit(#[from] FitError),

    /// A catalog parsed but has consistency problems.
    #[error("{path} has {} problem(s):\n  {}", problems.len(), problems.join("\n  "))]
    Invalid {
        /// File that failed validation.
        path: PathBuf,
        /// Human-readable problems.
        problems: Vec<String>,
    },

    /// A command-line argument could not be understood.
    #[error("Invalid argument: {0}")]
    Argument(String),
}

/// Result type for tool operations.
pub type ToolResult<T> = std::result::Result<T, ToolError>;

fn read(path: &Path) -> ToolResult<String> {
    fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse a catalog file without validating it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_catalog(path: &Path) -> ToolResult<Catalog> {
    let catalog = Catalog::from_ron_str(&read(path)?)?;
    tracing::debug!(
        path = %path.display(),
        sizes = catalog.ship_sizes.len(),
        primaries = catalog.primaries.len(),
        secondaries = catalog.secondaries.len(),
        modules = catalog.modules.len(),
        hulls = catalog.hulls.len(),
        "Loaded catalog"
    );
    Ok(catalog)
}

/// Read and parse a fitting config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> ToolResult<FitConfig> {
    Ok(FitConfig::from_ron_str(&read(path)?)?)
}

/// Load the config next to a catalog, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if a config file exists but fails to parse.
pub fn load_config_beside(catalog_path: &Path) -> ToolResult<FitConfig> {
    let path = catalog_path.with_file_name(CONFIG_FILE);
    if path.exists() {
        load_config(&path)
    } else {
        Ok(FitConfig::default())
    }
}

/// Parse and validate a single catalog file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails to parse, or has
/// consistency problems.
pub fn validate_catalog_file(path: &Path) -> ToolResult<Catalog> {
    let catalog = load_catalog(path)?;
    let problems = catalog.validate();
    if !problems.is_empty() {
        return Err(ToolError::Invalid {
            path: path.to_path_buf(),
            problems,
        });
    }
    Ok(catalog)
}

/// Validate all RON data files in a directory.
///
/// The directory must contain [`CATALOG_FILE`]; [`CONFIG_FILE`] is checked
/// when present.
///
/// # Errors
///
/// Returns an error if any data file fails validation.
pub fn validate_data_directory(path: &Path) -> ToolResult<()> {
    let catalog = validate_catalog_file(&path.join(CATALOG_FILE))?;
    tracing::info!(
        modules = catalog.modules.len(),
        families = catalog.families.len(),
        "Catalog is consistent"
    );

    let config_path = path.join(CONFIG_FILE);
    if config_path.exists() {
        let config = load_config(&config_path)?;
        tracing::info!(k_bw = config.bandwidth.k_bw, "Config parsed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/data")
    }

    #[test]
    fn test_shipped_data_directory_is_valid() {
        let result = validate_data_directory(&data_dir());
        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn test_shipped_catalog_matches_fixture_shape() {
        let catalog = validate_catalog_file(&data_dir().join(CATALOG_FILE)).expect("valid");
        let sample = shipfit_test_utils::fixtures::sample_catalog();
        assert_eq!(catalog.ship_sizes.len(), sample.ship_sizes.len());
        assert_eq!(catalog.primaries.len(), sample.primaries.len());
        assert!(!catalog.families.is_empty());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_catalog(Path::new("/nonexistent/catalog.ron")).expect_err("missing");
        assert!(matches!(err, ToolError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/catalog.ron"));
    }

    #[test]
    fn test_inconsistent_catalog_lists_problems() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = r#"(
            ship_sizes: [(id: Frigate, name: "Frigate", rows: 0, cols: 3)],
            primaries: [
                (id: "dud", name: "Dud", shape_class: wide, ratio: (power: 0.0)),
                (id: "dud", name: "Dud Again", shape_class: wide, ratio: (power: 1.0)),
            ],
            families: [],
        )"#;
        fs::write(dir.path().join(CATALOG_FILE), source).expect("write catalog");

        let err = validate_data_directory(dir.path()).expect_err("inconsistent");
        let ToolError::Invalid { problems, .. } = &err else {
            panic!("expected validation problems, got {err}");
        };
        assert_eq!(problems.len(), 3, "{problems:?}");
        assert!(err.to_string().contains("3 problem(s)"));
    }

    #[test]
    fn test_unparseable_config_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join(CATALOG_FILE), "(families: [])").expect("write catalog");
        fs::write(dir.path().join(CONFIG_FILE), "(generator: 7)").expect("write config");

        let err = validate_data_directory(dir.path()).expect_err("bad config");
        assert!(matches!(err, ToolError::Fit(FitError::ParseError { what: "config", .. })));
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let config = load_config_beside(Path::new("/nonexistent/catalog.ron")).expect("defaults");
        assert_eq!(config, FitConfig::default());
    }
}
