//! Interpolator configuration.
//!
//! The configuration is a TOML document:
//!
//! ```toml
//! n_smooth = 10
//! output_frequency_hours = 6
//!
//! [[model]]
//! input_name = "GFSI"
//! output_name = "GFSO"
//! min_relax_fcst_hour = 12
//! max_relax_fcst_hour = 72
//! ```
//!
//! It is read once per run and never modified afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AppError;

/// Default number of smoothing passes.
pub const DEFAULT_N_SMOOTH: usize = 10;

/// Default spacing of output forecast hours.
pub const DEFAULT_OUTPUT_FREQUENCY_HOURS: i32 = 6;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "ATCF_INTERP_CONFIG";

/// Relaxation window and output naming for one input model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelConfig {
    pub input_name: String,
    pub output_name: String,
    pub min_relax_fcst_hour: i32,
    pub max_relax_fcst_hour: i32,
}

/// Read-only configuration for one interpolation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    models: BTreeMap<String, ModelConfig>,
    pub n_smooth: usize,
    pub output_frequency_hours: i32,
}

impl Default for Configuration {
    /// Permissive default: no models configured.
    fn default() -> Self {
        Self {
            models: BTreeMap::new(),
            n_smooth: DEFAULT_N_SMOOTH,
            output_frequency_hours: DEFAULT_OUTPUT_FREQUENCY_HOURS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default = "default_n_smooth")]
    n_smooth: usize,
    #[serde(default = "default_output_frequency_hours")]
    output_frequency_hours: i32,
    #[serde(default, rename = "model")]
    models: Vec<ModelConfig>,
}

fn default_n_smooth() -> usize {
    DEFAULT_N_SMOOTH
}

fn default_output_frequency_hours() -> i32 {
    DEFAULT_OUTPUT_FREQUENCY_HOURS
}

impl Configuration {
    /// Build a configuration from model entries. Input names must be unique.
    pub fn new(
        models: impl IntoIterator<Item = ModelConfig>,
        n_smooth: usize,
        output_frequency_hours: i32,
    ) -> Result<Self, AppError> {
        let mut map = BTreeMap::new();
        for model in models {
            if model.min_relax_fcst_hour > model.max_relax_fcst_hour {
                warn!(
                    model = %model.input_name,
                    min = model.min_relax_fcst_hour,
                    max = model.max_relax_fcst_hour,
                    "relaxation window is inverted"
                );
            }
            let name = model.input_name.clone();
            if map.insert(name.clone(), model).is_some() {
                return Err(AppError::new(
                    2,
                    format!("Duplicate model configuration for input name '{name}'."),
                ));
            }
        }
        Ok(Self {
            models: map,
            n_smooth,
            output_frequency_hours,
        })
    }

    /// Parse a TOML configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        let file: ConfigFile = toml::from_str(text)
            .map_err(|e| AppError::new(2, format!("Invalid interpolator configuration: {e}")))?;
        Self::new(file.models, file.n_smooth, file.output_frequency_hours)
    }

    /// Load a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                2,
                format!("Failed to read configuration '{}': {e}", path.display()),
            )
        })?;
        Self::from_toml_str(&text)
    }

    /// Resolve the effective configuration: an explicit path, else the
    /// `ATCF_INTERP_CONFIG` environment variable (a `.env` file is honoured),
    /// else the permissive default.
    pub fn resolve(path: Option<&Path>) -> Result<Self, AppError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        dotenvy::dotenv().ok();
        Self::resolve_with(None, std::env::var(CONFIG_ENV_VAR).ok().as_deref())
    }

    /// [`Configuration::resolve`] with the environment value passed in.
    pub fn resolve_with(path: Option<&Path>, env_path: Option<&str>) -> Result<Self, AppError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match env_path.map(str::trim) {
            Some(raw) if !raw.is_empty() => Self::load(&PathBuf::from(raw)),
            _ => {
                info!("no interpolator configuration found; using defaults (no models)");
                Ok(Self::default())
            }
        }
    }

    pub fn model(&self, input_name: &str) -> Option<&ModelConfig> {
        self.models.get(input_name)
    }

    pub fn contains_model(&self, input_name: &str) -> bool {
        self.models.contains_key(input_name)
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelConfig> {
        self.models.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_models_and_defaults() {
        let cfg = Configuration::from_toml_str(
            r#"
            [[model]]
            input_name = "GFSI"
            output_name = "GFSO"
            min_relax_fcst_hour = 12
            max_relax_fcst_hour = 72
            "#,
        )
        .unwrap();

        assert_eq!(cfg.n_smooth, DEFAULT_N_SMOOTH);
        assert_eq!(cfg.output_frequency_hours, DEFAULT_OUTPUT_FREQUENCY_HOURS);
        let gfs = cfg.model("GFSI").unwrap();
        assert_eq!(gfs.output_name, "GFSO");
        assert_eq!(gfs.max_relax_fcst_hour, 72);
        assert!(!cfg.contains_model("GFSO"));
    }

    #[test]
    fn explicit_globals_override_defaults() {
        let cfg =
            Configuration::from_toml_str("n_smooth = 0\noutput_frequency_hours = 12\n").unwrap();
        assert_eq!(cfg.n_smooth, 0);
        assert_eq!(cfg.output_frequency_hours, 12);
        assert_eq!(cfg.models().count(), 0);
    }

    #[test]
    fn rejects_duplicate_input_names() {
        let err = Configuration::from_toml_str(
            r#"
            [[model]]
            input_name = "HWFI"
            output_name = "HWFA"
            min_relax_fcst_hour = 0
            max_relax_fcst_hour = 24

            [[model]]
            input_name = "HWFI"
            output_name = "HWFB"
            min_relax_fcst_hour = 0
            max_relax_fcst_hour = 48
            "#,
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("HWFI"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interpolator.toml");
        write_avni(&path);

        let cfg = Configuration::resolve(Some(&path)).unwrap();
        assert_eq!(cfg.n_smooth, 3);
        assert!(cfg.contains_model("AVNI"));
    }

    fn write_avni(path: &Path) {
        std::fs::write(
            path,
            r#"
            n_smooth = 3

            [[model]]
            input_name = "AVNI"
            output_name = "AVNO"
            min_relax_fcst_hour = 6
            max_relax_fcst_hour = 48
            "#,
        )
        .unwrap();
    }

    #[test]
    fn env_path_is_used_without_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("from_env.toml");
        write_avni(&path);
        let raw = format!("  {}  ", path.display());

        let cfg = Configuration::resolve_with(None, Some(&raw)).unwrap();
        assert!(cfg.contains_model("AVNI"));
        assert_eq!(cfg.n_smooth, 3);
    }

    #[test]
    fn explicit_path_wins_over_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explicit.toml");
        write_avni(&path);

        let missing = dir.path().join("missing.toml");
        let cfg = Configuration::resolve_with(Some(&path), missing.to_str()).unwrap();
        assert!(cfg.contains_model("AVNI"));
    }

    #[test]
    fn no_path_and_no_env_falls_back_to_default() {
        assert_eq!(Configuration::resolve_with(None, None).unwrap(), Configuration::default());
        assert_eq!(
            Configuration::resolve_with(None, Some("   ")).unwrap(),
            Configuration::default()
        );
    }

    #[test]
    fn unreadable_env_path_is_config_error() {
        let err = Configuration::resolve_with(None, Some("/nonexistent/interp.toml")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn inverted_relax_window_is_accepted() {
        let cfg = Configuration::new(
            [ModelConfig {
                input_name: "OFCI".to_string(),
                output_name: "OFCO".to_string(),
                min_relax_fcst_hour: 72,
                max_relax_fcst_hour: 12,
            }],
            DEFAULT_N_SMOOTH,
            DEFAULT_OUTPUT_FREQUENCY_HOURS,
        )
        .unwrap();
        let ofci = cfg.model("OFCI").unwrap();
        assert_eq!((ofci.min_relax_fcst_hour, ofci.max_relax_fcst_hour), (72, 12));
    }

    #[test]
    fn default_is_permissive() {
        let cfg = Configuration::default();
        assert_eq!(cfg.models().count(), 0);
        assert_eq!(cfg.n_smooth, 10);
        assert_eq!(cfg.output_frequency_hours, 6);
    }
}
