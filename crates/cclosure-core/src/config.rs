use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "cclosure.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CclosureConfig {
    #[serde(default)]
    pub enumerate: EnumerateConfig,
    #[serde(default)]
    pub densify: DensifySettings,
    #[serde(default)]
    pub estimate: EstimateSettings,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerateConfig {
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DensifySettings {
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
}

impl Default for DensifySettings {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateSettings {
    /// Largest node count for which the dense matrix is allocated.
    #[serde(default = "default_max_matrix_nodes")]
    pub max_nodes: usize,
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for EstimateSettings {
    fn default() -> Self {
        Self {
            max_nodes: default_max_matrix_nodes(),
            parallel: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub datasets: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            datasets: Vec::new(),
        }
    }
}

impl DataConfig {
    /// Full paths of the configured datasets, in configuration order.
    #[must_use]
    pub fn dataset_paths(&self) -> Vec<PathBuf> {
        self.datasets.iter().map(|name| self.dir.join(name)).collect()
    }
}

/// Descending range of target values for `cclosure sweep`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_sweep_from")]
    pub from: u32,
    #[serde(default = "default_sweep_to")]
    pub to: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            from: default_sweep_from(),
            to: default_sweep_to(),
        }
    }
}

/// Parse a config file at an explicit path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for
/// [`CclosureConfig`].
pub fn load_config_file(path: &Path) -> Result<CclosureConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<CclosureConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `cclosure.toml` from `project_root`, if present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<Option<CclosureConfig>> {
    let path = project_root.join(PROJECT_CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Load `<config dir>/cclosure/config.toml`, if present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<Option<CclosureConfig>> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(None);
    };

    let path = config_dir.join("cclosure/config.toml");
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Resolve the effective configuration.
///
/// Precedence (highest wins, first match is used as a whole):
/// 1. `explicit` path (`--config`)
/// 2. `cclosure.toml` in `project_root`
/// 3. user config directory
/// 4. built-in defaults
///
/// # Errors
///
/// Returns an error if the selected file cannot be read or parsed.
pub fn resolve_config(explicit: Option<&Path>, project_root: &Path) -> Result<CclosureConfig> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }
    if let Some(config) = load_project_config(project_root)? {
        return Ok(config);
    }
    Ok(load_user_config()?.unwrap_or_default())
}

const fn default_true() -> bool {
    true
}

const fn default_max_rounds() -> usize {
    10_000
}

const fn default_max_matrix_nodes() -> usize {
    10_000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

const fn default_sweep_from() -> u32 {
    50
}

const fn default_sweep_to() -> u32 {
    48
}
