use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub connectivity: Option<FileConnectivityConfig>,
    pub optimization: Option<FileOptimizationConfig>,
    pub generator: Option<FileGeneratorConfig>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConnectivityConfig {
    pub cutoff: Option<f64>,
    pub fill_top_layer: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileOptimizationConfig {
    pub max_attempts: Option<usize>,
    pub divalent_threshold: Option<f64>,
    pub trivalent_threshold: Option<f64>,
    pub critical_threshold: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileGeneratorConfig {
    pub program: Option<PathBuf>,
    pub args: Option<Vec<String>>,
    pub work_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub trials: Option<usize>,
    pub max_step: Option<f64>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading configuration file {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
