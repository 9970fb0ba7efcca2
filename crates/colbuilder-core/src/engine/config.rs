use crate::core::models::crosslink::Terminal;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_CONTACT_CUTOFF: f64 = 2.0;
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;
pub const DEFAULT_DIVALENT_THRESHOLD: f64 = 2.0;
pub const DEFAULT_TRIVALENT_THRESHOLD: f64 = 5.0;
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 10.0;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{parameter}': {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },
}

fn positive(parameter: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            parameter,
            reason: format!("expected a positive distance in Angstrom, got {}", value),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectivityConfig {
    /// Marker pairs strictly closer than this (Angstrom) connect two copies.
    pub cutoff: f64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CONTACT_CUTOFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizationConfig {
    pub max_attempts: usize,
    pub divalent_threshold: f64,
    pub trivalent_threshold: f64,
    /// Above this distance an exhausted run is a failure rather than a warning.
    pub critical_threshold: f64,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            divalent_threshold: DEFAULT_DIVALENT_THRESHOLD,
            trivalent_threshold: DEFAULT_TRIVALENT_THRESHOLD,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
        }
    }
}

impl OptimizationConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                parameter: "max_attempts",
                reason: "at least one attempt is required".into(),
            });
        }
        positive("divalent_threshold", self.divalent_threshold)?;
        positive("trivalent_threshold", self.trivalent_threshold)?;
        positive("critical_threshold", self.critical_threshold)?;
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryConfig {
    pub pdb_path: PathBuf,
    pub contacts_path: PathBuf,
    pub output_dir: PathBuf,
    pub connectivity: ConnectivityConfig,
    /// Add the missing cells of the topmost z-layer before analysing connectivity.
    pub fill_top_layer: bool,
    /// Contacts file of the cut fibril; copies it does not list are dropped before connectivity.
    pub prune_with: Option<PathBuf>,
}

#[derive(Default)]
pub struct GeometryConfigBuilder {
    pdb_path: Option<PathBuf>,
    contacts_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    cutoff: Option<f64>,
    fill_top_layer: bool,
    prune_with: Option<PathBuf>,
}

impl GeometryConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pdb_path(mut self, path: PathBuf) -> Self {
        self.pdb_path = Some(path);
        self
    }
    pub fn contacts_path(mut self, path: PathBuf) -> Self {
        self.contacts_path = Some(path);
        self
    }
    pub fn output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }
    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }
    pub fn fill_top_layer(mut self, enabled: bool) -> Self {
        self.fill_top_layer = enabled;
        self
    }
    pub fn prune_with(mut self, path: PathBuf) -> Self {
        self.prune_with = Some(path);
        self
    }

    pub fn build(self) -> Result<GeometryConfig, ConfigError> {
        let cutoff = positive("cutoff", self.cutoff.unwrap_or(DEFAULT_CONTACT_CUTOFF))?;
        Ok(GeometryConfig {
            pdb_path: self.pdb_path.ok_or(ConfigError::MissingParameter("pdb_path"))?,
            contacts_path: self
                .contacts_path
                .ok_or(ConfigError::MissingParameter("contacts_path"))?,
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            connectivity: ConnectivityConfig { cutoff },
            fill_top_layer: self.fill_top_layer,
            prune_with: self.prune_with,
        })
    }
}

/// Which rows of the cross-link table apply to a structure.
#[derive(Debug, Clone, PartialEq)]
pub struct CrosslinkSelection {
    pub terminal: Terminal,
    pub link_type: String,
    pub combination: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrosslinkConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub crosslinks_path: PathBuf,
    pub selection: CrosslinkSelection,
    pub optimization: OptimizationConfig,
}

#[derive(Default)]
pub struct CrosslinkConfigBuilder {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    crosslinks_path: Option<PathBuf>,
    terminal: Option<Terminal>,
    link_type: Option<String>,
    combination: Option<String>,
    max_attempts: Option<usize>,
    divalent_threshold: Option<f64>,
    trivalent_threshold: Option<f64>,
    critical_threshold: Option<f64>,
}

impl CrosslinkConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_path(mut self, path: PathBuf) -> Self {
        self.input_path = Some(path);
        self
    }
    pub fn output_path(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }
    pub fn crosslinks_path(mut self, path: PathBuf) -> Self {
        self.crosslinks_path = Some(path);
        self
    }
    pub fn terminal(mut self, terminal: Terminal) -> Self {
        self.terminal = Some(terminal);
        self
    }
    pub fn link_type(mut self, link_type: impl Into<String>) -> Self {
        self.link_type = Some(link_type.into());
        self
    }
    pub fn combination(mut self, combination: impl Into<String>) -> Self {
        self.combination = Some(combination.into());
        self
    }
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
    pub fn divalent_threshold(mut self, threshold: f64) -> Self {
        self.divalent_threshold = Some(threshold);
        self
    }
    pub fn trivalent_threshold(mut self, threshold: f64) -> Self {
        self.trivalent_threshold = Some(threshold);
        self
    }
    pub fn critical_threshold(mut self, threshold: f64) -> Self {
        self.critical_threshold = Some(threshold);
        self
    }

    pub fn build(self) -> Result<CrosslinkConfig, ConfigError> {
        let defaults = OptimizationConfig::default();
        let optimization = OptimizationConfig {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            divalent_threshold: self.divalent_threshold.unwrap_or(defaults.divalent_threshold),
            trivalent_threshold: self
                .trivalent_threshold
                .unwrap_or(defaults.trivalent_threshold),
            critical_threshold: self.critical_threshold.unwrap_or(defaults.critical_threshold),
        }
        .validate()?;

        Ok(CrosslinkConfig {
            input_path: self
                .input_path
                .ok_or(ConfigError::MissingParameter("input_path"))?,
            output_path: self
                .output_path
                .ok_or(ConfigError::MissingParameter("output_path"))?,
            crosslinks_path: self
                .crosslinks_path
                .ok_or(ConfigError::MissingParameter("crosslinks_path"))?,
            selection: CrosslinkSelection {
                terminal: self.terminal.ok_or(ConfigError::MissingParameter("terminal"))?,
                link_type: self
                    .link_type
                    .ok_or(ConfigError::MissingParameter("link_type"))?,
                combination: self
                    .combination
                    .ok_or(ConfigError::MissingParameter("combination"))?,
            },
            optimization,
        })
    }
}
