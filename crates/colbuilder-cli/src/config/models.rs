use colbuilder::engine::config as core_config;
use std::path::PathBuf;

/// How trial structures are produced during cross-link optimization.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorSettings {
    External {
        program: PathBuf,
        args: Vec<String>,
        work_dir: PathBuf,
    },
    Perturbation {
        seed: u64,
        trials: usize,
        max_step: f64,
    },
}

pub struct GeometryAppConfig {
    pub core_config: core_config::GeometryConfig,
}

pub struct OptimizeAppConfig {
    pub core_config: core_config::CrosslinkConfig,
    pub generator: GeneratorSettings,
}
