use colbuilder::engine::config as core_config;
use colbuilder::engine::generators::perturbation;
use std::path::PathBuf;

pub struct DefaultsConfig {
    pub cutoff: f64,
    pub output_dir: PathBuf,
    pub max_attempts: usize,
    pub divalent_threshold: f64,
    pub trivalent_threshold: f64,
    pub critical_threshold: f64,
    pub work_dir: PathBuf,
    pub seed: u64,
    pub trials: usize,
    pub max_step: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            cutoff: core_config::DEFAULT_CONTACT_CUTOFF,
            output_dir: PathBuf::from("."),
            max_attempts: core_config::DEFAULT_MAX_ATTEMPTS,
            divalent_threshold: core_config::DEFAULT_DIVALENT_THRESHOLD,
            trivalent_threshold: core_config::DEFAULT_TRIVALENT_THRESHOLD,
            critical_threshold: core_config::DEFAULT_CRITICAL_THRESHOLD,
            work_dir: PathBuf::from("."),
            seed: 0,
            trials: perturbation::DEFAULT_TRIALS,
            max_step: perturbation::DEFAULT_MAX_STEP,
        }
    }
}
