mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_geometry_config, build_optimize_config};
pub use models::{GeneratorSettings, GeometryAppConfig, OptimizeAppConfig};
