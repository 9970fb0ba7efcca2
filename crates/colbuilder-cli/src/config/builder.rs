use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{GeneratorSettings, GeometryAppConfig, OptimizeAppConfig};
use crate::cli::{GeometryArgs, OptimizeArgs};
use crate::error::{CliError, Result};
use colbuilder::engine::config as core_config;
use std::path::Path;
use std::str::FromStr;

fn load_file_config(path: Option<&Path>, set_values: &[String]) -> Result<FileConfig> {
    let file_config = match path {
        Some(config_path) => FileConfig::from_file(config_path)?,
        None => FileConfig::default(),
    };
    apply_set_values(file_config, set_values)
}

pub fn build_geometry_config(args: &GeometryArgs) -> Result<GeometryAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(args.config.as_deref(), &args.set_values)?;

    let connectivity = file_config.connectivity.take().unwrap_or_default();
    let cutoff = args
        .cutoff
        .or(connectivity.cutoff)
        .unwrap_or(defaults.cutoff);
    let fill_top_layer = args.fill_top_layer || connectivity.fill_top_layer.unwrap_or(false);

    let mut builder = core_config::GeometryConfigBuilder::new()
        .pdb_path(args.input.clone())
        .contacts_path(args.contacts.clone())
        .output_dir(
            args.output_dir
                .clone()
                .unwrap_or_else(|| defaults.output_dir.clone()),
        )
        .cutoff(cutoff)
        .fill_top_layer(fill_top_layer);
    if let Some(path) = &args.prune_with {
        builder = builder.prune_with(path.clone());
    }
    let core_config = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(GeometryAppConfig { core_config })
}

pub fn build_optimize_config(args: &OptimizeArgs) -> Result<OptimizeAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(args.config.as_deref(), &args.set_values)?;

    let opt_file = file_config.optimization.take().unwrap_or_default();
    let core_config = core_config::CrosslinkConfigBuilder::new()
        .input_path(args.input.clone())
        .output_path(args.output.clone())
        .crosslinks_path(args.crosslinks.clone())
        .terminal(args.terminal)
        .link_type(args.link_type.clone())
        .combination(args.combination.clone())
        .max_attempts(
            args.max_attempts
                .or(opt_file.max_attempts)
                .unwrap_or(defaults.max_attempts),
        )
        .divalent_threshold(
            args.divalent_threshold
                .or(opt_file.divalent_threshold)
                .unwrap_or(defaults.divalent_threshold),
        )
        .trivalent_threshold(
            args.trivalent_threshold
                .or(opt_file.trivalent_threshold)
                .unwrap_or(defaults.trivalent_threshold),
        )
        .critical_threshold(
            args.critical_threshold
                .or(opt_file.critical_threshold)
                .unwrap_or(defaults.critical_threshold),
        )
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let gen_file = file_config.generator.take().unwrap_or_default();
    let generator = match args.generator_program.clone().or(gen_file.program) {
        Some(program) => {
            let args_list = if args.generator_args.is_empty() {
                gen_file.args.unwrap_or_default()
            } else {
                args.generator_args.clone()
            };
            GeneratorSettings::External {
                program,
                args: args_list,
                work_dir: args
                    .work_dir
                    .clone()
                    .or(gen_file.work_dir)
                    .unwrap_or(defaults.work_dir),
            }
        }
        None => {
            if !args.generator_args.is_empty() {
                return Err(CliError::Argument(
                    "--generator-arg requires --generator-program".to_string(),
                ));
            }
            GeneratorSettings::Perturbation {
                seed: args.seed.or(gen_file.seed).unwrap_or(defaults.seed),
                trials: args.trials.or(gen_file.trials).unwrap_or(defaults.trials),
                max_step: args
                    .max_step
                    .or(gen_file.max_step)
                    .unwrap_or(defaults.max_step),
            }
        }
    };

    Ok(OptimizeAppConfig {
        core_config,
        generator,
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "connectivity.cutoff" => {
                config
                    .connectivity
                    .get_or_insert_with(Default::default)
                    .cutoff = Some(parse_value(key, value_str, "float")?);
            }
            "connectivity.fill-top-layer" => {
                config
                    .connectivity
                    .get_or_insert_with(Default::default)
                    .fill_top_layer = Some(parse_value(key, value_str, "boolean")?);
            }
            "optimization.max-attempts" => {
                config
                    .optimization
                    .get_or_insert_with(Default::default)
                    .max_attempts = Some(parse_value(key, value_str, "integer")?);
            }
            "optimization.divalent-threshold" => {
                config
                    .optimization
                    .get_or_insert_with(Default::default)
                    .divalent_threshold = Some(parse_value(key, value_str, "float")?);
            }
            "optimization.trivalent-threshold" => {
                config
                    .optimization
                    .get_or_insert_with(Default::default)
                    .trivalent_threshold = Some(parse_value(key, value_str, "float")?);
            }
            "optimization.critical-threshold" => {
                config
                    .optimization
                    .get_or_insert_with(Default::default)
                    .critical_threshold = Some(parse_value(key, value_str, "float")?);
            }
            "generator.program" => {
                config.generator.get_or_insert_with(Default::default).program =
                    Some(value_str.into());
            }
            "generator.work-dir" => {
                config.generator.get_or_insert_with(Default::default).work_dir =
                    Some(value_str.into());
            }
            "generator.seed" => {
                config.generator.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "generator.trials" => {
                config.generator.get_or_insert_with(Default::default).trials =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "generator.max-step" => {
                config.generator.get_or_insert_with(Default::default).max_step =
                    Some(parse_value(key, value_str, "float")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colbuilder::core::models::crosslink::Terminal;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn base_geometry_args() -> GeometryArgs {
        GeometryArgs {
            input: PathBuf::from("cell.pdb"),
            contacts: PathBuf::from("contacts.txt"),
            output_dir: None,
            config: None,
            cutoff: None,
            fill_top_layer: false,
            prune_with: None,
            set_values: vec![],
        }
    }

    fn base_optimize_args() -> OptimizeArgs {
        OptimizeArgs {
            input: PathBuf::from("in.pdb"),
            output: PathBuf::from("out.pdb"),
            crosslinks: PathBuf::from("crosslinks.csv"),
            terminal: Terminal::N,
            link_type: "D".to_string(),
            combination: "L4Y-L5Y".to_string(),
            config: None,
            max_attempts: None,
            divalent_threshold: None,
            trivalent_threshold: None,
            critical_threshold: None,
            generator_program: None,
            generator_args: vec![],
            work_dir: None,
            seed: None,
            trials: None,
            max_step: None,
            set_values: vec![],
        }
    }

    #[test]
    fn geometry_config_falls_back_to_defaults() {
        let app = build_geometry_config(&base_geometry_args()).expect("build ok");
        let cfg = app.core_config;

        assert_eq!(cfg.connectivity.cutoff, DefaultsConfig::default().cutoff);
        assert_eq!(cfg.output_dir, PathBuf::from("."));
        assert!(!cfg.fill_top_layer);
        assert_eq!(cfg.prune_with, None);
    }

    #[test]
    fn prune_with_is_passed_through() {
        let mut args = base_geometry_args();
        args.prune_with = Some(PathBuf::from("cut.txt"));

        let cfg = build_geometry_config(&args).unwrap().core_config;

        assert_eq!(cfg.prune_with, Some(PathBuf::from("cut.txt")));
    }

    #[test]
    fn cli_cutoff_overrides_file_and_set_values() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("colbuilder.toml");
        fs::write(&cfg_path, "[connectivity]\ncutoff = 3.0\nfill-top-layer = true\n").unwrap();

        let mut args = base_geometry_args();
        args.config = Some(cfg_path.clone());
        let cfg = build_geometry_config(&args).unwrap().core_config;
        assert_eq!(cfg.connectivity.cutoff, 3.0);
        assert!(cfg.fill_top_layer);

        args.set_values = vec!["connectivity.cutoff=2.5".to_string()];
        let cfg = build_geometry_config(&args).unwrap().core_config;
        assert_eq!(cfg.connectivity.cutoff, 2.5);

        args.cutoff = Some(1.5);
        let cfg = build_geometry_config(&args).unwrap().core_config;
        assert_eq!(cfg.connectivity.cutoff, 1.5);
    }

    #[test]
    fn invalid_cutoff_is_a_config_error() {
        let mut args = base_geometry_args();
        args.cutoff = Some(-1.0);
        assert!(matches!(
            build_geometry_config(&args),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn optimize_config_defaults_to_the_perturbation_generator() {
        let app = build_optimize_config(&base_optimize_args()).expect("build ok");
        let defaults = DefaultsConfig::default();

        assert_eq!(app.core_config.optimization.max_attempts, defaults.max_attempts);
        assert_eq!(
            app.core_config.optimization.critical_threshold,
            defaults.critical_threshold
        );
        assert_eq!(
            app.generator,
            GeneratorSettings::Perturbation {
                seed: defaults.seed,
                trials: defaults.trials,
                max_step: defaults.max_step,
            }
        );
    }

    #[test]
    fn optimize_config_reads_file_and_merges() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("colbuilder.toml");
        let toml = r#"
            [optimization]
            max-attempts = 3
            divalent-threshold = 1.5

            [generator]
            program = "/opt/modeller/run.sh"
            args = ["--quick"]
            work-dir = "/tmp/crosslinks"
            "#;
        fs::write(&cfg_path, toml).unwrap();

        let mut args = base_optimize_args();
        args.config = Some(cfg_path);
        args.divalent_threshold = Some(1.8);

        let app = build_optimize_config(&args).expect("build ok");
        assert_eq!(app.core_config.optimization.max_attempts, 3);
        assert_eq!(app.core_config.optimization.divalent_threshold, 1.8);
        assert_eq!(
            app.generator,
            GeneratorSettings::External {
                program: PathBuf::from("/opt/modeller/run.sh"),
                args: vec!["--quick".to_string()],
                work_dir: PathBuf::from("/tmp/crosslinks"),
            }
        );
    }

    #[test]
    fn set_values_override() {
        let mut args = base_optimize_args();
        args.set_values = vec![
            "optimization.max-attempts=20".to_string(),
            "optimization.trivalent-threshold=4.5".to_string(),
            "generator.seed=7".to_string(),
            "generator.trials=12".to_string(),
            "generator.max-step=0.25".to_string(),
        ];

        let app = build_optimize_config(&args).expect("build ok");
        assert_eq!(app.core_config.optimization.max_attempts, 20);
        assert!((app.core_config.optimization.trivalent_threshold - 4.5).abs() < 1e-12);
        assert_eq!(
            app.generator,
            GeneratorSettings::Perturbation {
                seed: 7,
                trials: 12,
                max_step: 0.25,
            }
        );
    }

    #[test]
    fn malformed_or_unknown_set_values_are_rejected() {
        let mut args = base_optimize_args();
        args.set_values = vec!["optimization.max-attempts".to_string()];
        assert!(matches!(build_optimize_config(&args), Err(CliError::Config(_))));

        args.set_values = vec!["optimization.max-attempts=many".to_string()];
        assert!(matches!(build_optimize_config(&args), Err(CliError::Config(_))));

        args.set_values = vec!["optimization.patience=3".to_string()];
        assert!(matches!(build_optimize_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn generator_args_without_a_program_are_rejected() {
        let mut args = base_optimize_args();
        args.generator_args = vec!["--fast".to_string()];
        assert!(matches!(
            build_optimize_config(&args),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn zero_attempts_is_a_config_error() {
        let mut args = base_optimize_args();
        args.max_attempts = Some(0);
        assert!(matches!(build_optimize_config(&args), Err(CliError::Config(_))));
    }
}
