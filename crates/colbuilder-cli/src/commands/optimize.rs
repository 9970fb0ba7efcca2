use crate::cli::OptimizeArgs;
use crate::config::{GeneratorSettings, build_optimize_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use colbuilder::core::models::crosslink::CrosslinkPair;
use colbuilder::engine::generators::perturbation::PerturbationGenerator;
use colbuilder::engine::generators::process::ProcessGenerator;
use colbuilder::engine::generators::{CandidateGenerator, GeneratorError};
use colbuilder::engine::progress::ProgressReporter;
use colbuilder::engine::state::OptimizationOutcome;
use colbuilder::optimize_crosslinks;
use tracing::{info, warn};

fn make_generator(
    settings: &GeneratorSettings,
    pairs: &[CrosslinkPair],
) -> std::result::Result<Box<dyn CandidateGenerator>, GeneratorError> {
    match settings {
        GeneratorSettings::External {
            program,
            args,
            work_dir,
        } => {
            std::fs::create_dir_all(work_dir).map_err(|source| GeneratorError::Io {
                path: work_dir.clone(),
                source,
            })?;
            info!(program = %program.display(), "Using external trial generator.");
            Ok(Box::new(
                ProcessGenerator::new(program.clone(), work_dir.clone()).with_args(args.iter()),
            ))
        }
        GeneratorSettings::Perturbation {
            seed,
            trials,
            max_step,
        } => {
            let generator = PerturbationGenerator::new(pairs, *trials, *max_step, *seed)?;
            info!(
                seed,
                trials,
                residues = generator.residue_count(),
                "Using in-process perturbation generator."
            );
            Ok(Box::new(generator))
        }
    }
}

pub async fn run(args: OptimizeArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app_config = build_optimize_config(&args)?;
    let config = app_config.core_config;
    let settings = app_config.generator;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Optimizing {}-terminal {} cross-links ({}) of {}...",
        config.selection.terminal,
        config.selection.link_type,
        config.selection.combination,
        config.input_path.display()
    );
    info!("Invoking the core cross-link workflow...");

    let result = tokio::task::block_in_place(|| {
        optimize_crosslinks(&config, |pairs| make_generator(&settings, pairs), &reporter)
    })?;

    match result.outcome {
        OptimizationOutcome::Converged => {
            println!(
                "✓ Converged after {} attempt(s) at {:.3} Å.",
                result.history.len(),
                result.final_distance
            );
        }
        OptimizationOutcome::AcceptedWithWarning => {
            warn!(
                distance = result.final_distance,
                attempts = result.history.len(),
                "Cross-links did not reach the acceptance threshold."
            );
            println!(
                "Warning: attempt budget exhausted at {:.3} Å; the structure was kept.",
                result.final_distance
            );
        }
    }
    println!(
        "  Optimized structure written to: {}",
        config.output_path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use colbuilder::core::models::crosslink::{CrosslinkPosition, Terminal};
    use std::path::PathBuf;

    fn pair() -> CrosslinkPair {
        CrosslinkPair {
            position1: CrosslinkPosition {
                residue_number: 9,
                chain_id: 'A',
                residue_type: "L4Y".to_string(),
                atom_name: "CE".to_string(),
            },
            position2: CrosslinkPosition {
                residue_number: 947,
                chain_id: 'B',
                residue_type: "L5Y".to_string(),
                atom_name: "NZ".to_string(),
            },
            position3: None,
            terminal: Terminal::N,
        }
    }

    #[test]
    fn perturbation_settings_are_validated() {
        let settings = GeneratorSettings::Perturbation {
            seed: 1,
            trials: 1,
            max_step: 0.5,
        };
        assert!(matches!(
            make_generator(&settings, &[pair()]),
            Err(GeneratorError::Invalid(_))
        ));
    }

    #[test]
    fn external_settings_create_the_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path().join("trials");
        let settings = GeneratorSettings::External {
            program: PathBuf::from("true"),
            args: vec![],
            work_dir: work_dir.clone(),
        };

        assert!(make_generator(&settings, &[pair()]).is_ok());
        assert!(work_dir.is_dir());
    }
}
