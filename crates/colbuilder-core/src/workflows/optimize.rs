use crate::core::io::crosslinks::CrosslinkTable;
use crate::core::io::pdb::{PdbError, PdbFile};
use crate::core::io::traits::CoordinateFile;
use crate::core::models::crosslink::CrosslinkPair;
use crate::engine::config::{CrosslinkConfig, CrosslinkSelection};
use crate::engine::error::{EngineError, OptimizationError};
use crate::engine::generators::{CandidateGenerator, GeneratorError};
use crate::engine::progress::ProgressReporter;
use crate::engine::state::OptimizationResult;
use crate::engine::tasks::crosslink_optimization::CrosslinkOptimizer;
use std::path::Path;
use tracing::{info, instrument};

/// Loads the cross-link table and keeps the pairs matching `selection`.
pub fn load_crosslink_pairs(
    path: &Path,
    selection: &CrosslinkSelection,
) -> Result<Vec<CrosslinkPair>, EngineError> {
    let table = CrosslinkTable::load(path)?;
    let pairs = table.select(selection.terminal, &selection.link_type, &selection.combination)?;
    info!(
        terminal = %selection.terminal,
        link_type = %selection.link_type,
        combination = %selection.combination,
        pairs = pairs.len(),
        "Selected cross-link pairs."
    );
    Ok(pairs)
}

/// Optimizes the cross-links of one structure file and writes the best structure.
///
/// `make_generator` receives the selected cross-link pairs and returns the candidate
/// generator used for every attempt.
#[instrument(skip_all, name = "crosslink_workflow")]
pub fn optimize_crosslinks<G, F>(
    config: &CrosslinkConfig,
    make_generator: F,
    reporter: &ProgressReporter,
) -> Result<OptimizationResult, EngineError>
where
    G: CandidateGenerator,
    F: FnOnce(&[CrosslinkPair]) -> Result<G, GeneratorError>,
{
    let structure = PdbFile::read_from_path(&config.input_path)?;
    let pairs = load_crosslink_pairs(&config.crosslinks_path, &config.selection)?;
    let generator = make_generator(&pairs)
        .map_err(|source| OptimizationError::Generator { attempt: 0, source })?;

    let mut optimizer = CrosslinkOptimizer::new(pairs, config.optimization);
    let result = reporter.phase("Cross-link optimization", || {
        optimizer.optimize(structure, generator, reporter)
    })?;

    write_structure(&result, &config.output_path)?;
    info!(
        output = %config.output_path.display(),
        distance = result.final_distance,
        attempts = result.history.len(),
        "Wrote optimized structure."
    );
    Ok(result)
}

fn write_structure(result: &OptimizationResult, path: &Path) -> Result<(), PdbError> {
    PdbFile::write_to_path(&result.structure, path)
}
