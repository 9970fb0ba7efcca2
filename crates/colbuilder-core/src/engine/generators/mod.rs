//! Sources of trial structures for the cross-link optimizer.
//!
//! The optimizer never knows how trials are produced. [`process::ProcessGenerator`]
//! delegates to an external modelling program, [`perturbation::PerturbationGenerator`]
//! jitters the cross-link residues in process.

pub mod perturbation;
pub mod process;

use crate::core::io::pdb::PdbError;
use crate::core::models::structure::Structure;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error(
        "'{program}' exited with {status}.\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}\nCheck that the program is installed and accepts INPUT_PDB."
    )]
    ProcessFailed {
        program: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error("Generated structure '{path}' could not be read: {source}")]
    Structure { path: PathBuf, source: PdbError },

    #[error("Invalid generator setting: {0}")]
    Invalid(String),
}

/// Produces trial structures from the current best structure.
pub trait CandidateGenerator {
    /// Returns the trials derived from `input`. Each call is one optimization attempt.
    fn generate(&mut self, input: &Structure) -> Result<Vec<Structure>, GeneratorError>;

    /// Deletes every artifact created so far. Must be safe to call repeatedly.
    fn cleanup(&mut self);
}

impl<G: CandidateGenerator + ?Sized> CandidateGenerator for &mut G {
    fn generate(&mut self, input: &Structure) -> Result<Vec<Structure>, GeneratorError> {
        (**self).generate(input)
    }

    fn cleanup(&mut self) {
        (**self).cleanup()
    }
}

impl<G: CandidateGenerator + ?Sized> CandidateGenerator for Box<G> {
    fn generate(&mut self, input: &Structure) -> Result<Vec<Structure>, GeneratorError> {
        (**self).generate(input)
    }

    fn cleanup(&mut self) {
        (**self).cleanup()
    }
}
