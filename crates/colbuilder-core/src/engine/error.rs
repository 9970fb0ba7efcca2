use super::config::ConfigError;
use super::generators::GeneratorError;
use super::state::AttemptRecord;
use crate::core::geometry::crystal::GeometryError;
use crate::core::io::connect::ConnectError;
use crate::core::io::contacts::ContactsError;
use crate::core::io::crosslinks::CrosslinkTableError;
use crate::core::io::pdb::PdbError;
use crate::core::models::crosslink::CrosslinkPosition;
use crate::core::models::ids::CopyId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConnectivityError {
    #[error("Contact cutoff must be a positive finite distance, got {0}")]
    InvalidCutoff(f64),

    #[error("Marker atom {serial} of copy {copy} has a non-finite coordinate")]
    NonFiniteCoordinate { copy: CopyId, serial: usize },
}

fn format_history(history: &[AttemptRecord]) -> String {
    history
        .iter()
        .map(|r| format!("  attempt {}: {:.3} A", r.attempt, r.distance))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Error)]
pub enum OptimizationError {
    #[error("No cross-link pairs to optimize")]
    NoCrosslinks,

    #[error(
        "Attempt {attempt} produced {found} trial structure(s); at least two are needed to compare"
    )]
    InsufficientCandidates { attempt: usize, found: usize },

    #[error("Candidate generation failed on attempt {attempt}: {source}")]
    Generator {
        attempt: usize,
        #[source]
        source: GeneratorError,
    },

    #[error("Cross-link atom {position} is missing from trial {trial} of attempt {attempt}")]
    MissingAtom {
        position: CrosslinkPosition,
        attempt: usize,
        trial: usize,
    },

    #[error(
        "Cross-link optimization failed after {attempts} attempts: final distance {final_distance:.3} A exceeds the critical threshold of {critical_threshold:.3} A.\nHistory:\n{}",
        format_history(.history)
    )]
    Failed {
        final_distance: f64,
        critical_threshold: f64,
        attempts: usize,
        history: Vec<AttemptRecord>,
    },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Crystal geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Coordinate file error: {0}")]
    Pdb(#[from] PdbError),

    #[error("Contacts file error: {0}")]
    Contacts(#[from] ContactsError),

    #[error("Connect file error: {0}")]
    Connect(#[from] ConnectError),

    #[error("Cross-link table error: {0}")]
    CrosslinkTable(#[from] CrosslinkTableError),

    #[error("Connectivity analysis failed: {0}")]
    Connectivity(#[from] ConnectivityError),

    #[error(transparent)]
    Optimization(#[from] OptimizationError),

    #[error("No cross-link marker atoms found in '{0}'")]
    NoMarkers(String),
}
