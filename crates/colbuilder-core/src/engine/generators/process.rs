use super::{CandidateGenerator, GeneratorError};
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::CoordinateFile;
use crate::core::models::structure::Structure;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

pub const INPUT_ENV_VAR: &str = "INPUT_PDB";
pub const DEFAULT_LISTING_FILE: &str = "generated_pdbs.txt";

/// Runs an external modelling program once per attempt.
///
/// The current structure is written into `work_dir` and its path passed through the
/// `INPUT_PDB` environment variable. The program must write its trial structures into
/// `work_dir` and list their paths, one per line, in the listing file. Every file
/// involved is tracked and removed by [`CandidateGenerator::cleanup`].
#[derive(Debug)]
pub struct ProcessGenerator {
    program: PathBuf,
    args: Vec<String>,
    work_dir: PathBuf,
    listing_file: String,
    artifacts: Vec<PathBuf>,
    attempt: usize,
}

impl ProcessGenerator {
    pub fn new(program: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            work_dir: work_dir.into(),
            listing_file: DEFAULT_LISTING_FILE.to_string(),
            artifacts: Vec::new(),
            attempt: 0,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_listing_file(mut self, name: impl Into<String>) -> Self {
        self.listing_file = name.into();
        self
    }

    /// Files created so far and not yet cleaned up.
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    fn track(&mut self, path: PathBuf) {
        if !self.artifacts.contains(&path) {
            self.artifacts.push(path);
        }
    }

    fn resolve(&self, listed: &str) -> PathBuf {
        let path = Path::new(listed);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }

    fn run_program(&self, input_path: &Path) -> Result<(), GeneratorError> {
        let program = self.program.display().to_string();
        debug!(program = %program, input = %input_path.display(), "Running candidate generator.");

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.work_dir)
            .env(INPUT_ENV_VAR, input_path)
            .output()
            .map_err(|source| GeneratorError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GeneratorError::ProcessFailed {
                program,
                status: output.status.to_string(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

impl CandidateGenerator for ProcessGenerator {
    fn generate(&mut self, input: &Structure) -> Result<Vec<Structure>, GeneratorError> {
        self.attempt += 1;

        let input_path = self
            .work_dir
            .join(format!("crosslink_input_{}.pdb", self.attempt));
        self.track(input_path.clone());
        PdbFile::write_to_path(input, &input_path).map_err(|source| GeneratorError::Structure {
            path: input_path.clone(),
            source,
        })?;

        let listing_path = self.work_dir.join(&self.listing_file);
        self.track(listing_path.clone());
        // A listing left by the previous attempt must not be mistaken for this one's.
        match fs::remove_file(&listing_path) {
            Ok(()) => debug!(path = %listing_path.display(), "Removed previous listing."),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(GeneratorError::Io {
                    path: listing_path,
                    source,
                });
            }
        }

        self.run_program(&input_path)?;

        let listing = fs::read_to_string(&listing_path).map_err(|source| GeneratorError::Io {
            path: listing_path.clone(),
            source,
        })?;
        let generated: Vec<PathBuf> = listing
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| self.resolve(l))
            .collect();
        for path in &generated {
            self.track(path.clone());
        }

        let trials = generated
            .iter()
            .map(|path| {
                PdbFile::read_from_path(path).map_err(|source| GeneratorError::Structure {
                    path: path.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            attempt = self.attempt,
            trials = trials.len(),
            "External generator produced trial structures."
        );
        Ok(trials)
    }

    fn cleanup(&mut self) {
        for path in self.artifacts.drain(..) {
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed generator artifact."),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), "Could not remove generator artifact: {}", e),
            }
        }
    }
}
