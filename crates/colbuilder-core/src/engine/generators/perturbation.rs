use super::{CandidateGenerator, GeneratorError};
use crate::core::models::crosslink::CrosslinkPair;
use crate::core::models::structure::Structure;
use crate::core::utils::geometry::random_displacement;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub const DEFAULT_TRIALS: usize = 8;
pub const DEFAULT_MAX_STEP: f64 = 0.5;

/// Generates trials by rigidly moving each cross-link residue by a random vector.
///
/// Every residue named by a cross-link pair moves independently, by a vector drawn
/// uniformly from the ball of radius `max_step`. The same seed always yields the same
/// sequence of trials.
#[derive(Debug, Clone)]
pub struct PerturbationGenerator {
    residues: Vec<(char, isize)>,
    trials: usize,
    max_step: f64,
    rng: StdRng,
}

impl PerturbationGenerator {
    pub fn new(
        pairs: &[CrosslinkPair],
        trials: usize,
        max_step: f64,
        seed: u64,
    ) -> Result<Self, GeneratorError> {
        if trials < 2 {
            return Err(GeneratorError::Invalid(format!(
                "at least two trials per attempt are required, got {}",
                trials
            )));
        }
        if !max_step.is_finite() || max_step <= 0.0 {
            return Err(GeneratorError::Invalid(format!(
                "maximum step must be a positive distance, got {}",
                max_step
            )));
        }
        let residues: BTreeSet<(char, isize)> = pairs
            .iter()
            .flat_map(|pair| pair.positions())
            .map(|p| (p.chain_id, p.residue_number))
            .collect();

        Ok(Self {
            residues: residues.into_iter().collect(),
            trials,
            max_step,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }
}

impl CandidateGenerator for PerturbationGenerator {
    fn generate(&mut self, input: &Structure) -> Result<Vec<Structure>, GeneratorError> {
        let mut trials = Vec::with_capacity(self.trials);
        for _ in 0..self.trials {
            let mut trial = input.clone();
            for &(chain_id, residue_number) in &self.residues {
                let shift = random_displacement(&mut self.rng, self.max_step);
                if trial.translate_residue(chain_id, residue_number, &shift) == 0 {
                    warn!(chain = %chain_id, residue = residue_number, "Cross-link residue not present in structure.");
                }
            }
            trials.push(trial);
        }
        debug!(trials = trials.len(), residues = self.residues.len(), "Perturbed trial structures.");
        Ok(trials)
    }

    fn cleanup(&mut self) {}
}
