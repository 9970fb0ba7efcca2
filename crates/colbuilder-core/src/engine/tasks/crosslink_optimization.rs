use crate::core::models::crosslink::{CrosslinkPair, CrosslinkPosition};
use crate::core::models::marker::LinkArity;
use crate::core::models::structure::Structure;
use crate::core::utils::geometry::{distance, pairwise_distance_sum};
use crate::engine::config::OptimizationConfig;
use crate::engine::error::OptimizationError;
use crate::engine::generators::CandidateGenerator;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::{
    OptimizationOutcome, OptimizationPhase, OptimizationResult, OptimizationState,
};
use nalgebra::Point3;
use tracing::{debug, info, instrument, warn};

/// Calls [`CandidateGenerator::cleanup`] when dropped, so artifacts are removed on
/// every exit path, including early returns and unwinding.
struct CleanupGuard<G: CandidateGenerator> {
    generator: G,
}

impl<G: CandidateGenerator> Drop for CleanupGuard<G> {
    fn drop(&mut self) {
        self.generator.cleanup();
    }
}

/// Bounded refinement of cross-link geometry over generated trial structures.
pub struct CrosslinkOptimizer {
    pairs: Vec<CrosslinkPair>,
    config: OptimizationConfig,
    state: OptimizationState,
}

impl CrosslinkOptimizer {
    pub fn new(pairs: Vec<CrosslinkPair>, config: OptimizationConfig) -> Self {
        Self {
            pairs,
            config,
            state: OptimizationState::new(),
        }
    }

    pub fn state(&self) -> &OptimizationState {
        &self.state
    }

    /// Acceptance threshold: the trivalent one as soon as any pair is trivalent.
    pub fn distance_threshold(&self) -> f64 {
        if self
            .pairs
            .iter()
            .any(|p| p.arity() == LinkArity::Trivalent)
        {
            self.config.trivalent_threshold
        } else {
            self.config.divalent_threshold
        }
    }

    /// Aggregate cross-link distance of `structure`.
    ///
    /// A divalent pair contributes the distance between its two atoms, a trivalent
    /// pair the sum of its three pairwise distances.
    pub fn score(&self, structure: &Structure) -> Result<f64, CrosslinkPosition> {
        let locate = |position: &CrosslinkPosition| -> Result<Point3<f64>, CrosslinkPosition> {
            structure
                .find(position)
                .map(|atom| atom.position)
                .ok_or_else(|| position.clone())
        };

        let mut total = 0.0;
        for pair in &self.pairs {
            let p1 = locate(&pair.position1)?;
            let p2 = locate(&pair.position2)?;
            total += match &pair.position3 {
                Some(position3) => {
                    let p3 = locate(position3)?;
                    pairwise_distance_sum(&[&p1, &p2, &p3])
                }
                None => distance(&p1, &p2),
            };
        }
        Ok(total)
    }

    fn best_trial(
        &self,
        trials: &[Structure],
        attempt: usize,
    ) -> Result<(usize, f64), OptimizationError> {
        let mut best = (0, f64::INFINITY);
        for (index, trial) in trials.iter().enumerate() {
            let score = self
                .score(trial)
                .map_err(|position| OptimizationError::MissingAtom {
                    position,
                    attempt,
                    trial: index,
                })?;
            debug!(attempt, trial = index, distance = score, "Scored trial.");
            if score < best.1 {
                best = (index, score);
            }
        }
        Ok(best)
    }

    /// Runs the refinement loop starting from `input`.
    ///
    /// Each attempt asks `generator` for trial structures, keeps the one with the
    /// smallest aggregate distance and stops once that distance reaches the acceptance
    /// threshold. When the attempt budget runs out the best structure is still returned
    /// with a warning, unless its distance exceeds the critical threshold.
    ///
    /// The generator's artifacts are cleaned up before this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizationError::InsufficientCandidates`] when an attempt yields fewer
    /// than two trials, [`OptimizationError::Generator`] when generation fails, and
    /// [`OptimizationError::Failed`] with the full history on a critical exhaustion.
    #[instrument(skip_all, name = "crosslink_optimization_task")]
    pub fn optimize<G: CandidateGenerator>(
        &mut self,
        input: Structure,
        generator: G,
        reporter: &ProgressReporter,
    ) -> Result<OptimizationResult, OptimizationError> {
        if self.pairs.is_empty() {
            return Err(OptimizationError::NoCrosslinks);
        }
        self.state = OptimizationState::new();
        let threshold = self.distance_threshold();
        let mut guard = CleanupGuard { generator };
        let mut current = input;

        info!(
            pairs = self.pairs.len(),
            threshold,
            max_attempts = self.config.max_attempts,
            "Starting cross-link optimization."
        );
        reporter.report(Progress::TaskStart {
            total_steps: self.config.max_attempts as u64,
        });

        loop {
            let attempt = self.state.begin_attempt();
            let mut trials = guard
                .generator
                .generate(&current)
                .map_err(|source| OptimizationError::Generator { attempt, source })?;
            if trials.len() < 2 {
                return Err(OptimizationError::InsufficientCandidates {
                    attempt,
                    found: trials.len(),
                });
            }

            self.state.phase = OptimizationPhase::Scoring;
            let (best_index, best_distance) = self.best_trial(&trials, attempt)?;
            self.state.record(best_distance);
            current = trials.swap_remove(best_index);

            info!(attempt, distance = best_distance, threshold, "Attempt scored.");
            reporter.report(Progress::Attempt {
                index: attempt,
                distance: best_distance,
            });
            reporter.report(Progress::TaskIncrement);

            if best_distance <= threshold {
                self.state.phase = OptimizationPhase::Converged;
                reporter.report(Progress::TaskFinish);
                info!(attempts = attempt, distance = best_distance, "Cross-link optimization converged.");
                return Ok(self.finish(current, best_distance, OptimizationOutcome::Converged));
            }

            if attempt >= self.config.max_attempts {
                self.state.phase = OptimizationPhase::Exhausted;
                reporter.report(Progress::TaskFinish);
                if best_distance > self.config.critical_threshold {
                    self.state.phase = OptimizationPhase::Failed;
                    return Err(OptimizationError::Failed {
                        final_distance: best_distance,
                        critical_threshold: self.config.critical_threshold,
                        attempts: attempt,
                        history: self.state.history.clone(),
                    });
                }
                warn!(
                    attempts = attempt,
                    distance = best_distance,
                    threshold,
                    "Attempt budget exhausted above the acceptance threshold; keeping the best structure."
                );
                return Ok(self.finish(
                    current,
                    best_distance,
                    OptimizationOutcome::AcceptedWithWarning,
                ));
            }

            self.state.phase = OptimizationPhase::GeneratingCandidates;
        }
    }

    fn finish(
        &self,
        structure: Structure,
        final_distance: f64,
        outcome: OptimizationOutcome,
    ) -> OptimizationResult {
        OptimizationResult {
            structure,
            final_distance,
            outcome,
            history: self.state.history.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::crosslink::Terminal;
    use crate::core::models::structure::{AtomRecord, RecordKind};
    use crate::engine::generators::GeneratorError;
    use crate::engine::state::AttemptRecord;
    use nalgebra::Vector3;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn position(chain_id: char, residue_number: isize, residue_type: &str, atom_name: &str) -> CrosslinkPosition {
        CrosslinkPosition {
            residue_number,
            chain_id,
            residue_type: residue_type.to_string(),
            atom_name: atom_name.to_string(),
        }
    }

    fn divalent_pair() -> CrosslinkPair {
        CrosslinkPair {
            position1: position('A', 9, "L4Y", "CE"),
            position2: position('B', 947, "L5Y", "NZ"),
            position3: None,
            terminal: Terminal::N,
        }
    }

    fn atom(serial: usize, pos: &CrosslinkPosition, x: f64, y: f64) -> AtomRecord {
        AtomRecord {
            kind: RecordKind::Atom,
            serial,
            name: pos.atom_name.clone(),
            residue_name: pos.residue_type.clone(),
            chain_id: pos.chain_id,
            residue_number: pos.residue_number,
            position: Point3::new(x, y, 0.0),
            suffix: String::new(),
        }
    }

    /// Two atoms `separation` apart along x.
    fn divalent_structure(separation: f64) -> Structure {
        let pair = divalent_pair();
        Structure::new(vec![
            atom(1, &pair.position1, 0.0, 0.0),
            atom(2, &pair.position2, separation, 0.0),
        ])
    }

    fn config(max_attempts: usize) -> OptimizationConfig {
        OptimizationConfig {
            max_attempts,
            divalent_threshold: 2.0,
            trivalent_threshold: 5.0,
            critical_threshold: 10.0,
        }
    }

    /// Moves the last atom by `step` in the best trial and by half of it in the other.
    struct StepGenerator {
        step: f64,
        trials: usize,
        calls: usize,
        cleanups: Arc<AtomicUsize>,
    }

    impl StepGenerator {
        fn new(step: f64) -> Self {
            Self {
                step,
                trials: 2,
                calls: 0,
                cleanups: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl CandidateGenerator for StepGenerator {
        fn generate(&mut self, input: &Structure) -> Result<Vec<Structure>, GeneratorError> {
            self.calls += 1;
            let mut trials = Vec::new();
            for i in 0..self.trials {
                let mut trial = input.clone();
                let step = if i == 0 { self.step / 2.0 } else { self.step };
                if let Some(last) = trial.atoms.last_mut() {
                    last.position += Vector3::new(step, 0.0, 0.0);
                }
                trials.push(trial);
            }
            Ok(trials)
        }

        fn cleanup(&mut self) {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FailingGenerator {
        cleanups: Arc<AtomicUsize>,
        panic: bool,
    }

    impl CandidateGenerator for FailingGenerator {
        fn generate(&mut self, _input: &Structure) -> Result<Vec<Structure>, GeneratorError> {
            if self.panic {
                panic!("generator crashed");
            }
            Err(GeneratorError::ProcessFailed {
                program: "fake".into(),
                status: "exit status: 1".into(),
                stdout: String::new(),
                stderr: "boom".into(),
            })
        }

        fn cleanup(&mut self) {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn converges_after_two_attempts_when_each_attempt_gains_two_angstrom() {
        let mut optimizer = CrosslinkOptimizer::new(vec![divalent_pair()], config(3));
        let mut generator = StepGenerator::new(-2.0);

        let result = optimizer
            .optimize(divalent_structure(5.0), &mut generator, &ProgressReporter::new())
            .unwrap();

        assert_eq!(result.outcome, OptimizationOutcome::Converged);
        assert_eq!(result.history.len(), 2);
        assert!((result.history[0].distance - 3.0).abs() < 1e-9);
        assert!((result.final_distance - 1.0).abs() < 1e-9);
        assert_eq!(generator.calls, 2);
        assert_eq!(optimizer.state().phase, OptimizationPhase::Converged);
        assert_eq!(generator.cleanups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn exhaustion_below_the_critical_threshold_keeps_the_best_structure() {
        let mut optimizer = CrosslinkOptimizer::new(vec![divalent_pair()], config(3));
        let mut generator = StepGenerator::new(0.0);

        let result = optimizer
            .optimize(divalent_structure(8.0), &mut generator, &ProgressReporter::new())
            .unwrap();

        assert_eq!(result.outcome, OptimizationOutcome::AcceptedWithWarning);
        assert_eq!(result.history.len(), 3);
        assert_eq!(optimizer.state().phase, OptimizationPhase::Exhausted);
    }

    #[test]
    fn exhaustion_above_the_critical_threshold_fails_with_history() {
        let mut optimizer = CrosslinkOptimizer::new(vec![divalent_pair()], config(3));
        let mut generator = StepGenerator::new(0.0);

        let err = optimizer
            .optimize(divalent_structure(12.0), &mut generator, &ProgressReporter::new())
            .unwrap_err();

        match err {
            OptimizationError::Failed {
                attempts, history, ..
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(
                    history,
                    vec![
                        AttemptRecord { attempt: 1, distance: 12.0 },
                        AttemptRecord { attempt: 2, distance: 12.0 },
                        AttemptRecord { attempt: 3, distance: 12.0 },
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(optimizer.state().phase, OptimizationPhase::Failed);
        assert_eq!(generator.cleanups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn a_single_trial_is_not_enough() {
        let mut optimizer = CrosslinkOptimizer::new(vec![divalent_pair()], config(3));
        let mut generator = StepGenerator::new(-1.0);
        generator.trials = 1;

        let err = optimizer
            .optimize(divalent_structure(5.0), &mut generator, &ProgressReporter::new())
            .unwrap_err();

        assert!(matches!(
            err,
            OptimizationError::InsufficientCandidates { attempt: 1, found: 1 }
        ));
        assert_eq!(generator.cleanups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn generator_failures_surface_and_still_clean_up() {
        let cleanups = Arc::new(AtomicUsize::new(0));
        let generator = FailingGenerator {
            cleanups: cleanups.clone(),
            panic: false,
        };
        let mut optimizer = CrosslinkOptimizer::new(vec![divalent_pair()], config(3));

        let err = optimizer
            .optimize(divalent_structure(5.0), generator, &ProgressReporter::new())
            .unwrap_err();

        assert!(matches!(err, OptimizationError::Generator { attempt: 1, .. }));
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cleanup_runs_even_when_the_generator_panics() {
        let cleanups = Arc::new(AtomicUsize::new(0));
        let generator = FailingGenerator {
            cleanups: cleanups.clone(),
            panic: true,
        };
        let mut optimizer = CrosslinkOptimizer::new(vec![divalent_pair()], config(3));

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            optimizer.optimize(divalent_structure(5.0), generator, &ProgressReporter::new())
        }));

        assert!(outcome.is_err());
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_cross_link_atoms_are_reported() {
        let mut optimizer = CrosslinkOptimizer::new(vec![divalent_pair()], config(3));
        let mut incomplete = divalent_structure(5.0);
        incomplete.atoms.truncate(1);

        let err = optimizer
            .optimize(incomplete, StepGenerator::new(-1.0), &ProgressReporter::new())
            .unwrap_err();

        match err {
            OptimizationError::MissingAtom { position, .. } => {
                assert_eq!(position, divalent_pair().position2)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_pairs_means_nothing_to_optimize() {
        let mut optimizer = CrosslinkOptimizer::new(Vec::new(), config(3));
        let err = optimizer
            .optimize(divalent_structure(5.0), StepGenerator::new(-1.0), &ProgressReporter::new())
            .unwrap_err();
        assert!(matches!(err, OptimizationError::NoCrosslinks));
    }

    #[test]
    fn trivalent_pairs_sum_all_three_distances_and_use_the_trivalent_threshold() {
        let mut pair = divalent_pair();
        pair.position3 = Some(position('C', 1040, "LY3", "CG"));
        let structure = Structure::new(vec![
            atom(1, &pair.position1, 0.0, 0.0),
            atom(2, &pair.position2, 3.0, 0.0),
            atom(3, pair.position3.as_ref().unwrap(), 0.0, 4.0),
        ]);
        let optimizer = CrosslinkOptimizer::new(vec![pair, divalent_pair()], config(3));

        assert_eq!(optimizer.distance_threshold(), 5.0);
        assert!((optimizer.score(&structure).unwrap() - (12.0 + 3.0)).abs() < 1e-9);
    }
}
