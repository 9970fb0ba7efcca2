use crate::core::models::structure::Structure;

/// Phases of one cross-link optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizationPhase {
    #[default]
    Idle,
    GeneratingCandidates,
    Scoring,
    Converged,
    Exhausted,
    Failed,
}

impl OptimizationPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OptimizationPhase::Converged | OptimizationPhase::Exhausted | OptimizationPhase::Failed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptRecord {
    pub attempt: usize,
    pub distance: f64,
}

/// Mutable bookkeeping of a single optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationState {
    pub phase: OptimizationPhase,
    pub attempt: usize,
    pub best_distance: f64,
    pub history: Vec<AttemptRecord>,
}

impl Default for OptimizationState {
    fn default() -> Self {
        Self {
            phase: OptimizationPhase::Idle,
            attempt: 0,
            best_distance: f64::INFINITY,
            history: Vec::new(),
        }
    }
}

impl OptimizationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_attempt(&mut self) -> usize {
        self.attempt += 1;
        self.phase = OptimizationPhase::GeneratingCandidates;
        self.attempt
    }

    /// Records the best distance of the current attempt.
    pub fn record(&mut self, distance: f64) {
        self.history.push(AttemptRecord {
            attempt: self.attempt,
            distance,
        });
        if distance < self.best_distance {
            self.best_distance = distance;
        }
    }

    pub fn last_distance(&self) -> Option<f64> {
        self.history.last().map(|r| r.distance)
    }
}

/// How a run that returned a structure ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationOutcome {
    /// The distance reached the acceptance threshold.
    Converged,
    /// The attempt budget ran out below the critical threshold.
    AcceptedWithWarning,
}

#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub structure: Structure,
    pub final_distance: f64,
    pub outcome: OptimizationOutcome,
    pub history: Vec<AttemptRecord>,
}
