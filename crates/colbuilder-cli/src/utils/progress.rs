use colbuilder::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Display state shared between the engine callback and the command.
struct Display {
    bar: ProgressBar,
    /// Smallest cross-link distance (Angstrom) seen in the running phase.
    best_distance: Option<f64>,
}

impl Display {
    fn start_phase(&mut self, name: &str) {
        self.best_distance = None;
        self.bar.reset();
        self.bar.set_length(0);
        self.bar.set_style(phase_style());
        self.bar.set_prefix(name.to_string());
        self.bar.set_message("");
        self.bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    }

    fn finish_phase(&mut self) {
        self.bar.disable_steady_tick();
        self.bar.set_style(phase_style());
        let summary = match self.best_distance {
            Some(best) => format!("✓ best cross-link distance {:.3} Å", best),
            None => "✓ done".to_string(),
        };
        self.bar.finish_with_message(summary);
    }

    fn start_steps(&mut self, total: u64) {
        self.bar.disable_steady_tick();
        self.bar.set_style(steps_style());
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn finish_steps(&mut self) {
        if let Some(length) = self.bar.length() {
            self.bar.set_position(length);
        }
    }

    fn record_attempt(&mut self, index: usize, distance: f64) {
        let best = self.best_distance.map_or(distance, |b| b.min(distance));
        self.best_distance = Some(best);
        self.bar.set_message(format!(
            "attempt {}: {:.3} Å (best {:.3} Å)",
            index, distance, best
        ));
    }

    fn note(&self, message: String) {
        if self.bar.is_finished() {
            self.bar.set_message(message);
        } else {
            self.bar.println(format!("  {}", message));
        }
    }
}

/// Renders engine progress on stderr: a spinner per phase, a bar while copy pairs
/// or optimization attempts are counted, and the best cross-link distance so far.
#[derive(Clone)]
pub struct CliProgressHandler {
    display: Arc<Mutex<Display>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr())
            .with_style(phase_style());
        bar.finish_and_clear();
        Self {
            display: Arc::new(Mutex::new(Display {
                bar,
                best_distance: None,
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let display = self.display.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut display) = display.lock() else {
                warn!("Progress display mutex was poisoned; dropping progress event.");
                return;
            };
            match progress {
                Progress::PhaseStart { name } => display.start_phase(name),
                Progress::PhaseFinish => display.finish_phase(),
                Progress::TaskStart { total_steps } => display.start_steps(total_steps),
                Progress::TaskIncrement => display.bar.inc(1),
                Progress::TaskFinish => display.finish_steps(),
                Progress::Attempt { index, distance } => display.record_attempt(index, distance),
                Progress::Message(msg) => display.note(msg),
            }
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn phase_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix:.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn steps_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<24.bold} [{bar:32.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}
