/// Events emitted by long-running workflows for display by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    /// One optimization attempt was scored.
    Attempt { index: usize, distance: f64 },

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional callback. Silent when none is set.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `work` between a `PhaseStart` and a `PhaseFinish` event.
    ///
    /// The finish event is sent whether or not `work` succeeds.
    pub fn phase<T>(&self, name: &'static str, work: impl FnOnce() -> T) -> T {
        self.report(Progress::PhaseStart { name });
        let result = work();
        self.report(Progress::PhaseFinish);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn phase_brackets_the_work_with_start_and_finish() {
        let events = Mutex::new(Vec::new());
        let reporter =
            ProgressReporter::with_callback(Box::new(|e| events.lock().unwrap().push(e)));

        let value = reporter.phase("Connectivity", || {
            reporter.report(Progress::TaskIncrement);
            42
        });

        assert_eq!(value, 42);
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Progress::PhaseStart {
                    name: "Connectivity"
                },
                Progress::TaskIncrement,
                Progress::PhaseFinish,
            ]
        );
    }

    #[test]
    fn reporter_without_callback_is_silent() {
        ProgressReporter::new().report(Progress::Message("ignored".into()));
    }
}
