use super::Progress;

/// Cap while bytes are still arriving with a known total; 100 is reserved
/// for a finished load.
const KNOWN_CAP: f32 = 99.0;
/// Cap for the creeping estimate when the total is unknown.
const UNKNOWN_CAP: f32 = 90.0;
/// Per-event increment for the creeping estimate.
const CREEP_STEP: f32 = 1.2;

/// Loading-overlay percentage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressBar {
    percent: f32,
    done: bool,
}

impl ProgressBar {
    /// A bar at 0%.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current percentage in `[0, 100]`.
    #[must_use]
    pub fn percent(&self) -> f32 {
        self.percent
    }

    /// Whether [`finish`](Self::finish) has been called.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Fold in a progress event and return the new percentage. Ignored once
    /// finished.
    pub fn update(&mut self, progress: Progress) -> f32 {
        if self.done {
            return self.percent;
        }
        self.percent = match progress.total {
            Some(total) if total > 0 => {
                (progress.loaded as f32 / total as f32 * 100.0).min(KNOWN_CAP)
            }
            _ => (self.percent + CREEP_STEP).min(UNKNOWN_CAP),
        };
        self.percent
    }

    /// Mark the load complete (100%).
    pub fn finish(&mut self) {
        self.percent = 100.0;
        self.done = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(loaded: u64, total: u64) -> Progress {
        Progress {
            loaded,
            total: Some(total),
        }
    }

    #[test]
    fn known_total_is_proportional_and_capped() {
        let mut bar = ProgressBar::new();
        assert_eq!(bar.update(known(50, 200)), 25.0);
        assert_eq!(bar.update(known(200, 200)), 99.0);
        assert!(!bar.is_done());
    }

    #[test]
    fn unknown_total_creeps_to_ninety() {
        let mut bar = ProgressBar::new();
        let unknown = Progress {
            loaded: 1,
            total: None,
        };
        assert!((bar.update(unknown) - 1.2).abs() < 1e-6);
        for _ in 0..200 {
            let _ = bar.update(unknown);
        }
        assert_eq!(bar.percent(), 90.0);
    }

    #[test]
    fn finish_pins_to_hundred() {
        let mut bar = ProgressBar::new();
        let _ = bar.update(known(10, 100));
        bar.finish();
        assert_eq!(bar.percent(), 100.0);
        assert_eq!(bar.update(known(20, 100)), 100.0);
    }
}
