//! Dual-sample aggregation (component D): a full-run total and a
//! current-window total that gets cut and reset at each report boundary.

use duct_core::types::Sample;

#[derive(Debug, Default)]
pub struct Aggregator {
    pub full_run: Sample,
    current_window: Option<Sample>,
    pub num_reports: u32,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a freshly collected sample into both the full-run total and the
    /// window that is still accumulating toward the next report.
    pub fn absorb(&mut self, sample: &Sample) {
        self.full_run = self.full_run.aggregate(sample);
        self.current_window = Some(match self.current_window.take() {
            Some(window) => window.aggregate(sample),
            None => Sample::default().aggregate(sample),
        });
    }

    /// Take whatever has accumulated in the current window, if anything, and
    /// count it as one more report. A window with nothing new since the last
    /// cut does not count toward `num_reports`.
    pub fn cut_window(&mut self) -> Option<Sample> {
        let window = self.current_window.take();
        if window.is_some() {
            self.num_reports += 1;
        }
        window
    }
}
