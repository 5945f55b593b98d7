//! Running peak and drawdown over the NAV series.

use crate::domain::backtest::PeriodRecord;

/// Sequential peak tracker. The peak starts at zero so the first NAV seen
/// always becomes the peak.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrawdownTracker {
    running_max: f64,
}

impl DrawdownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next NAV, returning `(running_max, drawdown)`.
    pub fn observe(&mut self, nav: f64) -> (f64, f64) {
        if nav > self.running_max {
            self.running_max = nav;
        }
        let drawdown = if self.running_max > 0.0 {
            nav / self.running_max - 1.0
        } else {
            0.0
        };
        (self.running_max, drawdown)
    }
}

/// Orders records by trade date and stamps `cummax_nav` and `drawdown`.
pub fn stamp_drawdowns(records: &mut [PeriodRecord]) {
    records.sort_by_key(|r| r.trade_date);

    let mut tracker = DrawdownTracker::new();
    for record in records.iter_mut() {
        let (running_max, drawdown) = tracker.observe(record.nav);
        record.cummax_nav = running_max;
        record.drawdown = drawdown;
    }
}
