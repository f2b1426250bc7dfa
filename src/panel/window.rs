//! Inclusive integer time windows.
//!
//! - [`TimeWindow`] is the closed range `[start, end]` of periods used for
//!   aggregation, weight fitting, and path reconstruction.
//!
//! Notes
//! -----
//! - Construction never fails; reversed or single-period windows are rejected
//!   where the role of the window is known (see
//!   [`AnalysisSpec::validate`](crate::panel::spec::AnalysisSpec::validate)).
use crate::panel::data::Period;
use serde::{Deserialize, Serialize};

/// Closed range of periods `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Period,
    pub end: Period,
}

impl TimeWindow {
    pub fn new(start: Period, end: Period) -> TimeWindow {
        TimeWindow { start, end }
    }

    /// Single-period window `[period, period]`.
    pub fn single(period: Period) -> TimeWindow {
        TimeWindow { start: period, end: period }
    }

    /// Number of periods covered; zero when reversed.
    pub fn len(&self) -> usize {
        if self.end < self.start { 0 } else { (self.end - self.start) as usize + 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, period: Period) -> bool {
        self.start <= period && period <= self.end
    }

    /// Periods in ascending order.
    pub fn periods(&self) -> impl Iterator<Item = Period> {
        self.start..=self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Length and iteration agree for a regular window and collapse to zero
    // for a reversed one.
    //
    // Given
    // -----
    // - `[1980, 1984]` and the reversed `[1990, 1985]`.
    //
    // Expect
    // ------
    // - Length 5 with periods 1980..=1984; reversed window is empty.
    fn window_len_matches_periods() {
        let w = TimeWindow::new(1980, 1984);
        assert_eq!(w.len(), 5);
        assert_eq!(w.periods().collect::<Vec<_>>(), vec![1980, 1981, 1982, 1983, 1984]);
        assert!(w.contains(1982));
        assert!(!w.contains(1985));

        let reversed = TimeWindow::new(1990, 1985);
        assert!(reversed.is_empty());
        assert_eq!(reversed.periods().count(), 0);
    }
}
