//! Strategies that decide which page numbers appear in pagination controls.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Produces the ordered page numbers to render for a given position.
///
/// Implementations yield unique, ascending numbers within
/// `1..=total_pages`, and nothing at all when `total_pages` is 0.
pub trait PaginationStyle {
    type Pages: Iterator<Item = u64>;

    fn iterate_pages(&self, current: u64, total_pages: u64) -> Self::Pages;
}

/// A band of page numbers around the current page.
///
/// By default the band is clipped at both ends, so it shrinks near the first
/// and last page. With [`SlidingStyle::fixed_width`] the band is shifted away
/// from the edge instead and keeps `before_current + after_current + 1`
/// pages whenever there are enough of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlidingStyle {
    pub before_current: u64,
    pub after_current: u64,
    pub fixed_width: bool,
}

impl Default for SlidingStyle {
    fn default() -> Self {
        Self {
            before_current: 3,
            after_current: 3,
            fixed_width: false,
        }
    }
}

impl SlidingStyle {
    pub fn new(before_current: u64, after_current: u64) -> Self {
        Self {
            before_current,
            after_current,
            fixed_width: false,
        }
    }

    /// Keep the window width constant by shifting it off the edges.
    pub fn fixed_width(mut self) -> Self {
        self.fixed_width = true;
        self
    }

    fn window(&self, current: u64, total_pages: u64) -> RangeInclusive<u64> {
        if total_pages == 0 {
            return 1..=0;
        }

        let current = current.clamp(1, total_pages);
        let mut start = current.saturating_sub(self.before_current).max(1);
        let mut end = current.saturating_add(self.after_current);

        if self.fixed_width {
            // Budget that fell off the left edge moves to the right and vice versa.
            let left_shortfall = self.before_current.saturating_add(1).saturating_sub(current);
            let right_shortfall = end.saturating_sub(total_pages);
            end = end.saturating_add(left_shortfall);
            start = start.saturating_sub(right_shortfall).max(1);
        }

        start..=end.min(total_pages)
    }
}

impl PaginationStyle for SlidingStyle {
    type Pages = RangeInclusive<u64>;

    fn iterate_pages(&self, current: u64, total_pages: u64) -> Self::Pages {
        self.window(current, total_pages)
    }
}
