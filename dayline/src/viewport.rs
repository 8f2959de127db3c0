//! Visibility sampling and the "current month" signal.
//!
//! The observer is fed the settled visible range, never individual scroll
//! frames. The representative cell is the leftmost visible one, and a
//! notification is produced only when its month or year differs from the
//! last one produced.

use std::ops::Range;

use tracing::trace;

use crate::{
    calendar::{DateCell, MonthYear},
    px::Px,
    window::DateWindow,
};

/// Indices of the cells that show at least `threshold` of their width inside
/// the viewport `[offset, offset + viewport_width)`.
///
/// ```
/// use dayline::{px::Px, viewport::visible_range};
///
/// // Cells 0..10 of 60px; the viewport starts 20px into cell 2.
/// let range = visible_range(Px(140), Px(300), Px(60), 0.5, 10);
/// // Cell 2 shows 40/60, cell 7 shows 20/60.
/// assert_eq!(range, 2..7);
/// ```
pub fn visible_range(
    offset: Px,
    viewport_width: Px,
    cell_width: Px,
    threshold: f32,
    len: usize,
) -> Range<usize> {
    if len == 0 || viewport_width <= Px::ZERO || cell_width <= Px::ZERO {
        return 0..0;
    }
    let width = i64::from(cell_width.raw());
    let start_px = i64::from(offset.raw().max(0));
    let end_px = start_px + i64::from(viewport_width.raw());
    let last_index = len as i64 - 1;

    let shown = |index: i64| -> f32 {
        let cell_start = index * width;
        let cell_end = cell_start + width;
        let overlap = cell_end.min(end_px) - cell_start.max(start_px);
        overlap.max(0) as f32 / width as f32
    };
    let threshold = threshold.clamp(0.0, 1.0);

    let mut first = (start_px / width).min(last_index);
    if shown(first) < threshold {
        first += 1;
    }
    let mut last = ((end_px - 1) / width).min(last_index);
    if last >= first && shown(last) < threshold {
        last -= 1;
    }
    if first > last {
        return 0..0;
    }
    first as usize..last as usize + 1
}

/// Extends a visible range by `overscan` cells on each side, clamped to a
/// window of `len` cells.
pub fn render_range(visible: Range<usize>, overscan: usize, len: usize) -> Range<usize> {
    if len == 0 {
        return 0..0;
    }
    let start = visible.start.saturating_sub(overscan).min(len);
    let end = visible.end.saturating_add(overscan).min(len);
    start..end.max(start)
}

/// Turns settled visibility samples into de-duplicated month changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportObserver {
    last_emitted: MonthYear,
    candidate: Option<(MonthYear, usize)>,
    hysteresis: usize,
    visible: Range<usize>,
}

impl ViewportObserver {
    /// Creates an observer whose header already shows `initial`.
    ///
    /// `hysteresis` is the number of consecutive samples a new month must be
    /// seen for before it is reported; `1` reports on the first sample.
    pub fn new(initial: MonthYear, hysteresis: usize) -> Self {
        Self {
            last_emitted: initial,
            candidate: None,
            hysteresis: hysteresis.max(1),
            visible: 0..0,
        }
    }

    /// The month most recently reported (or the initial one).
    pub fn current(&self) -> MonthYear {
        self.last_emitted
    }

    /// The range from the latest sample.
    pub fn visible(&self) -> Range<usize> {
        self.visible.clone()
    }

    /// Forgets pending candidates and reports `month` as current without
    /// emitting it.
    pub fn reset(&mut self, month: MonthYear) {
        self.last_emitted = month;
        self.candidate = None;
        self.visible = 0..0;
    }

    /// Shifts the stored range after `count` cells were prepended.
    pub fn shift(&mut self, count: usize) {
        self.visible = self.visible.start.saturating_add(count)..self.visible.end.saturating_add(count);
    }

    /// The leftmost visible cell of a sample.
    pub fn representative<'a>(window: &'a DateWindow, visible: &Range<usize>) -> Option<&'a DateCell> {
        if visible.is_empty() {
            return None;
        }
        window.get(visible.start)
    }

    /// Feeds one settled sample. Returns the new month when it changed.
    pub fn observe(&mut self, window: &DateWindow, visible: Range<usize>) -> Option<MonthYear> {
        self.visible = visible.clone();
        let month = Self::representative(window, &visible)?.month_year();
        if month == self.last_emitted {
            self.candidate = None;
            return None;
        }

        let seen = match self.candidate {
            Some((candidate, count)) if candidate == month => count + 1,
            _ => 1,
        };
        if seen < self.hysteresis {
            trace!(%month, seen, "month candidate held back");
            self.candidate = Some((month, seen));
            return None;
        }

        self.candidate = None;
        self.last_emitted = month;
        Some(month)
    }
}
