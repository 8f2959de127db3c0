//! Keeping the viewport still while the window grows, and turning dates into
//! scroll targets.
//!
//! Every cell has the same width, so the offset of index `i` is `i * width`
//! and a prepend of `k` cells is undone by moving the offset forward by
//! `k * width` in the same commit that swaps the window.

use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::{px::Px, window::DateWindow};

/// Scroll offset adjustment that keeps content stationary after
/// `prepended_count` cells of `cell_width` were inserted in front of it.
///
/// ```
/// use dayline::{anchor::compensate_for_prepend, px::Px};
///
/// assert_eq!(compensate_for_prepend(31, Px(60)), Px(1860));
/// ```
pub fn compensate_for_prepend(prepended_count: usize, cell_width: Px) -> Px {
    cell_width.saturating_mul_count(prepended_count)
}

/// A request for the host to move its scroll view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    /// Index of the cell to bring to the leading edge.
    pub index: usize,
    /// Absolute offset of that cell.
    pub offset: Px,
    /// Whether the host should animate the move. Compensation and initial
    /// positioning are instantaneous.
    pub animated: bool,
}

/// Fixed-width geometry of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAnchor {
    cell_width: Px,
}

impl ScrollAnchor {
    /// Creates the geometry for cells of `cell_width`.
    pub fn new(cell_width: Px) -> Self {
        Self {
            cell_width: if cell_width <= Px::ZERO {
                Px(1)
            } else {
                cell_width
            },
        }
    }

    /// Width of a single cell.
    pub fn cell_width(&self) -> Px {
        self.cell_width
    }

    /// Offset adjustment for a prepend of `prepended_count` cells.
    pub fn compensate_for_prepend(&self, prepended_count: usize) -> Px {
        compensate_for_prepend(prepended_count, self.cell_width)
    }

    /// Position of `target` in the window, or `None` when it is not
    /// materialized.
    ///
    /// The window is contiguous, so this is a key subtraction rather than a
    /// search.
    pub fn index_of(window: &DateWindow, target: NaiveDate) -> Option<usize> {
        let first = window.first()?;
        if !window.contains(target) {
            return None;
        }
        let distance = (target - first.date()).num_days();
        usize::try_from(distance).ok()
    }

    /// Leading-edge offset of the cell at `index`.
    pub fn offset_for_index(&self, index: usize) -> Px {
        self.cell_width.saturating_mul_count(index)
    }

    /// Total strip length for `len` cells.
    pub fn content_width(&self, len: usize) -> Px {
        self.cell_width.saturating_mul_count(len)
    }

    /// Index of the cell whose leading edge is nearest to `offset`, clamped
    /// to a window of `len` cells. Halfway rounds toward the later cell.
    pub fn index_at_offset(&self, offset: Px, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let width = i64::from(self.cell_width.raw());
        let offset = i64::from(offset.raw().max(0));
        let index = (offset + width / 2) / width;
        let index = usize::try_from(index).unwrap_or(usize::MAX);
        Some(index.min(len - 1))
    }

    /// Builds a request to bring `index` to the leading edge.
    pub fn scroll_to_index(&self, index: usize, animated: bool) -> ScrollRequest {
        ScrollRequest {
            index,
            offset: self.offset_for_index(index),
            animated,
        }
    }
}

/// Scroll position state owned by one strip.
///
/// The host reports offsets as the user drags or flings; the strip answers
/// with [`ScrollRequest`]s. Two requests can be outstanding at once: an
/// instantaneous jump (initial positioning or prepend compensation) and an
/// animated glide (go-to navigation). Within each kind only the newest is
/// kept, so a second jump issued before the first is consumed retargets.
#[derive(Debug, Clone, PartialEq)]
pub struct StripScroll {
    /// Offset of the viewport's leading edge from the first cell.
    offset: Px,
    /// Width of the visible area.
    viewport_width: Px,
    /// Total length of all materialized cells.
    content_width: Px,
    /// Instantaneous request not yet picked up by the host.
    pending_jump: Option<ScrollRequest>,
    /// Animated request not yet picked up by the host.
    pending_glide: Option<ScrollRequest>,
    /// Time of the last reported scroll frame.
    last_scroll_time: Option<Instant>,
    /// Whether scroll frames arrived since the last settle.
    in_motion: bool,
}

impl Default for StripScroll {
    fn default() -> Self {
        Self::new()
    }
}

impl StripScroll {
    /// Creates a scroll state at offset zero with an unknown viewport.
    pub fn new() -> Self {
        Self {
            offset: Px::ZERO,
            viewport_width: Px::ZERO,
            content_width: Px::ZERO,
            pending_jump: None,
            pending_glide: None,
            last_scroll_time: None,
            in_motion: false,
        }
    }

    /// Current offset of the viewport's leading edge.
    pub fn offset(&self) -> Px {
        self.offset
    }

    /// Width of the visible area, zero until the host reports it.
    pub fn viewport_width(&self) -> Px {
        self.viewport_width
    }

    /// Total strip length.
    pub fn content_width(&self) -> Px {
        self.content_width
    }

    /// Whether scroll frames arrived since the last settle.
    pub fn in_motion(&self) -> bool {
        self.in_motion
    }

    /// Updates the visible area width.
    pub fn set_viewport_width(&mut self, width: Px) {
        self.viewport_width = width.max(Px::ZERO);
        self.offset = self.clamp(self.offset);
    }

    /// Updates the total strip length.
    ///
    /// Must be called before [`compensate`](Self::compensate) when the content
    /// grew, since offsets are clamped to the content.
    pub fn set_content_width(&mut self, width: Px) {
        self.content_width = width.max(Px::ZERO);
        self.offset = self.clamp(self.offset);
    }

    /// Largest offset that still fills the viewport.
    pub fn max_offset(&self) -> Px {
        self.content_width
            .saturating_sub(self.viewport_width)
            .max(Px::ZERO)
    }

    fn clamp(&self, offset: Px) -> Px {
        offset.clamp(Px::ZERO, self.max_offset())
    }

    /// Records a scroll frame reported by the host.
    pub fn record_scroll(&mut self, offset: Px, now: Instant) {
        self.offset = self.clamp(offset);
        self.last_scroll_time = Some(now);
        self.in_motion = true;
    }

    /// Records the offset the host came to rest at and ends the motion.
    pub fn settle_at(&mut self, offset: Px) {
        self.offset = self.clamp(offset);
        self.in_motion = false;
    }

    /// Whether motion has been quiet for at least `delay`.
    pub fn idle_for(&self, now: Instant, delay: Duration) -> bool {
        self.in_motion
            && self
                .last_scroll_time
                .map(|t| now.saturating_duration_since(t) >= delay)
                .unwrap_or(true)
    }

    /// Queues a request for the host, replacing any unconsumed one of the
    /// same kind.
    ///
    /// Instantaneous requests also move the tracked offset right away.
    pub fn request(&mut self, request: ScrollRequest) {
        if request.animated {
            self.pending_glide = Some(request);
        } else {
            self.offset = self.clamp(request.offset);
            self.pending_jump = Some(request);
        }
    }

    /// Moves the offset forward by `delta` after `prepended_count` cells were
    /// inserted in front, and queues the matching instantaneous jump.
    ///
    /// `index` is the cell now at the leading edge. A pending glide is
    /// retargeted by the same amount so it still lands on its date.
    pub fn compensate(&mut self, prepended_count: usize, delta: Px, index: usize) -> ScrollRequest {
        self.offset = self.clamp(self.offset.saturating_add(delta));
        let jump = ScrollRequest {
            index,
            offset: self.offset,
            animated: false,
        };
        self.pending_jump = Some(jump);
        if let Some(glide) = self.pending_glide.as_mut() {
            glide.index = glide.index.saturating_add(prepended_count);
            glide.offset = glide.offset.saturating_add(delta);
        }
        jump
    }

    /// Whether any request is waiting for the host.
    pub fn has_pending(&self) -> bool {
        self.pending_jump.is_some() || self.pending_glide.is_some()
    }

    /// Hands the pending requests to the host, jump first.
    pub fn take_requests(&mut self) -> Vec<ScrollRequest> {
        self.pending_jump
            .take()
            .into_iter()
            .chain(self.pending_glide.take())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::visible_range;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn index_of_uses_key_distance() {
        let window = DateWindow::initialize(ymd(2024, 3, 15), 1, 2).unwrap();
        assert_eq!(ScrollAnchor::index_of(&window, ymd(2024, 2, 1)), Some(0));
        assert_eq!(ScrollAnchor::index_of(&window, ymd(2024, 3, 1)), Some(29));
        assert_eq!(ScrollAnchor::index_of(&window, ymd(2024, 5, 31)), Some(120));
        assert_eq!(ScrollAnchor::index_of(&window, ymd(2024, 6, 1)), None);
        assert_eq!(ScrollAnchor::index_of(&window, ymd(2024, 1, 31)), None);
    }

    #[test]
    fn prepend_compensation_keeps_the_same_date_in_front() {
        let anchor = ScrollAnchor::new(Px(48));
        let window = DateWindow::initialize(ymd(2024, 3, 15), 1, 2).unwrap();
        let offset = anchor.offset_for_index(10);
        let before = window.get(anchor.index_at_offset(offset, window.len()).unwrap());

        let prepend = window.grow_backward(1).unwrap();
        let adjusted = offset + anchor.compensate_for_prepend(prepend.prepended_count);
        assert_eq!(adjusted - offset, Px(48 * 31));
        let after = prepend
            .window
            .get(anchor.index_at_offset(adjusted, prepend.window.len()).unwrap());
        assert_eq!(before, after);
    }

    #[test]
    fn prepend_compensation_keeps_the_first_fully_visible_date_mid_cell() {
        let anchor = ScrollAnchor::new(Px(48));
        let viewport = Px(300);
        let window = DateWindow::initialize(ymd(2024, 3, 15), 1, 2).unwrap();
        let offset = anchor.offset_for_index(10) + Px(17);
        let first_full = |window: &DateWindow, offset: Px| {
            let range = visible_range(offset, viewport, anchor.cell_width(), 1.0, window.len());
            window.get(range.start).unwrap().date()
        };
        let before = first_full(&window, offset);
        assert_eq!(before, ymd(2024, 2, 12));

        for months in [1, 3, 14] {
            let prepend = window.grow_backward(months).unwrap();
            let adjusted = offset + anchor.compensate_for_prepend(prepend.prepended_count);
            assert_eq!(first_full(&prepend.window, adjusted), before, "{months} months");
        }
    }

    #[test]
    fn index_at_offset_rounds_to_nearest_cell() {
        let anchor = ScrollAnchor::new(Px(60));
        assert_eq!(anchor.index_at_offset(Px(0), 10), Some(0));
        assert_eq!(anchor.index_at_offset(Px(29), 10), Some(0));
        assert_eq!(anchor.index_at_offset(Px(30), 10), Some(1));
        assert_eq!(anchor.index_at_offset(Px(-500), 10), Some(0));
        assert_eq!(anchor.index_at_offset(Px(60_000), 10), Some(9));
        assert_eq!(anchor.index_at_offset(Px(0), 0), None);
    }

    #[test]
    fn non_positive_cell_width_is_clamped() {
        assert_eq!(ScrollAnchor::new(Px(0)).cell_width(), Px(1));
        assert_eq!(ScrollAnchor::new(Px(-4)).cell_width(), Px(1));
    }

    #[test]
    fn newer_requests_retarget() {
        let anchor = ScrollAnchor::new(Px(50));
        let mut scroll = StripScroll::new();
        scroll.set_content_width(anchor.content_width(100));
        scroll.set_viewport_width(Px(350));

        scroll.request(anchor.scroll_to_index(40, true));
        scroll.request(anchor.scroll_to_index(12, true));
        let taken = scroll.take_requests();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].index, 12);
        assert!(scroll.take_requests().is_empty());
        // Animated requests leave the tracked offset to the host.
        assert_eq!(scroll.offset(), Px::ZERO);

        scroll.request(anchor.scroll_to_index(5, false));
        assert_eq!(scroll.offset(), Px(250));
    }

    #[test]
    fn compensation_moves_offset_and_pending_glide() {
        let anchor = ScrollAnchor::new(Px(50));
        let mut scroll = StripScroll::new();
        scroll.set_viewport_width(Px(300));
        scroll.set_content_width(anchor.content_width(60));
        scroll.request(anchor.scroll_to_index(4, false));
        scroll.request(anchor.scroll_to_index(20, true));

        // Content grows first, then the offset follows.
        scroll.set_content_width(anchor.content_width(90));
        let jump = scroll.compensate(30, anchor.compensate_for_prepend(30), 34);
        assert_eq!(scroll.offset(), Px(1700));
        assert_eq!(jump, ScrollRequest { index: 34, offset: Px(1700), animated: false });

        let taken = scroll.take_requests();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0], jump);
        assert_eq!(taken[1], ScrollRequest { index: 50, offset: Px(2500), animated: true });
        assert!(!scroll.has_pending());
    }

    #[test]
    fn offsets_are_clamped_to_content() {
        let mut scroll = StripScroll::new();
        scroll.set_content_width(Px(1000));
        scroll.set_viewport_width(Px(300));
        let now = Instant::now();
        scroll.record_scroll(Px(2000), now);
        assert_eq!(scroll.offset(), Px(700));
        scroll.record_scroll(Px(-20), now);
        assert_eq!(scroll.offset(), Px::ZERO);
        scroll.compensate(2, Px(120), 2);
        assert_eq!(scroll.offset(), Px(120));
    }

    #[test]
    fn idle_detection_requires_motion() {
        let mut scroll = StripScroll::new();
        scroll.set_content_width(Px(1000));
        let start = Instant::now();
        assert!(!scroll.idle_for(start, Duration::from_millis(100)));

        scroll.record_scroll(Px(10), start);
        assert!(!scroll.idle_for(start + Duration::from_millis(50), Duration::from_millis(100)));
        assert!(scroll.idle_for(start + Duration::from_millis(100), Duration::from_millis(100)));

        scroll.settle_at(Px(10));
        assert!(!scroll.idle_for(start + Duration::from_secs(1), Duration::from_millis(100)));
    }
}
