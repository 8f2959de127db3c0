//! # Date strip controller
//!
//! Ties the window store, the scroll anchor and the viewport observer to the
//! events a host delivers, and answers with render plans and scroll requests.
//!
//! ## Usage
//!
//! A host owns one controller per strip and forwards its scroll view's
//! events:
//!
//! - report the viewport width whenever layout changes,
//! - forward each scroll frame to [`on_scroll`](DateStripController::on_scroll),
//! - forward momentum stops to [`momentum_end`](DateStripController::momentum_end),
//! - call [`tick`](DateStripController::tick) once per frame and apply the
//!   returned [`FrameUpdate`],
//! - lay out the cells of [`render_plan`](DateStripController::render_plan).
//!
//! ```
//! use std::time::Instant;
//!
//! use chrono::NaiveDate;
//! use dayline::{args::DateStripArgs, controller::DateStripController, px::Px};
//!
//! let anchor = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
//! let mut strip = DateStripController::new(
//!     DateStripArgs::default()
//!         .anchor(anchor)
//!         .today_provider(move || anchor),
//! )
//! .unwrap();
//! strip.set_viewport_width(Px(300));
//!
//! let update = strip.tick(Instant::now());
//! // The first frame positions the anchor at the leading edge without animation.
//! assert_eq!(update.scroll.len(), 1);
//! assert!(!update.scroll[0].animated);
//! assert_eq!(strip.window().get(update.scroll[0].index).unwrap().date(), anchor);
//! ```
//!
//! ## Growth
//!
//! Edge events only *stage* a growth step. The staged window is installed by
//! [`commit`](DateStripController::commit), which `tick` calls once per frame,
//! so repeated edge events inside one frame grow the window once. A prepend
//! and its offset compensation are applied in the same commit.
//!
//! After a prepend the strip waits in
//! [`GrowthPhase::AwaitingCompensation`] until the host's offsets catch up
//! with the jump. Scroll frames produced before the host applied it are
//! shifted into the grown window's coordinates and cannot stage another
//! prepend.

use std::{ops::Range, time::Instant};

use chrono::NaiveDate;
use tracing::{debug, info, trace, warn};

use crate::{
    anchor::{ScrollAnchor, ScrollRequest, StripScroll},
    args::DateStripArgs,
    calendar::{DateCell, MonthYear},
    error::DateStripError,
    handle::{DateStripHandle, StripCommand},
    px::Px,
    viewport::{ViewportObserver, render_range, visible_range},
    window::{DateWindow, DateWindowStore, Prepend},
};

/// Growth staged by an edge event and waiting for [`DateStripController::commit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GrowthPhase {
    /// Nothing staged.
    #[default]
    Idle,
    /// A prepend is staged.
    GrowingBackward(Prepend),
    /// An append is staged.
    GrowingForward(DateWindow),
    /// A prepend was committed and the host has not yet reported an offset
    /// past its compensation jump.
    AwaitingCompensation {
        /// Offset the jump moves the viewport to.
        expected: Px,
        /// Total width inserted in front since the host last caught up.
        shift: Px,
    },
}

impl GrowthPhase {
    /// Whether nothing is staged.
    pub fn is_idle(&self) -> bool {
        matches!(self, GrowthPhase::Idle)
    }

    fn name(&self) -> &'static str {
        match self {
            GrowthPhase::Idle => "idle",
            GrowthPhase::GrowingBackward(_) => "growing_backward",
            GrowthPhase::GrowingForward(_) => "growing_forward",
            GrowthPhase::AwaitingCompensation { .. } => "awaiting_compensation",
        }
    }
}

/// What changed during one [`tick`](DateStripController::tick).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameUpdate {
    /// The window was replaced; the host must re-layout.
    pub window_changed: bool,
    /// The month reported to `on_month_change` this frame, if any.
    pub month: Option<MonthYear>,
    /// Scroll requests to apply in order. An instantaneous jump always comes
    /// before an animated one.
    pub scroll: Vec<ScrollRequest>,
}

/// Outcome of [`DateStripController::momentum_end`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MomentumEnd {
    /// The date selected at the resting position.
    pub selected: Option<NaiveDate>,
    /// The month reported to `on_month_change` by the settle, if any.
    pub month: Option<MonthYear>,
}

/// One cell the host should instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderItem {
    /// Position in the window.
    pub index: usize,
    /// The day shown.
    pub cell: DateCell,
    /// Leading-edge offset of the cell.
    pub offset: Px,
    /// Whether this is the selected date.
    pub selected: bool,
    /// Whether this is today.
    pub today: bool,
    /// Whether this cell opens a month.
    pub month_start: bool,
}

/// The cells to instantiate for the current offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    /// Cells in the visible range plus overscan, in date order.
    pub items: Vec<RenderItem>,
    /// Indices at least partly on screen.
    pub visible: Range<usize>,
    /// Total strip length.
    pub content_width: Px,
    /// Current offset of the viewport's leading edge.
    pub offset: Px,
}

/// Drives one date strip.
pub struct DateStripController {
    args: DateStripArgs,
    store: DateWindowStore,
    anchor: ScrollAnchor,
    scroll: StripScroll,
    observer: ViewportObserver,
    phase: GrowthPhase,
    selected: NaiveDate,
    handle: DateStripHandle,
    window_changed: bool,
}

impl DateStripController {
    /// Builds the initial window around the anchor and queues the
    /// instantaneous scroll that puts the anchor at the leading edge.
    ///
    /// The selection starts at today and the month header at the anchor's
    /// month.
    pub fn new(args: DateStripArgs) -> Result<Self, DateStripError> {
        args.validate()?;
        let today = args.today.call(());
        let anchor_date = args.anchor.unwrap_or(today);
        let store =
            DateWindowStore::initialize(anchor_date, args.months_before, args.months_after)?;
        let anchor = ScrollAnchor::new(args.cell_width);

        let mut scroll = StripScroll::new();
        scroll.set_content_width(anchor.content_width(store.window().len()));
        let index = ScrollAnchor::index_of(store.window(), anchor_date).unwrap_or(0);
        scroll.request(anchor.scroll_to_index(index, false));

        info!(
            %anchor_date,
            %today,
            len = store.window().len(),
            "date strip created"
        );
        Ok(Self {
            observer: ViewportObserver::new(MonthYear::of(anchor_date), args.month_hysteresis),
            args,
            store,
            anchor,
            scroll,
            phase: GrowthPhase::Idle,
            selected: today,
            handle: DateStripHandle::new(),
            window_changed: false,
        })
    }

    /// The committed window.
    pub fn window(&self) -> &DateWindow {
        self.store.window()
    }

    /// Growth waiting for the next commit.
    pub fn phase(&self) -> &GrowthPhase {
        &self.phase
    }

    /// Scroll position state.
    pub fn scroll(&self) -> &StripScroll {
        &self.scroll
    }

    /// Cell geometry.
    pub fn anchor(&self) -> ScrollAnchor {
        self.anchor
    }

    /// The args this strip was built with.
    pub fn args(&self) -> &DateStripArgs {
        &self.args
    }

    /// The month the header currently shows.
    pub fn current_month(&self) -> MonthYear {
        self.observer.current()
    }

    /// The range of the latest settled sample.
    pub fn settled_visible(&self) -> Range<usize> {
        self.observer.visible()
    }

    /// The highlighted date.
    pub fn selected_date(&self) -> NaiveDate {
        self.selected
    }

    /// Mirrors the owner's selection. The date does not need to be
    /// materialized.
    pub fn set_selected_date(&mut self, date: NaiveDate) {
        self.selected = date;
    }

    /// Today, according to the configured provider.
    pub fn today(&self) -> NaiveDate {
        self.args.today.call(())
    }

    /// A handle the parent can use to navigate this strip.
    pub fn handle(&self) -> DateStripHandle {
        self.handle.clone()
    }

    /// Records the visible area width.
    pub fn set_viewport_width(&mut self, width: Px) {
        self.scroll.set_viewport_width(width);
    }

    /// Records one scroll frame and stages growth when an edge is near.
    ///
    /// Scroll frames never sample visibility.
    pub fn on_scroll(&mut self, offset: Px, now: Instant) {
        let offset = self.reconcile(offset);
        self.scroll.record_scroll(offset, now);
        self.check_edges();
    }

    /// Tells the strip the host applied every scroll request handed out so
    /// far. Hosts that apply requests synchronously inside their frame can
    /// call this after each [`tick`](Self::tick).
    pub fn acknowledge_scroll(&mut self) {
        if matches!(self.phase, GrowthPhase::AwaitingCompensation { .. }) {
            trace!("host acknowledged prepend compensation");
            self.phase = GrowthPhase::Idle;
        }
    }

    /// Explicit near-start signal from the host.
    pub fn on_start_reached(&mut self) {
        self.stage_backward();
    }

    /// Explicit end-reached signal from the host.
    pub fn on_end_reached(&mut self) {
        self.stage_forward();
    }

    /// Records the offset the scroll view came to rest at and samples the
    /// viewport. Returns the month reported to `on_month_change`, if any.
    pub fn scroll_settled(&mut self, offset: Px) -> Option<MonthYear> {
        let offset = self.reconcile(offset);
        self.settle(offset)
    }

    /// Settles at `offset` and selects the cell nearest to it.
    pub fn momentum_end(&mut self, offset: Px) -> MomentumEnd {
        let month = self.scroll_settled(offset);
        let window = self.store.window();
        let selected = self
            .anchor
            .index_at_offset(self.scroll.offset(), window.len())
            .and_then(|index| window.get(index))
            .map(DateCell::date);
        if let Some(date) = selected {
            self.select(date);
        }
        MomentumEnd { selected, month }
    }

    /// Selects the cell at `index`. Does not scroll.
    pub fn tap(&mut self, index: usize) -> Option<NaiveDate> {
        let Some(date) = self.store.window().get(index).map(DateCell::date) else {
            trace!(index, len = self.store.window().len(), "tap outside the window ignored");
            return None;
        };
        self.select(date);
        Some(date)
    }

    /// Runs one frame: executes a queued handle command, settles if scrolling
    /// has been quiet for the settle delay, and commits staged growth.
    pub fn tick(&mut self, now: Instant) -> FrameUpdate {
        if let Some(command) = self.handle.take() {
            self.run(command);
        }
        let month = if self.scroll.idle_for(now, self.args.settle_delay) {
            let offset = self.scroll.offset();
            self.settle(offset)
        } else {
            None
        };
        self.commit();
        FrameUpdate {
            window_changed: std::mem::take(&mut self.window_changed),
            month,
            scroll: self.scroll.take_requests(),
        }
    }

    /// Installs staged growth. Returns whether the window changed.
    ///
    /// A prepend moves the offset by the inserted width and queues the
    /// matching instantaneous jump in the same step.
    pub fn commit(&mut self) -> bool {
        match std::mem::take(&mut self.phase) {
            GrowthPhase::Idle => false,
            awaiting @ GrowthPhase::AwaitingCompensation { .. } => {
                self.phase = awaiting;
                false
            }
            GrowthPhase::GrowingBackward(Prepend {
                window,
                prepended_count,
            }) => {
                self.install(window, prepended_count);
                true
            }
            GrowthPhase::GrowingForward(window) => {
                self.install(window, 0);
                true
            }
        }
    }

    /// Scrolls to today with animation, growing the window first if needed.
    pub fn go_to_today(&mut self) -> Result<ScrollRequest, DateStripError> {
        let today = self.today();
        self.go_to_date(today)
    }

    /// Scrolls to `date` with animation, growing the window first if needed.
    pub fn go_to_date(&mut self, date: NaiveDate) -> Result<ScrollRequest, DateStripError> {
        self.commit();
        let coverage = self.store.ensure_contains(date)?;
        if coverage.prepended_count > 0 || coverage.appended_count > 0 {
            debug!(
                %date,
                prepended = coverage.prepended_count,
                appended = coverage.appended_count,
                "grew window to reach navigation target"
            );
            self.install(coverage.window, coverage.prepended_count);
        }
        let index = ScrollAnchor::index_of(self.store.window(), date)
            .ok_or(DateStripError::DateOutOfRange { date })?;
        let request = self.anchor.scroll_to_index(index, true);
        self.scroll.request(request);
        debug!(%date, index, offset = request.offset.raw(), "scrolling to date");
        Ok(request)
    }

    /// The cells to instantiate: everything at least partly on screen plus
    /// `overscan` cells on each side.
    pub fn render_plan(&self) -> RenderPlan {
        let window = self.store.window();
        let len = window.len();
        let offset = self.scroll.offset();
        let visible = visible_range(
            offset,
            self.scroll.viewport_width(),
            self.anchor.cell_width(),
            f32::EPSILON,
            len,
        );
        // Before the first layout the viewport width is unknown.
        let base = if visible.is_empty() {
            self.anchor
                .index_at_offset(offset, len)
                .map_or(0..0, |index| index..index + 1)
        } else {
            visible.clone()
        };
        let range = render_range(base, self.args.overscan, len);
        let today = self.today();
        let items = window
            .slice(range.clone())
            .iter()
            .zip(range)
            .map(|(cell, index)| RenderItem {
                index,
                cell: *cell,
                offset: self.anchor.offset_for_index(index),
                selected: cell.date() == self.selected,
                today: cell.date() == today,
                month_start: cell.is_first_of_month(),
            })
            .collect();
        RenderPlan {
            items,
            visible,
            content_width: self.scroll.content_width(),
            offset,
        }
    }

    fn run(&mut self, command: StripCommand) {
        let result = match command {
            StripCommand::GoToToday => self.go_to_today(),
            StripCommand::GoToDate(date) => self.go_to_date(date),
        };
        if let Err(err) = result {
            warn!(%err, ?command, "navigation failed");
        }
    }

    fn settle(&mut self, offset: Px) -> Option<MonthYear> {
        self.scroll.settle_at(offset);
        self.check_edges();
        self.sample()
    }

    /// Maps an offset reported by the host into the committed window.
    ///
    /// While a prepend jump is outstanding, offsets nearer the
    /// pre-compensation position than the compensated one predate the jump
    /// and are shifted by the inserted width. The first offset past that
    /// midpoint ends the wait.
    fn reconcile(&mut self, offset: Px) -> Px {
        let GrowthPhase::AwaitingCompensation { expected, shift } = self.phase else {
            return offset;
        };
        if offset >= expected.saturating_sub(shift / 2) {
            trace!(offset = offset.raw(), "host caught up with prepend compensation");
            self.phase = GrowthPhase::Idle;
            offset
        } else {
            trace!(
                offset = offset.raw(),
                shift = shift.raw(),
                "shifting scroll frame reported before the compensation jump"
            );
            offset.saturating_add(shift)
        }
    }

    fn select(&mut self, date: NaiveDate) {
        debug!(%date, "date selected");
        self.selected = date;
        self.args.on_select_date.call(date);
    }

    fn sample(&mut self) -> Option<MonthYear> {
        let window = self.store.window();
        let visible = visible_range(
            self.scroll.offset(),
            self.scroll.viewport_width(),
            self.anchor.cell_width(),
            self.args.visibility_threshold,
            window.len(),
        );
        let month = self.observer.observe(window, visible)?;
        debug!(%month, "visible month changed");
        self.args.on_month_change.call(month);
        Some(month)
    }

    fn near_start(&self) -> bool {
        self.scroll.offset() <= self.args.resolved_near_start_threshold()
    }

    fn near_end(&self) -> bool {
        let content = self.scroll.content_width();
        if content <= Px::ZERO {
            return false;
        }
        let viewport_end = self
            .scroll
            .offset()
            .saturating_add(self.scroll.viewport_width());
        let trigger = content.saturating_sub(content.mul_f32(self.args.end_reached_threshold));
        viewport_end >= trigger
    }

    fn check_edges(&mut self) {
        if self.near_start() {
            self.stage_backward();
        } else if self.near_end() {
            self.stage_forward();
        }
    }

    fn stage_backward(&mut self) {
        if !self.phase.is_idle() {
            trace!(phase = self.phase.name(), "start edge ignored while growth is staged");
            return;
        }
        match self.store.grow_backward(self.args.grow_months) {
            Ok(prepend) => {
                debug!(prepended = prepend.prepended_count, "staged backward growth");
                self.phase = GrowthPhase::GrowingBackward(prepend);
            }
            Err(err) => warn!(%err, "backward growth failed"),
        }
    }

    fn stage_forward(&mut self) {
        if !self.phase.is_idle() {
            trace!(phase = self.phase.name(), "end edge ignored while growth is staged");
            return;
        }
        match self.store.grow_forward(self.args.grow_months) {
            Ok(window) => {
                debug!(
                    appended = window.len() - self.store.window().len(),
                    "staged forward growth"
                );
                self.phase = GrowthPhase::GrowingForward(window);
            }
            Err(err) => warn!(%err, "forward growth failed"),
        }
    }

    fn install(&mut self, window: DateWindow, prepended_count: usize) {
        if let Err(err) = self.store.replace(window) {
            self.recover(err);
            return;
        }
        let len = self.store.window().len();
        self.scroll.set_content_width(self.anchor.content_width(len));
        if prepended_count > 0 {
            let delta = self.anchor.compensate_for_prepend(prepended_count);
            let index = self
                .anchor
                .index_at_offset(self.scroll.offset().saturating_add(delta), len)
                .unwrap_or(0);
            let jump = self.scroll.compensate(prepended_count, delta, index);
            self.observer.shift(prepended_count);
            let shift = match self.phase {
                GrowthPhase::AwaitingCompensation { shift, .. } => shift.saturating_add(delta),
                _ => delta,
            };
            self.phase = GrowthPhase::AwaitingCompensation {
                expected: jump.offset,
                shift,
            };
            debug!(
                prepended_count,
                offset = jump.offset.raw(),
                "compensated offset for prepend"
            );
        }
        self.window_changed = true;
    }

    fn recover(&mut self, err: DateStripError) {
        warn!(%err, selected = %self.selected, "discarding malformed date window");
        let store = match DateWindowStore::initialize(
            self.selected,
            self.args.months_before,
            self.args.months_after,
        ) {
            Ok(store) => store,
            Err(err) => {
                warn!(%err, "could not rebuild date window; keeping the previous one");
                return;
            }
        };
        self.store = store;
        self.phase = GrowthPhase::Idle;
        let len = self.store.window().len();
        self.scroll.set_content_width(self.anchor.content_width(len));
        let index = ScrollAnchor::index_of(self.store.window(), self.selected).unwrap_or(0);
        self.scroll.request(self.anchor.scroll_to_index(index, false));
        self.observer.reset(self.observer.current());
        self.window_changed = true;
    }
}

impl std::fmt::Debug for DateStripController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateStripController")
            .field("len", &self.store.window().len())
            .field("phase", &self.phase.name())
            .field("offset", &self.scroll.offset())
            .field("selected", &self.selected)
            .field("month", &self.observer.current())
            .finish()
    }
}
