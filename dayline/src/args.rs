//! Construction arguments for a date strip.
//!
//! ## Usage
//!
//! Start from [`DateStripArgs::default`] and override fields with the
//! generated setters, then hand the args to
//! [`DateStripController::new`](crate::controller::DateStripController::new).
//!
//! ```
//! use chrono::NaiveDate;
//! use dayline::{args::DateStripArgs, px::Px};
//!
//! let args = DateStripArgs::default()
//!     .anchor(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
//!     .months_after(3)
//!     .cell_width(Px(52));
//! assert!(args.validate().is_ok());
//! ```

use std::time::Duration;

use chrono::{Local, NaiveDate};
use derive_setters::Setters;

use crate::{calendar::MonthYear, error::DateStripError, prop::CallbackWith, px::Px};

const DEFAULT_MONTHS_BEFORE: u32 = 1;
const DEFAULT_MONTHS_AFTER: u32 = 2;
const DEFAULT_GROW_MONTHS: u32 = 1;
const DEFAULT_CELL_WIDTH: Px = Px(60);
const DEFAULT_VISIBILITY_THRESHOLD: f32 = 0.5;
const DEFAULT_END_REACHED_THRESHOLD: f32 = 0.3;
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(120);
const DEFAULT_OVERSCAN: usize = 2;

/// Arguments for a date strip.
#[derive(Clone, Setters)]
pub struct DateStripArgs {
    /// Date the initial window is built around. `None` uses today.
    #[setters(strip_option)]
    pub anchor: Option<NaiveDate>,
    /// Whole months materialized before the anchor's month.
    pub months_before: u32,
    /// Whole months materialized after the anchor's month.
    pub months_after: u32,
    /// Whole months added per growth step at either edge.
    pub grow_months: u32,
    /// Fixed width of every day cell.
    pub cell_width: Px,
    /// Fraction of a cell that must be on screen to count as visible.
    pub visibility_threshold: f32,
    /// Trailing fraction of the window that fires end-reached when the
    /// viewport's end enters it.
    pub end_reached_threshold: f32,
    /// Offset at or below which backward growth is triggered. `None` means
    /// one cell width.
    #[setters(strip_option)]
    pub near_start_threshold: Option<Px>,
    /// Quiet time after the last scroll frame before the position counts as
    /// settled.
    pub settle_delay: Duration,
    /// Consecutive settled samples a new month needs before it is reported.
    pub month_hysteresis: usize,
    /// Extra cells instantiated before/after the visible ones.
    pub overscan: usize,
    /// Invoked when a tap or a momentum stop selects a date.
    #[setters(skip)]
    pub on_select_date: CallbackWith<NaiveDate>,
    /// Invoked when the leftmost visible month changes.
    #[setters(skip)]
    pub on_month_change: CallbackWith<MonthYear>,
    /// Source of "today".
    #[setters(skip)]
    pub today: CallbackWith<(), NaiveDate>,
}

impl Default for DateStripArgs {
    fn default() -> Self {
        Self {
            anchor: None,
            months_before: DEFAULT_MONTHS_BEFORE,
            months_after: DEFAULT_MONTHS_AFTER,
            grow_months: DEFAULT_GROW_MONTHS,
            cell_width: DEFAULT_CELL_WIDTH,
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            end_reached_threshold: DEFAULT_END_REACHED_THRESHOLD,
            near_start_threshold: None,
            settle_delay: DEFAULT_SETTLE_DELAY,
            month_hysteresis: 1,
            overscan: DEFAULT_OVERSCAN,
            on_select_date: CallbackWith::noop(),
            on_month_change: CallbackWith::noop(),
            today: CallbackWith::new(|()| Local::now().date_naive()),
        }
    }
}

impl DateStripArgs {
    /// Sets the selection handler.
    pub fn on_select_date<F>(mut self, handler: F) -> Self
    where
        F: Fn(NaiveDate) + Send + Sync + 'static,
    {
        self.on_select_date = CallbackWith::new(handler);
        self
    }

    /// Sets the month header handler.
    pub fn on_month_change<F>(mut self, handler: F) -> Self
    where
        F: Fn(MonthYear) + Send + Sync + 'static,
    {
        self.on_month_change = CallbackWith::new(handler);
        self
    }

    /// Replaces the source of "today", e.g. with a fixed date in tests.
    pub fn today_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.today = CallbackWith::new(move |()| provider());
        self
    }

    /// Offset that triggers backward growth.
    pub fn resolved_near_start_threshold(&self) -> Px {
        self.near_start_threshold.unwrap_or(self.cell_width)
    }

    /// Checks every field against its accepted range.
    pub fn validate(&self) -> Result<(), DateStripError> {
        if self.cell_width <= Px::ZERO {
            return Err(DateStripError::invalid("cell_width", "must be positive"));
        }
        if !(self.visibility_threshold > 0.0 && self.visibility_threshold <= 1.0) {
            return Err(DateStripError::invalid(
                "visibility_threshold",
                format!("{} is outside (0, 1]", self.visibility_threshold),
            ));
        }
        if !(self.end_reached_threshold > 0.0 && self.end_reached_threshold <= 1.0) {
            return Err(DateStripError::invalid(
                "end_reached_threshold",
                format!("{} is outside (0, 1]", self.end_reached_threshold),
            ));
        }
        if self.grow_months == 0 {
            return Err(DateStripError::invalid("grow_months", "must be at least 1"));
        }
        if self.month_hysteresis == 0 {
            return Err(DateStripError::invalid(
                "month_hysteresis",
                "must be at least 1",
            ));
        }
        if let Some(threshold) = self.near_start_threshold
            && threshold < Px::ZERO
        {
            return Err(DateStripError::invalid(
                "near_start_threshold",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

/// The plain-data part of [`DateStripArgs`], suitable for config files.
///
/// Missing fields take the same defaults as [`DateStripArgs::default`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DateStripConfig {
    /// See [`DateStripArgs::anchor`].
    pub anchor: Option<NaiveDate>,
    /// See [`DateStripArgs::months_before`].
    pub months_before: u32,
    /// See [`DateStripArgs::months_after`].
    pub months_after: u32,
    /// See [`DateStripArgs::grow_months`].
    pub grow_months: u32,
    /// Cell width in physical pixels.
    pub cell_width: i32,
    /// See [`DateStripArgs::visibility_threshold`].
    pub visibility_threshold: f32,
    /// See [`DateStripArgs::end_reached_threshold`].
    pub end_reached_threshold: f32,
    /// Near-start threshold in physical pixels.
    pub near_start_threshold: Option<i32>,
    /// Settle delay in milliseconds.
    pub settle_delay_ms: u64,
    /// See [`DateStripArgs::month_hysteresis`].
    pub month_hysteresis: usize,
    /// See [`DateStripArgs::overscan`].
    pub overscan: usize,
}

impl Default for DateStripConfig {
    fn default() -> Self {
        Self {
            anchor: None,
            months_before: DEFAULT_MONTHS_BEFORE,
            months_after: DEFAULT_MONTHS_AFTER,
            grow_months: DEFAULT_GROW_MONTHS,
            cell_width: DEFAULT_CELL_WIDTH.raw(),
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            end_reached_threshold: DEFAULT_END_REACHED_THRESHOLD,
            near_start_threshold: None,
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            month_hysteresis: 1,
            overscan: DEFAULT_OVERSCAN,
        }
    }
}

impl DateStripConfig {
    /// Applies this config on top of `args`, keeping its callbacks.
    pub fn apply(&self, args: DateStripArgs) -> DateStripArgs {
        DateStripArgs {
            anchor: self.anchor.or(args.anchor),
            months_before: self.months_before,
            months_after: self.months_after,
            grow_months: self.grow_months,
            cell_width: Px(self.cell_width),
            visibility_threshold: self.visibility_threshold,
            end_reached_threshold: self.end_reached_threshold,
            near_start_threshold: self.near_start_threshold.map(Px),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            month_hysteresis: self.month_hysteresis,
            overscan: self.overscan,
            ..args
        }
    }
}

impl From<DateStripConfig> for DateStripArgs {
    fn from(config: DateStripConfig) -> Self {
        config.apply(DateStripArgs::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let args = DateStripArgs::default();
        assert_eq!(args.months_before, 1);
        assert_eq!(args.months_after, 2);
        assert_eq!(args.visibility_threshold, 0.5);
        assert_eq!(args.end_reached_threshold, 0.3);
        assert_eq!(args.resolved_near_start_threshold(), args.cell_width);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_fields() {
        let cases = [
            ("cell_width", DateStripArgs::default().cell_width(Px(0))),
            (
                "visibility_threshold",
                DateStripArgs::default().visibility_threshold(0.0),
            ),
            (
                "visibility_threshold",
                DateStripArgs::default().visibility_threshold(f32::NAN),
            ),
            (
                "end_reached_threshold",
                DateStripArgs::default().end_reached_threshold(1.5),
            ),
            ("grow_months", DateStripArgs::default().grow_months(0)),
            ("month_hysteresis", DateStripArgs::default().month_hysteresis(0)),
            (
                "near_start_threshold",
                DateStripArgs::default().near_start_threshold(Px(-1)),
            ),
        ];
        for (field, args) in cases {
            match args.validate() {
                Err(DateStripError::InvalidArgs { field: got, .. }) => assert_eq!(got, field),
                other => panic!("expected {field} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn config_overrides_plain_fields_and_keeps_callbacks() {
        let fixed = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let base = DateStripArgs::default().today_provider(move || fixed);
        let today = base.today.clone();
        let config = DateStripConfig {
            cell_width: 44,
            settle_delay_ms: 250,
            near_start_threshold: Some(10),
            ..DateStripConfig::default()
        };
        let args = config.apply(base);
        assert_eq!(args.cell_width, Px(44));
        assert_eq!(args.settle_delay, Duration::from_millis(250));
        assert_eq!(args.resolved_near_start_threshold(), Px(10));
        assert!(args.today == today);
        assert_eq!(args.today.call(()), fixed);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_deserializes_with_defaults() {
        let config: DateStripConfig =
            serde_json::from_str(r#"{ "anchor": "2024-03-15", "months_after": 4 }"#).unwrap();
        assert_eq!(config.anchor, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(config.months_after, 4);
        assert_eq!(config.months_before, 1);
        assert_eq!(config.cell_width, 60);
    }
}
