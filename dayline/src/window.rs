//! The materialized run of days and the operations that grow it.
//!
//! A [`DateWindow`] always starts on the first day of a month and ends on the
//! last day of a month, and every growth step adds whole months at one end.
//! Growth never removes cells. Each step builds a fresh window and leaves the
//! old one untouched, so a host can keep rendering the previous window until
//! the controller commits the new one.

use std::{ops::Range, sync::Arc};

use chrono::NaiveDate;
use tracing::debug;

use crate::{
    calendar::{self, DateCell},
    error::DateStripError,
};

/// An ordered, gap-free, duplicate-free sequence of day cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    cells: Arc<[DateCell]>,
}

/// Result of a backward growth: the new window and how many cells were
/// inserted in front of the old first cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepend {
    /// The grown window.
    pub window: DateWindow,
    /// Number of cells inserted before the previous first cell.
    pub prepended_count: usize,
}

/// Result of growing a window until it covers a target date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    /// The window covering the target.
    pub window: DateWindow,
    /// Cells inserted at the front. Existing indices shift by this amount.
    pub prepended_count: usize,
    /// Cells appended at the back.
    pub appended_count: usize,
}

impl DateWindow {
    pub(crate) fn from_cells(cells: Vec<DateCell>) -> Self {
        Self {
            cells: cells.into(),
        }
    }

    /// Builds the initial window: from the first day of the month
    /// `months_before` months before the anchor's month through the last day
    /// of the month `months_after` months after it.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use dayline::window::DateWindow;
    ///
    /// let anchor = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let window = DateWindow::initialize(anchor, 1, 2).unwrap();
    /// assert_eq!(window.first().unwrap().iso(), "2024-02-01");
    /// assert_eq!(window.last().unwrap().iso(), "2024-05-31");
    /// ```
    pub fn initialize(
        anchor: NaiveDate,
        months_before: u32,
        months_after: u32,
    ) -> Result<Self, DateStripError> {
        let before = i32::try_from(months_before)
            .map_err(|_| DateStripError::invalid("months_before", "too large"))?;
        let after = i32::try_from(months_after)
            .map_err(|_| DateStripError::invalid("months_after", "too large"))?;
        let first = calendar::shift_months(anchor, -before)?;
        let last = calendar::last_of_month(calendar::shift_months(anchor, after)?)?;
        let window = Self::from_cells(calendar::day_cells(first, last));
        debug!(
            %anchor,
            first = %first,
            last = %last,
            len = window.len(),
            "initialized date window"
        );
        Ok(window)
    }

    /// Number of materialized cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the window holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell at `index`.
    pub fn get(&self, index: usize) -> Option<&DateCell> {
        self.cells.get(index)
    }

    /// The earliest materialized cell.
    pub fn first(&self) -> Option<&DateCell> {
        self.cells.first()
    }

    /// The latest materialized cell.
    pub fn last(&self) -> Option<&DateCell> {
        self.cells.last()
    }

    /// All cells in date order.
    pub fn cells(&self) -> &[DateCell] {
        &self.cells
    }

    /// Cells in the given index range, clamped to the window.
    pub fn slice(&self, range: Range<usize>) -> &[DateCell] {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        &self.cells[start..end]
    }

    /// Whether `date` is materialized.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => first.date() <= date && date <= last.date(),
            _ => false,
        }
    }

    /// Checks that every neighbouring pair is exactly one day apart.
    pub fn validate(&self) -> Result<(), DateStripError> {
        for (offset, pair) in self.cells.windows(2).enumerate() {
            if pair[1].key() != pair[0].key() + 1 {
                return Err(DateStripError::ContiguityViolation {
                    index: offset + 1,
                    previous: pair[0].date(),
                    next: pair[1].date(),
                });
            }
        }
        Ok(())
    }

    fn bounds(&self) -> Result<(NaiveDate, NaiveDate), DateStripError> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Ok((first.date(), last.date())),
            _ => Err(DateStripError::EmptyWindow),
        }
    }

    /// Prepends the `months` whole calendar months immediately preceding the
    /// first cell.
    pub fn grow_backward(&self, months: u32) -> Result<Prepend, DateStripError> {
        let (first, _) = self.bounds()?;
        if months == 0 {
            return Ok(Prepend {
                window: self.clone(),
                prepended_count: 0,
            });
        }
        let months = i32::try_from(months)
            .map_err(|_| DateStripError::DateOutOfRange { date: first })?;
        let start = calendar::shift_months(first, -months)?;
        let end = first
            .pred_opt()
            .ok_or(DateStripError::DateOutOfRange { date: first })?;
        let block = calendar::day_cells(start, end);
        let prepended_count = block.len();

        let mut cells = Vec::with_capacity(prepended_count + self.len());
        cells.extend(block);
        cells.extend_from_slice(&self.cells);
        debug!(prepended_count, new_first = %start, "grew date window backward");
        Ok(Prepend {
            window: Self::from_cells(cells),
            prepended_count,
        })
    }

    /// Appends the `months` whole calendar months immediately following the
    /// last cell.
    pub fn grow_forward(&self, months: u32) -> Result<DateWindow, DateStripError> {
        let (_, last) = self.bounds()?;
        if months == 0 {
            return Ok(self.clone());
        }
        let start = last
            .succ_opt()
            .ok_or(DateStripError::DateOutOfRange { date: last })?;
        let block = calendar::month_span(start, months)?;
        let appended = block.len();

        let mut cells = Vec::with_capacity(self.len() + appended);
        cells.extend_from_slice(&self.cells);
        cells.extend(block);
        debug!(appended, new_last = %cells[cells.len() - 1], "grew date window forward");
        Ok(Self::from_cells(cells))
    }

    /// Grows the window in whole months until `target` is materialized.
    ///
    /// Returns the unchanged window when the target is already covered.
    pub fn ensure_contains(&self, target: NaiveDate) -> Result<Coverage, DateStripError> {
        let (first, last) = self.bounds()?;
        if target < first {
            let months = calendar::months_between(target, first).unsigned_abs();
            let prepend = self.grow_backward(months)?;
            return Ok(Coverage {
                window: prepend.window,
                prepended_count: prepend.prepended_count,
                appended_count: 0,
            });
        }
        if target > last {
            let months = calendar::months_between(last, target).unsigned_abs();
            let window = self.grow_forward(months)?;
            let appended_count = window.len() - self.len();
            return Ok(Coverage {
                window,
                prepended_count: 0,
                appended_count,
            });
        }
        Ok(Coverage {
            window: self.clone(),
            prepended_count: 0,
            appended_count: 0,
        })
    }
}

/// Owns the committed window of one strip instance.
///
/// Growth is computed against the committed window and only replaces it
/// through [`DateWindowStore::replace`], which refuses windows that fail
/// validation.
#[derive(Debug, Clone)]
pub struct DateWindowStore {
    window: DateWindow,
}

impl DateWindowStore {
    /// Creates a store holding the initial window around `anchor`.
    pub fn initialize(
        anchor: NaiveDate,
        months_before: u32,
        months_after: u32,
    ) -> Result<Self, DateStripError> {
        Ok(Self {
            window: DateWindow::initialize(anchor, months_before, months_after)?,
        })
    }

    /// The committed window.
    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    /// Computes a backward growth without committing it.
    pub fn grow_backward(&self, months: u32) -> Result<Prepend, DateStripError> {
        self.window.grow_backward(months)
    }

    /// Computes a forward growth without committing it.
    pub fn grow_forward(&self, months: u32) -> Result<DateWindow, DateStripError> {
        self.window.grow_forward(months)
    }

    /// Computes the growth needed to cover `target` without committing it.
    pub fn ensure_contains(&self, target: NaiveDate) -> Result<Coverage, DateStripError> {
        self.window.ensure_contains(target)
    }

    /// Replaces the committed window after validating it.
    ///
    /// On a contiguity violation the committed window is left unchanged.
    pub fn replace(&mut self, window: DateWindow) -> Result<(), DateStripError> {
        window.validate()?;
        self.window = window;
        Ok(())
    }
}
