//! Physical pixel values for strip geometry.
//!
//! Every length the date strip deals with (cell width, scroll offset,
//! viewport width) is a whole number of physical pixels. Offsets grow to the
//! right: offset zero shows the first materialized cell at the leading edge.
//!
//! # Example
//!
//! ```
//! use dayline::px::Px;
//!
//! let cell = Px::new(60);
//! let offset = cell * 3;
//! assert_eq!(offset, Px(180));
//! assert_eq!(offset.saturating_sub(Px(200)), Px(-20));
//! ```

use std::ops::Neg;

/// A physical pixel value.
///
/// Negative values are allowed so that scroll deltas and overscroll can be
/// represented; arithmetic on strip lengths goes through the saturating
/// helpers so a very long session cannot overflow.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Px(pub i32);

impl Px {
    /// A constant representing zero pixels.
    pub const ZERO: Self = Self(0);

    /// Returns the raw i32 value.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Creates a new `Px` instance from an i32 value.
    pub const fn new(value: i32) -> Self {
        Px(value)
    }

    /// Creates a `Px` from an f32 value, saturating at the numeric bounds
    /// instead of overflowing. NaN maps to zero.
    ///
    /// ```
    /// use dayline::px::Px;
    ///
    /// assert_eq!(Px::saturating_from_f32(42.7), Px(42));
    /// assert_eq!(Px::saturating_from_f32(f32::MAX), Px(i32::MAX));
    /// ```
    pub fn saturating_from_f32(value: f32) -> Self {
        if value.is_nan() {
            return Px::ZERO;
        }
        let clamped_value = value.clamp(i32::MIN as f32, i32::MAX as f32);
        Px(clamped_value as i32)
    }

    /// Saturating integer addition.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Px(self.0.saturating_add(rhs.0))
    }

    /// Saturating integer subtraction.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Px(self.0.saturating_sub(rhs.0))
    }

    /// Multiplies by an item count, saturating at the numeric bounds.
    ///
    /// This is how cell counts become strip lengths.
    ///
    /// ```
    /// use dayline::px::Px;
    ///
    /// assert_eq!(Px(60).saturating_mul_count(31), Px(1860));
    /// assert_eq!(Px(i32::MAX).saturating_mul_count(2), Px(i32::MAX));
    /// ```
    pub fn saturating_mul_count(self, count: usize) -> Self {
        if count == 0 {
            return Px::ZERO;
        }
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        let product = i64::from(self.0).saturating_mul(count);
        px_from_i64(product)
    }

    /// Multiplies the pixel value by a scalar f32, saturating.
    pub fn mul_f32(self, rhs: f32) -> Self {
        Px::saturating_from_f32(self.0 as f32 * rhs)
    }
}

pub(crate) fn px_from_i64(value: i64) -> Px {
    if value > i64::from(i32::MAX) {
        Px(i32::MAX)
    } else if value < i64::from(i32::MIN) {
        Px(i32::MIN)
    } else {
        Px(value as i32)
    }
}

impl std::ops::Add for Px {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Px(self.0 + rhs.0)
    }
}

impl Neg for Px {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Px::new(-self.0)
    }
}

impl std::ops::Sub for Px {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Px(self.0 - rhs.0)
    }
}

impl std::ops::Mul<i32> for Px {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self::Output {
        Px(self.0 * rhs)
    }
}

impl std::ops::Div<i32> for Px {
    type Output = Self;

    fn div(self, rhs: i32) -> Self::Output {
        Px(self.0 / rhs)
    }
}
