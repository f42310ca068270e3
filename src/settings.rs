//! Histogram bin geometry and its validating constructors.
//!
//! [`HistogramSettings`] is the immutable description of a binning policy:
//! where the first bin starts, how wide bins are, how many there are, and
//! whether out-of-range samples are clamped to the boundary bins or dropped.
//!
//! Settings are produced by one of two construction styles:
//!
//! - [`HistogramSettings::from_bins`] — explicit `(start, count, width)`.
//! - [`HistogramSettings::from_range`] — a `[min, max]` range sized by
//!   either [`FromRange::bin_count`] or [`FromRange::bin_width`].
//!
//! Both styles accept modifiers that are resolved exactly once in `build()`;
//! the resulting value never changes afterwards and is cheap to copy around.

use serde::{Deserialize, Serialize};

// =============================================================================
// Errors
// =============================================================================

/// Validation failures raised when resolving histogram settings.
///
/// All variants are configuration errors: they are reported synchronously by
/// `build()` and retrying with the same arguments cannot succeed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    /// The bin count was zero.
    #[error("bin count must be >= 1")]
    ZeroBinCount,

    /// The bin width was zero, negative, or NaN.
    #[error("bin width must be > 0, got {0}")]
    NonPositiveBinWidth(f64),

    /// The range did not satisfy `max > min`.
    #[error("histogram range must satisfy max > min, got [{min}, {max}]")]
    EmptyRange { min: f64, max: f64 },

    /// Range-style construction without `bin_count` or `bin_width`.
    #[error("range construction needs exactly one of bin_count or bin_width")]
    MissingRangeSizing,

    /// Range-style construction with both `bin_count` and `bin_width`.
    #[error("bin_count and bin_width are mutually exclusive")]
    ConflictingRangeSizing,

    /// `integer_bins` over a range needs at least two bins to define the grid.
    #[error("integer bins over a range need a bin count >= 2, got {0}")]
    TooFewIntegerBins(usize),
}

// =============================================================================
// HistogramSettings
// =============================================================================

/// Immutable bin geometry shared by accumulators and average histograms.
///
/// Invariants (enforced at construction): `bin_width > 0`, `bin_count >= 1`,
/// and therefore `last_edge() > first_edge()`.
///
/// Bin `i` covers the half-open interval
/// `[first_edge + i*bin_width, first_edge + (i+1)*bin_width)`.
///
/// # Example
///
/// ```
/// use framehist::HistogramSettings;
///
/// let settings = HistogramSettings::from_range(1.0, 4.0).bin_count(6).build()?;
/// assert_eq!(settings.bin_count(), 6);
/// assert_eq!(settings.bin_width(), 0.5);
/// assert_eq!(settings.find_bin(1.7), Some(1));
/// assert_eq!(settings.find_bin(4.5), None);
/// # Ok::<(), framehist::SettingsError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistogramSettings {
    /// Left edge of bin 0.
    first_edge: f64,

    /// Width of every bin.
    bin_width: f64,

    /// Number of bins.
    bin_count: usize,

    /// Clamp out-of-range samples to the boundary bins instead of dropping.
    include_all: bool,
}

impl HistogramSettings {
    /// Start explicit-bins construction: `count` bins of `width` from `start`.
    pub fn from_bins(start: f64, bin_count: usize, bin_width: f64) -> FromBins {
        FromBins {
            start,
            bin_count,
            bin_width,
            integer_bins: false,
            include_all: false,
        }
    }

    /// Start range construction over `[min, max]`.
    ///
    /// The range must be sized with exactly one of [`FromRange::bin_count`]
    /// or [`FromRange::bin_width`] before `build()`.
    pub fn from_range(min: f64, max: f64) -> FromRange {
        FromRange {
            min,
            max,
            bin_count: None,
            bin_width: None,
            integer_bins: false,
            round_range: false,
            include_all: false,
        }
    }

    /// Left edge of the first bin.
    #[inline]
    pub fn first_edge(&self) -> f64 {
        self.first_edge
    }

    /// Right edge of the last bin: `first_edge + bin_count * bin_width`.
    #[inline]
    pub fn last_edge(&self) -> f64 {
        self.first_edge + self.bin_count as f64 * self.bin_width
    }

    /// Width of every bin.
    #[inline]
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Number of bins.
    #[inline]
    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    /// Whether out-of-range samples are clamped to the boundary bins.
    #[inline]
    pub fn include_all(&self) -> bool {
        self.include_all
    }

    /// Center of bin `index`.
    #[inline]
    pub fn bin_center(&self, index: usize) -> f64 {
        self.first_edge + (index as f64 + 0.5) * self.bin_width
    }

    /// Geometry with double the bin width and half the bins (rounding up),
    /// optionally re-aligned so bin centers fall on the original grid.
    ///
    /// Used when resampling an averaged histogram into coarser bins; the
    /// out-of-range policy is carried over.
    pub fn with_double_bin_width(&self, integer_bins: bool) -> HistogramSettings {
        let bin_width = self.bin_width * 2.0;
        let mut first_edge = self.first_edge;
        if integer_bins {
            first_edge -= 0.5 * bin_width;
        }
        HistogramSettings {
            first_edge,
            bin_width,
            bin_count: self.bin_count.div_ceil(2),
            include_all: self.include_all,
        }
    }

    /// Map a sample value to a bin index.
    ///
    /// Returns `None` for NaN samples and for out-of-range samples unless
    /// `include_all` is set, in which case out-of-range samples are clamped
    /// to bin `0` or `bin_count - 1`. Dropping a sample is binning policy,
    /// not an error.
    #[inline]
    pub fn find_bin(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        if value < self.first_edge {
            return self.include_all.then_some(0);
        }
        let bin = ((value - self.first_edge) / self.bin_width) as usize;
        if bin >= self.bin_count {
            self.include_all.then_some(self.bin_count - 1)
        } else {
            Some(bin)
        }
    }
}

// =============================================================================
// FromBins
// =============================================================================

/// Builder for explicit-bins construction. See [`HistogramSettings::from_bins`].
#[derive(Clone, Copy, Debug)]
pub struct FromBins {
    start: f64,
    bin_count: usize,
    bin_width: f64,
    integer_bins: bool,
    include_all: bool,
}

impl FromBins {
    /// Shift the grid down by half a bin so bin centers land on the
    /// original `start + i * width` positions.
    pub fn integer_bins(mut self) -> Self {
        self.integer_bins = true;
        self
    }

    /// Clamp out-of-range samples to the boundary bins instead of dropping.
    pub fn include_all(mut self) -> Self {
        self.include_all = true;
        self
    }

    /// Validate and resolve the settings.
    pub fn build(self) -> Result<HistogramSettings, SettingsError> {
        if self.bin_count < 1 {
            return Err(SettingsError::ZeroBinCount);
        }
        if !(self.bin_width > 0.0) {
            return Err(SettingsError::NonPositiveBinWidth(self.bin_width));
        }
        let mut first_edge = self.start;
        if self.integer_bins {
            first_edge -= 0.5 * self.bin_width;
        }
        Ok(HistogramSettings {
            first_edge,
            bin_width: self.bin_width,
            bin_count: self.bin_count,
            include_all: self.include_all,
        })
    }
}

// =============================================================================
// FromRange
// =============================================================================

/// Builder for range construction. See [`HistogramSettings::from_range`].
#[derive(Clone, Copy, Debug)]
pub struct FromRange {
    min: f64,
    max: f64,
    bin_count: Option<usize>,
    bin_width: Option<f64>,
    integer_bins: bool,
    round_range: bool,
    include_all: bool,
}

impl FromRange {
    /// Size the range into `count` bins; the width follows from the range.
    pub fn bin_count(mut self, count: usize) -> Self {
        self.bin_count = Some(count);
        self
    }

    /// Size the range with bins of `width`; the count follows from the range.
    pub fn bin_width(mut self, width: f64) -> Self {
        self.bin_width = Some(width);
        self
    }

    /// Place bin centers on the `min + i * width` grid.
    ///
    /// With `bin_count(n)` sizing the width becomes `(max - min) / (n - 1)`;
    /// with `bin_width(w)` sizing one extra bin is added. Either way the
    /// first edge ends up half a bin below `min`.
    pub fn integer_bins(mut self) -> Self {
        self.integer_bins = true;
        self
    }

    /// Expand `min` down and `max` up to multiples of the target bin width
    /// so the final range is an integer number of bins at that width.
    pub fn round_range(mut self) -> Self {
        self.round_range = true;
        self
    }

    /// Clamp out-of-range samples to the boundary bins instead of dropping.
    pub fn include_all(mut self) -> Self {
        self.include_all = true;
        self
    }

    /// Validate and resolve the settings.
    pub fn build(self) -> Result<HistogramSettings, SettingsError> {
        if !(self.max > self.min) {
            return Err(SettingsError::EmptyRange {
                min: self.min,
                max: self.max,
            });
        }

        // Resolve the target bin width from whichever sizing was given.
        let width = match (self.bin_count, self.bin_width) {
            (Some(_), Some(_)) => return Err(SettingsError::ConflictingRangeSizing),
            (None, None) => return Err(SettingsError::MissingRangeSizing),
            (Some(count), None) => {
                if count < 1 {
                    return Err(SettingsError::ZeroBinCount);
                }
                if self.integer_bins {
                    if count < 2 {
                        return Err(SettingsError::TooFewIntegerBins(count));
                    }
                    (self.max - self.min) / (count - 1) as f64
                } else {
                    (self.max - self.min) / count as f64
                }
            }
            (None, Some(width)) => {
                if !(width > 0.0) {
                    return Err(SettingsError::NonPositiveBinWidth(width));
                }
                width
            }
        };

        let (min, max) = if self.round_range {
            (
                (self.min / width).floor() * width,
                (self.max / width).ceil() * width,
            )
        } else {
            (self.min, self.max)
        };

        // A rounded range is already an exact number of bins at the target
        // width; otherwise an explicit bin count is taken as-is.
        let bin_count = match (self.bin_count, self.round_range) {
            (Some(count), false) => count,
            _ => {
                let count = ((max - min) / width).round() as usize;
                if !self.round_range && self.integer_bins {
                    count + 1
                } else {
                    count
                }
            }
        };
        if bin_count < 1 {
            return Err(SettingsError::ZeroBinCount);
        }

        let mut first_edge = min;
        if self.integer_bins {
            first_edge -= 0.5 * width;
        }
        Ok(HistogramSettings {
            first_edge,
            bin_width: width,
            bin_count,
            include_all: self.include_all,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
