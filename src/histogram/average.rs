//! Cross-frame averaging of per-bin values.
//!
//! [`AverageHistogram`] keeps running per-bin mean/variance statistics over
//! the frame rows it consumes (Welford's online update, independently per
//! bin and per column). Calling [`done`](AverageHistogram::done) consumes it
//! and yields a read-only [`FinalizedHistogram`]; accumulating after
//! finalization and resampling before it are therefore unrepresentable
//! rather than runtime errors.

use ndarray::{Array2, ArrayView2, Axis, Zip};

use crate::frame::FrameRow;
use crate::settings::HistogramSettings;

// =============================================================================
// Errors
// =============================================================================

/// Failures when folding data into per-bin statistics.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AccumulateError {
    /// A frame row did not match the histogram's `[n_columns, n_bins]` shape.
    #[error(
        "frame row shape mismatch: expected [{expected_columns}, {expected_bins}], \
         got [{columns}, {bins}]"
    )]
    ShapeMismatch {
        expected_columns: usize,
        expected_bins: usize,
        columns: usize,
        bins: usize,
    },

    /// A per-bin scale vector did not match the bin count.
    #[error("scale vector length {got} does not match bin count {expected}")]
    ScaleLengthMismatch { expected: usize, got: usize },
}

// =============================================================================
// AverageHistogram
// =============================================================================

/// Running per-bin statistics over a sequence of frame rows.
///
/// Every committed frame supplies a value for every bin of every column, so
/// one frame counter covers all bins. Per bin the running mean `m` and sum
/// of squared deviations `m2` are kept; the update is Welford's:
/// `n += 1; delta = x - m; m += delta/n; m2 += delta*(x - m)`.
///
/// The state is owned exclusively by this instance; [`Clone`] produces a
/// deep, independent copy in the same lifecycle state.
#[derive(Clone, Debug)]
pub struct AverageHistogram {
    settings: HistogramSettings,
    /// Frames accumulated so far.
    frames: u64,
    /// Running means: `[n_columns, n_bins]`.
    mean: Array2<f64>,
    /// Running sums of squared deviations: `[n_columns, n_bins]`.
    m2: Array2<f64>,
}

impl AverageHistogram {
    /// Create an empty average over `n_columns` signal columns.
    pub fn new(settings: HistogramSettings, n_columns: usize) -> Self {
        let shape = (n_columns, settings.bin_count());
        Self {
            settings,
            frames: 0,
            mean: Array2::zeros(shape),
            m2: Array2::zeros(shape),
        }
    }

    /// The bin geometry being averaged over.
    pub fn settings(&self) -> &HistogramSettings {
        &self.settings
    }

    /// Number of signal columns.
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.mean.nrows()
    }

    /// Number of bins per column.
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.mean.ncols()
    }

    /// Frames accumulated so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Fold one frame's bin values into the running statistics.
    pub fn accumulate_frame(&mut self, row: &FrameRow) -> Result<(), AccumulateError> {
        if row.n_columns() != self.n_columns() || row.n_bins() != self.n_bins() {
            return Err(AccumulateError::ShapeMismatch {
                expected_columns: self.n_columns(),
                expected_bins: self.n_bins(),
                columns: row.n_columns(),
                bins: row.n_bins(),
            });
        }
        self.frames += 1;
        let n = self.frames as f64;
        Zip::from(&mut self.mean)
            .and(&mut self.m2)
            .and(row.values())
            .for_each(|mean, m2, &x| {
                let delta = x - *mean;
                *mean += delta / n;
                *m2 += delta * (x - *mean);
            });
        Ok(())
    }

    /// Finalize: consume the running statistics and expose mean and standard
    /// error per bin.
    ///
    /// The standard error is `sqrt(m2 / (n * (n - 1)))` for `n > 1` frames
    /// and `0` otherwise.
    pub fn done(self) -> FinalizedHistogram {
        let std_err = if self.frames > 1 {
            let n = self.frames as f64;
            self.m2.mapv(|m2| (m2 / (n * (n - 1.0))).sqrt())
        } else {
            Array2::zeros(self.m2.raw_dim())
        };
        FinalizedHistogram {
            settings: self.settings,
            frames: self.frames,
            mean: self.mean,
            std_err,
        }
    }
}

// =============================================================================
// FinalizedHistogram
// =============================================================================

/// Finalized averaged histogram: read-only per-bin `(mean, standard error)`.
///
/// Produced by [`AverageHistogram::done`] or by resampling. The statistics
/// can no longer accumulate frames; the post-processing operations here
/// (scaling, cumulation, normalization) transform the finalized values in
/// place.
#[derive(Clone, Debug, PartialEq)]
pub struct FinalizedHistogram {
    settings: HistogramSettings,
    frames: u64,
    /// Per-bin means: `[n_columns, n_bins]`.
    mean: Array2<f64>,
    /// Per-bin standard errors: `[n_columns, n_bins]`.
    std_err: Array2<f64>,
}

impl FinalizedHistogram {
    /// The bin geometry the statistics are defined over.
    pub fn settings(&self) -> &HistogramSettings {
        &self.settings
    }

    /// Frames that went into the average.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Number of signal columns.
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.mean.nrows()
    }

    /// Number of bins per column.
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.mean.ncols()
    }

    /// Averaged value of `bin` in `column`.
    #[inline]
    pub fn mean(&self, column: usize, bin: usize) -> f64 {
        self.mean[[column, bin]]
    }

    /// Standard error of `bin` in `column`.
    #[inline]
    pub fn standard_error(&self, column: usize, bin: usize) -> f64 {
        self.std_err[[column, bin]]
    }

    /// All means, `[n_columns, n_bins]`.
    #[inline]
    pub fn means(&self) -> ArrayView2<'_, f64> {
        self.mean.view()
    }

    /// All standard errors, `[n_columns, n_bins]`.
    #[inline]
    pub fn standard_errors(&self) -> ArrayView2<'_, f64> {
        self.std_err.view()
    }

    /// Merge adjacent bin pairs into a histogram with double the bin width.
    ///
    /// New bin `k` averages source bins `2k` and `2k + 1`; with an odd
    /// source bin count the trailing bin is carried over unscaled. Standard
    /// errors propagate as `sqrt(e0^2 + e1^2) / 2`. With `integer_bins` the
    /// merged grid is shifted down by half of the new bin width.
    pub fn resample_double_bin_width(&self, integer_bins: bool) -> FinalizedHistogram {
        let src_bins = self.n_bins();
        let settings = self.settings.with_double_bin_width(integer_bins);
        let n_bins = settings.bin_count();

        let mut mean = Array2::zeros((self.n_columns(), n_bins));
        let mut std_err = Array2::zeros((self.n_columns(), n_bins));
        for column in 0..self.n_columns() {
            for bin in 0..n_bins {
                let lo = 2 * bin;
                let hi = lo + 1;
                if hi < src_bins {
                    mean[[column, bin]] = 0.5 * (self.mean[[column, lo]] + self.mean[[column, hi]]);
                    std_err[[column, bin]] = 0.5
                        * (self.std_err[[column, lo]].powi(2)
                            + self.std_err[[column, hi]].powi(2))
                        .sqrt();
                } else {
                    // Unpaired trailing bin of an odd-count source.
                    mean[[column, bin]] = self.mean[[column, lo]];
                    std_err[[column, bin]] = self.std_err[[column, lo]];
                }
            }
        }

        FinalizedHistogram {
            settings,
            frames: self.frames,
            mean,
            std_err,
        }
    }

    /// Multiply every mean and standard error by `factor`.
    pub fn scale(&mut self, factor: f64) {
        self.mean.mapv_inplace(|v| v * factor);
        let magnitude = factor.abs();
        self.std_err.mapv_inplace(|e| e * magnitude);
    }

    /// Multiply bin `i` of every column by `factors[i]`.
    pub fn scale_by_vector(&mut self, factors: &[f64]) -> Result<(), AccumulateError> {
        if factors.len() != self.n_bins() {
            return Err(AccumulateError::ScaleLengthMismatch {
                expected: self.n_bins(),
                got: factors.len(),
            });
        }
        for mut column in self.mean.rows_mut() {
            Zip::from(&mut column)
                .and(factors)
                .for_each(|v, &f| *v *= f);
        }
        for mut column in self.std_err.rows_mut() {
            Zip::from(&mut column)
                .and(factors)
                .for_each(|e, &f| *e *= f.abs());
        }
        Ok(())
    }

    /// Replace each column's means with their partial sums along the bins.
    ///
    /// Standard errors are undefined for cumulative data and are cleared.
    pub fn make_cumulative(&mut self) {
        for mut column in self.mean.rows_mut() {
            let mut total = 0.0;
            for value in column.iter_mut() {
                total += *value;
                *value = total;
            }
        }
        self.std_err.fill(0.0);
    }

    /// Scale each column so its means integrate to one over the bin width.
    ///
    /// Columns whose means sum to zero (or below) are left untouched.
    pub fn normalize_probability(&mut self) {
        let bin_width = self.settings.bin_width();
        let sums: Vec<f64> = self
            .mean
            .axis_iter(Axis(0))
            .map(|column| column.sum())
            .collect();
        for (column, sum) in sums.into_iter().enumerate() {
            if sum > 0.0 {
                let factor = 1.0 / (sum * bin_width);
                self.mean.row_mut(column).mapv_inplace(|v| v * factor);
                self.std_err.row_mut(column).mapv_inplace(|e| e * factor);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
