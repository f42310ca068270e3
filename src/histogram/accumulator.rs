//! Per-frame accumulators: the three binning strategies.
//!
//! All three share one bin-indexing rule ([`HistogramSettings::find_bin`])
//! and differ only in the per-bin payload:
//!
//! - [`CountAccumulator`] — integer hit counts.
//! - [`WeightedSumAccumulator`] — sum of sample weights.
//! - [`WeightedAverageAccumulator`] — mean sample weight per bin.
//!
//! An accumulator's per-bin state is transient: it is reset when a frame
//! opens and emitted as a whole when the frame ends, so partial frames are
//! never visible downstream.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::frame::FrameRow;
use crate::settings::HistogramSettings;

// =============================================================================
// FrameAccumulator
// =============================================================================

/// One frame's worth of sample binning.
///
/// Implementations consume samples between `frame_start` and `frame_end`
/// and emit the frame's per-bin values as a [`FrameRow`]. Callers are
/// responsible for event ordering; [`FrameStream`](crate::FrameStream)
/// enforces it.
pub trait FrameAccumulator {
    /// The bin geometry samples are binned against.
    fn settings(&self) -> &HistogramSettings;

    /// Number of independently binned signal columns.
    fn n_columns(&self) -> usize;

    /// Reset transient per-bin state for a new frame.
    fn frame_start(&mut self);

    /// Bin one sample into `column`.
    ///
    /// Out-of-range samples are clamped or dropped per the settings' policy.
    /// Counting accumulators ignore `weight`.
    fn add_sample(&mut self, column: usize, value: f64, weight: f64);

    /// Emit the per-bin values of the current frame.
    fn frame_end(&mut self) -> FrameRow;
}

impl<A: FrameAccumulator + ?Sized> FrameAccumulator for Box<A> {
    fn settings(&self) -> &HistogramSettings {
        (**self).settings()
    }

    fn n_columns(&self) -> usize {
        (**self).n_columns()
    }

    fn frame_start(&mut self) {
        (**self).frame_start()
    }

    fn add_sample(&mut self, column: usize, value: f64, weight: f64) {
        (**self).add_sample(column, value, weight)
    }

    fn frame_end(&mut self) -> FrameRow {
        (**self).frame_end()
    }
}

// =============================================================================
// AccumulatorKind
// =============================================================================

/// Which per-frame aggregation strategy to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccumulatorKind {
    /// Hit counts per bin.
    Count,
    /// Sum of sample weights per bin.
    WeightedSum,
    /// Mean sample weight per bin (`0.0` for bins without hits).
    WeightedAverage,
}

impl AccumulatorKind {
    /// Construct the accumulator for this strategy.
    pub fn build(self, settings: HistogramSettings, n_columns: usize) -> Box<dyn FrameAccumulator> {
        match self {
            Self::Count => Box::new(CountAccumulator::new(settings, n_columns)),
            Self::WeightedSum => Box::new(WeightedSumAccumulator::new(settings, n_columns)),
            Self::WeightedAverage => {
                Box::new(WeightedAverageAccumulator::new(settings, n_columns))
            }
        }
    }
}

// =============================================================================
// CountAccumulator
// =============================================================================

/// Counts in-range (or clamped) hits per bin.
#[derive(Clone, Debug)]
pub struct CountAccumulator {
    settings: HistogramSettings,
    /// Hit counts: `[n_columns, n_bins]`.
    counts: Array2<u64>,
}

impl CountAccumulator {
    /// Create a counting accumulator for `n_columns` signal columns.
    pub fn new(settings: HistogramSettings, n_columns: usize) -> Self {
        Self {
            settings,
            counts: Array2::zeros((n_columns, settings.bin_count())),
        }
    }
}

impl FrameAccumulator for CountAccumulator {
    fn settings(&self) -> &HistogramSettings {
        &self.settings
    }

    fn n_columns(&self) -> usize {
        self.counts.nrows()
    }

    fn frame_start(&mut self) {
        self.counts.fill(0);
    }

    fn add_sample(&mut self, column: usize, value: f64, _weight: f64) {
        debug_assert!(column < self.n_columns());
        if let Some(bin) = self.settings.find_bin(value) {
            self.counts[[column, bin]] += 1;
        }
    }

    fn frame_end(&mut self) -> FrameRow {
        FrameRow::new(self.counts.mapv(|c| c as f64))
    }
}

// =============================================================================
// WeightedSumAccumulator
// =============================================================================

/// Sums sample weights per bin.
#[derive(Clone, Debug)]
pub struct WeightedSumAccumulator {
    settings: HistogramSettings,
    /// Weight sums: `[n_columns, n_bins]`.
    sums: Array2<f64>,
}

impl WeightedSumAccumulator {
    /// Create a weighted-sum accumulator for `n_columns` signal columns.
    pub fn new(settings: HistogramSettings, n_columns: usize) -> Self {
        Self {
            settings,
            sums: Array2::zeros((n_columns, settings.bin_count())),
        }
    }
}

impl FrameAccumulator for WeightedSumAccumulator {
    fn settings(&self) -> &HistogramSettings {
        &self.settings
    }

    fn n_columns(&self) -> usize {
        self.sums.nrows()
    }

    fn frame_start(&mut self) {
        self.sums.fill(0.0);
    }

    fn add_sample(&mut self, column: usize, value: f64, weight: f64) {
        debug_assert!(column < self.n_columns());
        if let Some(bin) = self.settings.find_bin(value) {
            self.sums[[column, bin]] += weight;
        }
    }

    fn frame_end(&mut self) -> FrameRow {
        FrameRow::new(self.sums.clone())
    }
}

// =============================================================================
// WeightedAverageAccumulator
// =============================================================================

/// Averages sample weights per bin within a frame.
///
/// Bins with no hits in a frame emit `0.0`; an empty bin is a defined value,
/// not an error.
#[derive(Clone, Debug)]
pub struct WeightedAverageAccumulator {
    settings: HistogramSettings,
    /// Weight sums: `[n_columns, n_bins]`.
    sums: Array2<f64>,
    /// Contributing-sample counts: `[n_columns, n_bins]`.
    hits: Array2<u64>,
}

impl WeightedAverageAccumulator {
    /// Create a weighted-average accumulator for `n_columns` signal columns.
    pub fn new(settings: HistogramSettings, n_columns: usize) -> Self {
        let shape = (n_columns, settings.bin_count());
        Self {
            settings,
            sums: Array2::zeros(shape),
            hits: Array2::zeros(shape),
        }
    }
}

impl FrameAccumulator for WeightedAverageAccumulator {
    fn settings(&self) -> &HistogramSettings {
        &self.settings
    }

    fn n_columns(&self) -> usize {
        self.sums.nrows()
    }

    fn frame_start(&mut self) {
        self.sums.fill(0.0);
        self.hits.fill(0);
    }

    fn add_sample(&mut self, column: usize, value: f64, weight: f64) {
        debug_assert!(column < self.n_columns());
        if let Some(bin) = self.settings.find_bin(value) {
            self.sums[[column, bin]] += weight;
            self.hits[[column, bin]] += 1;
        }
    }

    fn frame_end(&mut self) -> FrameRow {
        let mut values = self.sums.clone();
        ndarray::Zip::from(&mut values)
            .and(&self.hits)
            .for_each(|sum, &hits| {
                if hits > 0 {
                    *sum /= hits as f64;
                } else {
                    *sum = 0.0;
                }
            });
        FrameRow::new(values)
    }
}

// =============================================================================
// Tests
// =============================================================================
