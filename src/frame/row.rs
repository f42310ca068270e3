//! The per-frame bin-value row emitted by accumulators.

use ndarray::{Array2, ArrayView1, ArrayView2};

/// Per-bin values for one committed frame.
///
/// # Storage Layout
///
/// Values are stored column-major: `[n_columns, n_bins]`. Each column's bin
/// values are contiguous, one column per input point-set signal.
///
/// A row is immutable once emitted; a frame is atomic and partial frames are
/// never observable through this type.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRow {
    /// Bin values: `[n_columns, n_bins]`.
    values: Array2<f64>,
}

impl FrameRow {
    /// Wrap an owned value matrix `[n_columns, n_bins]`.
    pub fn new(values: Array2<f64>) -> Self {
        Self { values }
    }

    /// Number of signal columns.
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.values.nrows()
    }

    /// Number of bins per column.
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.values.ncols()
    }

    /// Value of `bin` in `column`.
    #[inline]
    pub fn value(&self, column: usize, bin: usize) -> f64 {
        self.values[[column, bin]]
    }

    /// All bin values of one column.
    #[inline]
    pub fn column(&self, column: usize) -> ArrayView1<'_, f64> {
        self.values.row(column)
    }

    /// The full `[n_columns, n_bins]` value matrix.
    #[inline]
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }
}
