//! framehist: streaming histogram computation over frame-sequential sample
//! streams.
//!
//! Per-frame scalar or weighted samples are binned into statistical
//! summaries, and per-bin values are accumulated across frames into an
//! averaged, resampleable histogram.
//!
//! # Key Types
//!
//! - [`HistogramSettings`] - Immutable bin geometry with validating builders
//! - [`AccumulatorKind`] / [`FrameAccumulator`] - Per-frame binning strategies
//! - [`FrameStream`] - Sequential driver for the frame event contract
//! - [`AverageHistogram`] / [`FinalizedHistogram`] - Cross-frame statistics
//!
//! # Flow
//!
//! Build [`HistogramSettings`], pick an [`AccumulatorKind`], wrap the
//! accumulator in a [`FrameStream`], feed frame events, then `finish()` for
//! the finalized per-bin `(mean, standard error)` statistics. See the
//! [`frame`] module for the event contract.
//!
//! ```
//! use framehist::{AccumulatorKind, FrameStream, HistogramSettings};
//!
//! let settings = HistogramSettings::from_range(1.0, 3.0).bin_count(4).build()?;
//! let mut stream = FrameStream::new(AccumulatorKind::Count.build(settings, 1));
//!
//! for (index, samples) in [vec![1.1, 2.3], vec![1.3, 2.2, 2.9]].iter().enumerate() {
//!     stream.frame_start(index as u64, index as f64)?;
//!     stream.point_set_start(0)?;
//!     for &value in samples {
//!         stream.add_point(value)?;
//!     }
//!     stream.point_set_end()?;
//!     stream.frame_end()?;
//! }
//!
//! let averaged = stream.finish()?;
//! assert_eq!(averaged.frame_count(), 2);
//! assert_eq!(averaged.mean(0, 0), 1.0); // one hit in [1.0, 1.5) per frame
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export approx traits for users who want to compare histogram values
pub use approx;

pub mod frame;
pub mod histogram;
pub mod settings;
pub mod testing;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Frame event types
pub use frame::{FrameRow, FrameStream, StreamError};

// Histogram computation
pub use histogram::{
    AccumulateError, AccumulatorKind, AverageHistogram, CountAccumulator, FinalizedHistogram,
    FrameAccumulator, WeightedAverageAccumulator, WeightedSumAccumulator,
};

// Bin geometry
pub use settings::{FromBins, FromRange, HistogramSettings, SettingsError};
