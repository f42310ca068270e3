//! Histogram computation: per-frame accumulators and cross-frame averaging.
//!
//! [`FrameAccumulator`] implementations turn one frame's samples into a
//! per-bin [`FrameRow`](crate::frame::FrameRow); [`AverageHistogram`]
//! integrates those rows into running per-bin statistics and finalizes into
//! a read-only [`FinalizedHistogram`].

mod accumulator;
mod average;

pub use accumulator::{
    AccumulatorKind, CountAccumulator, FrameAccumulator, WeightedAverageAccumulator,
    WeightedSumAccumulator,
};
pub use average::{AccumulateError, AverageHistogram, FinalizedHistogram};
