//! Reusable fixtures for driving frame streams from literal data.
//!
//! Tests describe input as a slice of [`Frame`] values and [`replay`] feeds
//! them through a [`FrameStream`] with the full event contract, returning
//! the committed rows.

use crate::frame::{FrameRow, FrameStream, StreamError};
use crate::histogram::FrameAccumulator;

/// One sample of a scripted point set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sample {
    /// A bare value, delivered via `add_point`.
    Bare(f64),
    /// A `(value, weight)` pair, delivered via `add_weighted`.
    Weighted(f64, f64),
}

/// One scripted point set: samples for a single signal column.
#[derive(Clone, Debug, PartialEq)]
pub struct PointSet {
    /// Target signal column.
    pub column: usize,
    /// Samples in delivery order.
    pub samples: Vec<Sample>,
}

/// One scripted frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Frame-level x coordinate (unused by the histogram core).
    pub x: f64,
    /// Point sets in delivery order.
    pub point_sets: Vec<PointSet>,
}

impl Frame {
    /// A frame of bare samples, each group its own point set in column 0.
    pub fn bare(x: f64, groups: &[&[f64]]) -> Self {
        Self {
            x,
            point_sets: groups
                .iter()
                .map(|values| PointSet {
                    column: 0,
                    samples: values.iter().map(|&v| Sample::Bare(v)).collect(),
                })
                .collect(),
        }
    }

    /// A frame of weighted samples, each group its own point set in column 0.
    pub fn weighted(x: f64, groups: &[&[(f64, f64)]]) -> Self {
        Self {
            x,
            point_sets: groups
                .iter()
                .map(|pairs| PointSet {
                    column: 0,
                    samples: pairs.iter().map(|&(v, w)| Sample::Weighted(v, w)).collect(),
                })
                .collect(),
        }
    }
}

/// Feed `frames` through `stream` in order, starting at the stream's next
/// expected frame index. Returns the committed rows.
pub fn replay<A: FrameAccumulator>(
    stream: &mut FrameStream<A>,
    frames: &[Frame],
) -> Result<Vec<FrameRow>, StreamError> {
    let mut rows = Vec::with_capacity(frames.len());
    for frame in frames {
        stream.frame_start(stream.frame_count(), frame.x)?;
        for point_set in &frame.point_sets {
            stream.point_set_start(point_set.column)?;
            for &sample in &point_set.samples {
                match sample {
                    Sample::Bare(value) => stream.add_point(value)?,
                    Sample::Weighted(value, weight) => stream.add_weighted(value, weight)?,
                }
            }
            stream.point_set_end()?;
        }
        rows.push(stream.frame_end()?);
    }
    Ok(rows)
}
