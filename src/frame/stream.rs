//! Frame event stream driving an accumulator and its averager.

use crate::frame::FrameRow;
use crate::histogram::{AccumulateError, AverageHistogram, FinalizedHistogram, FrameAccumulator};
use crate::settings::HistogramSettings;

// =============================================================================
// Errors
// =============================================================================

/// Contract violations in the frame event sequence.
///
/// These are programming errors in the caller, reported at the point of
/// violation. The stream's prior state is left unchanged, but the violating
/// operation itself is not retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    /// `frame_start` while the previous frame is still open.
    #[error("a frame is already in progress")]
    FrameInProgress,

    /// A frame-scoped event arrived with no open frame.
    #[error("no frame in progress")]
    NoFrameInProgress,

    /// `point_set_start` or `frame_end` while a point set is still open.
    #[error("a point set is still in progress")]
    PointSetInProgress,

    /// `add_point`/`add_weighted`/`point_set_end` outside a point set.
    #[error("no point set in progress")]
    NoPointSetInProgress,

    /// Point set addressed a column the accumulator does not have.
    #[error("column {column} out of range for {n_columns} columns")]
    ColumnOutOfRange { column: usize, n_columns: usize },

    /// Frames must arrive strictly sequentially, starting at 0.
    #[error("out-of-order frame: expected index {expected}, got {got}")]
    OutOfOrderFrame { expected: u64, got: u64 },

    /// Committed row was rejected by the averager.
    #[error(transparent)]
    Accumulate(#[from] AccumulateError),
}

// =============================================================================
// FrameStream
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StreamState {
    BetweenFrames,
    InFrame,
    InPointSet { column: usize },
}

/// Sequential driver for the per-frame event contract.
///
/// The pipeline delivers, per frame:
///
/// 1. [`frame_start`](Self::frame_start) with the next frame index,
/// 2. repeated [`point_set_start`](Self::point_set_start) /
///    [`add_point`](Self::add_point) (or
///    [`add_weighted`](Self::add_weighted)) /
///    [`point_set_end`](Self::point_set_end) groups,
/// 3. [`frame_end`](Self::frame_end), which commits the frame: the
///    accumulator's row is folded into the owned [`AverageHistogram`] and
///    returned to the caller.
///
/// [`finish`](Self::finish) is the explicit "no more frames" signal and
/// finalizes the averaged statistics.
///
/// Frames are strictly ordered and never overlap; every violation of the
/// contract is a [`StreamError`].
///
/// # Example
///
/// ```
/// use framehist::{AccumulatorKind, FrameStream, HistogramSettings};
///
/// let settings = HistogramSettings::from_range(0.0, 1.0).bin_count(2).build()?;
/// let mut stream = FrameStream::new(AccumulatorKind::Count.build(settings, 1));
///
/// stream.frame_start(0, 0.0)?;
/// stream.point_set_start(0)?;
/// stream.add_point(0.25)?;
/// stream.add_point(0.75)?;
/// stream.point_set_end()?;
/// let row = stream.frame_end()?;
/// assert_eq!(row.column(0).to_vec(), vec![1.0, 1.0]);
///
/// let averaged = stream.finish()?;
/// assert_eq!(averaged.frame_count(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct FrameStream<A> {
    accumulator: A,
    averager: AverageHistogram,
    state: StreamState,
    frames_committed: u64,
}

impl<A: FrameAccumulator> FrameStream<A> {
    /// Create a stream around `accumulator`, with an averager over the same
    /// bin geometry and column count.
    pub fn new(accumulator: A) -> Self {
        let averager = AverageHistogram::new(*accumulator.settings(), accumulator.n_columns());
        Self {
            accumulator,
            averager,
            state: StreamState::BetweenFrames,
            frames_committed: 0,
        }
    }

    /// Bin geometry shared by the accumulator and the averager.
    pub fn settings(&self) -> &HistogramSettings {
        self.accumulator.settings()
    }

    /// Number of signal columns.
    pub fn n_columns(&self) -> usize {
        self.accumulator.n_columns()
    }

    /// Frames committed so far.
    pub fn frame_count(&self) -> u64 {
        self.frames_committed
    }

    /// The running average over committed frames.
    ///
    /// Cloning the returned reference yields an independent snapshot that can
    /// be finalized without affecting this stream.
    pub fn averager(&self) -> &AverageHistogram {
        &self.averager
    }

    /// Open frame `index`.
    ///
    /// `index` must equal the number of frames committed so far. The frame's
    /// `x` coordinate is part of the event contract but unused by the
    /// histogram core.
    pub fn frame_start(&mut self, index: u64, _x: f64) -> Result<(), StreamError> {
        match self.state {
            StreamState::BetweenFrames => {}
            _ => return Err(StreamError::FrameInProgress),
        }
        if index != self.frames_committed {
            return Err(StreamError::OutOfOrderFrame {
                expected: self.frames_committed,
                got: index,
            });
        }
        self.accumulator.frame_start();
        self.state = StreamState::InFrame;
        Ok(())
    }

    /// Open a point set feeding `column`.
    pub fn point_set_start(&mut self, column: usize) -> Result<(), StreamError> {
        match self.state {
            StreamState::InFrame => {}
            StreamState::InPointSet { .. } => return Err(StreamError::PointSetInProgress),
            StreamState::BetweenFrames => return Err(StreamError::NoFrameInProgress),
        }
        let n_columns = self.accumulator.n_columns();
        if column >= n_columns {
            return Err(StreamError::ColumnOutOfRange { column, n_columns });
        }
        self.state = StreamState::InPointSet { column };
        Ok(())
    }

    /// Add a bare sample to the open point set.
    pub fn add_point(&mut self, value: f64) -> Result<(), StreamError> {
        self.add_weighted(value, 1.0)
    }

    /// Add a weighted sample to the open point set.
    pub fn add_weighted(&mut self, value: f64, weight: f64) -> Result<(), StreamError> {
        let StreamState::InPointSet { column } = self.state else {
            return Err(StreamError::NoPointSetInProgress);
        };
        self.accumulator.add_sample(column, value, weight);
        Ok(())
    }

    /// Close the open point set.
    pub fn point_set_end(&mut self) -> Result<(), StreamError> {
        let StreamState::InPointSet { .. } = self.state else {
            return Err(StreamError::NoPointSetInProgress);
        };
        self.state = StreamState::InFrame;
        Ok(())
    }

    /// Commit the open frame.
    ///
    /// Emits the accumulator's row, folds it into the averager and returns
    /// it. After this the next `frame_start` must carry the next index.
    pub fn frame_end(&mut self) -> Result<FrameRow, StreamError> {
        match self.state {
            StreamState::InFrame => {}
            StreamState::InPointSet { .. } => return Err(StreamError::PointSetInProgress),
            StreamState::BetweenFrames => return Err(StreamError::NoFrameInProgress),
        }
        let row = self.accumulator.frame_end();
        self.averager.accumulate_frame(&row)?;
        self.frames_committed += 1;
        self.state = StreamState::BetweenFrames;
        Ok(row)
    }

    /// Signal that no more frames will arrive and finalize the average.
    pub fn finish(self) -> Result<FinalizedHistogram, StreamError> {
        if self.state != StreamState::BetweenFrames {
            return Err(StreamError::FrameInProgress);
        }
        Ok(self.averager.done())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::AccumulatorKind;
    use crate::settings::HistogramSettings;

    fn count_stream(n_columns: usize) -> FrameStream<Box<dyn FrameAccumulator>> {
        let settings = HistogramSettings::from_range(0.0, 2.0)
            .bin_count(4)
            .build()
            .unwrap();
        FrameStream::new(AccumulatorKind::Count.build(settings, n_columns))
    }

    #[test]
    fn commits_frames_in_order() {
        let mut stream = count_stream(1);
        stream.frame_start(0, 0.0).unwrap();
        stream.point_set_start(0).unwrap();
        stream.add_point(0.1).unwrap();
        stream.point_set_end().unwrap();
        let row = stream.frame_end().unwrap();
        assert_eq!(row.column(0).to_vec(), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(stream.frame_count(), 1);

        stream.frame_start(1, 1.0).unwrap();
        stream.frame_end().unwrap();
        assert_eq!(stream.frame_count(), 2);
    }

    #[test]
    fn rejects_out_of_order_frames() {
        let mut stream = count_stream(1);
        assert_eq!(
            stream.frame_start(3, 0.0),
            Err(StreamError::OutOfOrderFrame {
                expected: 0,
                got: 3
            })
        );
        // The failed start left the stream usable.
        stream.frame_start(0, 0.0).unwrap();
    }

    #[test]
    fn rejects_nesting_violations() {
        let mut stream = count_stream(2);
        assert_eq!(
            stream.point_set_start(0),
            Err(StreamError::NoFrameInProgress)
        );
        assert_eq!(stream.frame_end(), Err(StreamError::NoFrameInProgress));

        stream.frame_start(0, 0.0).unwrap();
        assert_eq!(stream.frame_start(1, 0.0), Err(StreamError::FrameInProgress));
        assert_eq!(stream.add_point(0.5), Err(StreamError::NoPointSetInProgress));
        assert_eq!(stream.point_set_end(), Err(StreamError::NoPointSetInProgress));
        assert_eq!(
            stream.point_set_start(2),
            Err(StreamError::ColumnOutOfRange {
                column: 2,
                n_columns: 2
            })
        );

        stream.point_set_start(1).unwrap();
        assert_eq!(stream.point_set_start(0), Err(StreamError::PointSetInProgress));
        assert_eq!(stream.frame_end(), Err(StreamError::PointSetInProgress));
    }

    #[test]
    fn finish_requires_closed_frame() {
        let mut stream = count_stream(1);
        stream.frame_start(0, 0.0).unwrap();
        let err = stream.finish();
        assert!(matches!(err, Err(StreamError::FrameInProgress)));
    }

    #[test]
    fn finish_finalizes_the_average() {
        let mut stream = count_stream(1);
        for index in 0..3 {
            stream.frame_start(index, index as f64).unwrap();
            stream.point_set_start(0).unwrap();
            stream.add_point(0.1).unwrap();
            stream.point_set_end().unwrap();
            stream.frame_end().unwrap();
        }
        let averaged = stream.finish().unwrap();
        assert_eq!(averaged.frame_count(), 3);
        assert_eq!(averaged.mean(0, 0), 1.0);
    }
}
