//! Per-frame data types and the frame event stream.
//!
//! A *frame* is one unit of input (for example one time step) containing one
//! or more point sets, each binned independently into its own output column.
//! Committing a frame produces a [`FrameRow`]: the per-bin values for every
//! column of that frame.

mod row;
mod stream;

pub use row::FrameRow;
pub use stream::{FrameStream, StreamError};
