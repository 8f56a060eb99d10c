//! Ring Buffer
//!
//! Fixed-capacity FIFO storage for per-frame signal history. Pushing into a
//! full buffer evicts the oldest entry.

mod buffer;

pub use buffer::{Iter, RingBuffer};
