//! Eviction policy implementations (replacers).
//!
//! Currently implements:
//! - [`ClockReplacer`] - CLOCK (second chance), driven by the frame descriptors

mod clock;

pub use clock::ClockReplacer;
