//! Backend adapters
//!
//! An adapter translates raw params into a backend query and hands the
//! results to [`crate::flow::Flow`]. Only the in-memory [`sequence`]
//! adapter ships with the crate.

pub mod sequence;
