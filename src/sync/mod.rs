//! Histograms that can be shared between threads.
//!
//! Two strategies are offered, and both index their slots exactly like a plain `Histogram`, so
//! they give identical answers once writers are quiet:
//!
//!  - [`AtomicHistogram`] keeps every slot in an atomic integer. Recording goes through `&self`
//!    and never blocks; concurrent readers see no snapshot isolation.
//!  - [`LockedHistogram`] puts a whole histogram behind one mutex. Every operation is serialized,
//!    so a reader always sees a consistent state.

mod atomic;
mod locked;

pub use self::atomic::{AtomicCounts, AtomicHistogram};
pub use self::locked::LockedHistogram;
