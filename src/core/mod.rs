//! core components and types used throughout this library

/// Counter type defining operations required by the counts array and impls for primitives.
pub mod counter;
/// Value-to-slot encoding shared by every store.
pub mod encoding;
/// Counts-array storage strategies.
pub mod store;
