//! Stream-size bookkeeping and negotiation.

pub mod negotiator;
pub mod size_map;

pub use negotiator::{negotiate, SizeNegotiator, FALLBACK_MAX_HEIGHT};
pub use size_map::SizeMap;
