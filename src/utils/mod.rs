//! Shared utilities: duration normalization.

pub mod duration;

pub use duration::{nanos_to_seconds, normalize_duration, TimeUnit, NANOSECONDS};
