//! Cleaning, classification and aggregation stages

pub mod aggregate;
pub mod classify;
pub mod normalize;

pub use aggregate::{ZoneAggregate, aggregate_by_zone};
pub use classify::{ClassifiedRecord, DurationBucket, classify, classify_all};
pub use normalize::{CANONICAL_FIELDS, UsageRecord, normalize};
