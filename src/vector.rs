//! Dense vector storage and exact nearest-neighbor search.

pub mod distance;
pub mod flat;

pub use distance::DistanceMetric;
pub use flat::FlatVectorIndex;
