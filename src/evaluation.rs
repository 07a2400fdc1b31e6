//! Search quality evaluation.
//!
//! [`metrics`] holds the pure IR metrics, [`latency`] the timing tracker and
//! [`harness`] runs labeled queries through a search mode. Reports and
//! query sources live in [`report`] and [`queries`].

pub mod harness;
pub mod latency;
pub mod metrics;
pub mod queries;
pub mod report;

pub use harness::{DEFAULT_K_VALUES, EvaluationReport, LabeledQuery, Retriever, evaluate_search_quality};
pub use latency::{LatencyStats, LatencyTracker};
pub use report::{MethodComparison, compare_methods, format_comparison, format_evaluation_report};
