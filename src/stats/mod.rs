//! Aggregation engine: numeric primitives and the four dashboard summaries.

pub mod engine;
pub mod primitives;

pub use engine::{
    correlation_with_satisfaction, distance_comfort_profile, filtered_averages,
    satisfaction_comparison, DistanceBin, GroupMeans, SatisfactionComparison, ScoreEntry,
    ScoreSeries,
};
