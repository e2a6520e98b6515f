//! Score aggregation and pipeline orchestration

pub mod aggregator;
pub mod feedback;
pub mod pipeline;

pub use aggregator::aggregate;
pub use feedback::CoachingRequest;
pub use pipeline::ScoringPipeline;
