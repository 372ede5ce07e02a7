pub mod priority;
pub mod urgency;

pub use priority::{CategorySummary, PriorityScorer, PriorityWeights};
pub use urgency::Urgency;
