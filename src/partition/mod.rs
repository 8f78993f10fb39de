//! Point-to-area assignment and the split/merge rebalancing passes over it.
mod ops;
mod partition;

pub use ops::{AreaMerger, AreaSplitter, MergeDecision, MergePlan, MergeRule, SplitOutcome, SplitReport};
pub use partition::Partition;
