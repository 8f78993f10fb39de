mod merge;
mod split;

pub use merge::{AreaMerger, MergeDecision, MergePlan, MergeRule};
pub use split::{AreaSplitter, SplitOutcome, SplitReport};
