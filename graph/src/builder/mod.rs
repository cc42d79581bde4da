mod deps;
pub mod timeline;
pub mod task;

pub use timeline::{TimelineBuilder, TimelineGraph, ISSUE_DIMENSION, OPEN_PR_DIMENSION};
pub use task::TaskGraphBuilder;
