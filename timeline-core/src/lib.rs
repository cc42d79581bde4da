pub mod records;
pub mod config;

pub use records::{load_task_graph, Issue, IssueStatus, IssueType, PrStatus, PullRequest, Snapshot, TaskGraphEntry};
pub use config::{ConfigError, PaletteConfig, TimelineConfig, TimelineSection};
