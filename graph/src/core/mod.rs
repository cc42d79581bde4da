pub mod node;
pub mod branch;
pub mod graph;

pub use node::{issue_node_id, pr_node_id, GraphNode, NodeDetail, NodeKind};
pub use branch::{Branch, MAIN_BRANCH, MAIN_BRANCH_COLOR};
pub use graph::{Graph, GraphStats};
