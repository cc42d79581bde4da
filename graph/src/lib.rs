pub mod builder;
pub mod core;
pub mod error;
pub mod layout;
pub mod render;
pub mod wire;

pub use builder::{TaskGraphBuilder, TimelineBuilder, TimelineGraph};
pub use core::{Branch, Graph, GraphNode, GraphStats, NodeDetail, NodeKind, MAIN_BRANCH};
pub use error::{GraphError, Result};
pub use layout::{BranchLaneCalculator, DependencyLaneCalculator, LaneCalculator, LaneIdx, Layout, RowInfo};
pub use render::{Charset, NodeShape, NodeStyle, RenderConfig, SvgRenderer, TextRenderer};
pub use wire::{WireBranch, WireCommit, WireGraph};
