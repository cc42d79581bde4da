pub mod branch;
pub mod dependency;

pub use branch::BranchLaneCalculator;
pub use dependency::DependencyLaneCalculator;

use crate::core::GraphNode;
use smallvec::SmallVec;
use std::collections::HashMap;

/// A lane represents a vertical column in the graph
pub type LaneIdx = usize;

/// Sorted set of lanes touched by one row
pub type LaneSet = SmallVec<[LaneIdx; 4]>;

/// Lane state for one row of the timeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowInfo {
    pub node_id: String,
    pub node_lane: LaneIdx,
    /// Lane a branch-start connector comes from
    pub connector_from_lane: Option<LaneIdx>,
    /// Lanes drawn through this row, captured before end-of-row releases
    pub active_lanes: LaneSet,
    /// Lanes whose line stops at this row
    pub lanes_ending_this_row: LaneSet,
    /// Lanes held for an unfinished subtree; no plain vertical is drawn
    pub reserved_lanes: LaneSet,
    pub is_first_row_in_lane: bool,
    pub is_last_row_in_lane: bool,
}

impl RowInfo {
    pub fn is_active(&self, lane: LaneIdx) -> bool {
        self.active_lanes.contains(&lane)
    }

    pub fn is_reserved(&self, lane: LaneIdx) -> bool {
        self.reserved_lanes.contains(&lane)
    }

    pub fn is_ending(&self, lane: LaneIdx) -> bool {
        self.lanes_ending_this_row.contains(&lane)
    }

    /// Only node ever placed on its lane instance
    pub fn is_single_node_lane(&self) -> bool {
        self.is_first_row_in_lane && self.is_last_row_in_lane
    }
}

/// Result of lane calculation for a whole graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub lane_assignments: HashMap<String, LaneIdx>,
    /// 1 + highest lane used, never below 1
    pub max_lanes: usize,
    /// One entry per node, in graph order
    pub rows: Vec<RowInfo>,
}

impl Layout {
    pub fn empty() -> Self {
        Self {
            lane_assignments: HashMap::new(),
            max_lanes: 1,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(rows: Vec<RowInfo>) -> Self {
        let highest = rows
            .iter()
            .flat_map(|row| std::iter::once(row.node_lane).chain(row.active_lanes.iter().copied()))
            .max()
            .unwrap_or(0);

        let lane_assignments = rows
            .iter()
            .map(|row| (row.node_id.clone(), row.node_lane))
            .collect();

        Self {
            lane_assignments,
            max_lanes: highest + 1,
            rows,
        }
    }

    pub fn lane_of(&self, node_id: &str) -> Option<LaneIdx> {
        self.lane_assignments.get(node_id).copied()
    }

    pub fn row(&self, node_id: &str) -> Option<&RowInfo> {
        self.rows.iter().find(|row| row.node_id == node_id)
    }
}

/// Assigns every node of a graph to a lane
pub trait LaneCalculator {
    fn calculate(&self, nodes: &[GraphNode]) -> Layout;
}

/// Collect an ordered, de-duplicated lane set
pub(crate) fn lane_set<I>(lanes: I) -> LaneSet
where
    I: IntoIterator<Item = LaneIdx>,
{
    let mut set: LaneSet = lanes.into_iter().collect();
    set.sort_unstable();
    set.dedup();
    set
}
