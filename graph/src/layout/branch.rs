use super::{lane_set, LaneCalculator, LaneIdx, Layout, RowInfo};
use crate::core::{GraphNode, MAIN_BRANCH};
use std::collections::{BTreeMap, HashMap};

const MAIN_SEGMENT: usize = 0;

/// Lane calculator for the full timeline.
///
/// Nodes sharing a branch name form one segment that keeps its lane until
/// the segment and every segment forked from it have no nodes left. A freed
/// lane goes to the next branch that starts; new branches take the lowest
/// free lane.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchLaneCalculator;

impl BranchLaneCalculator {
    pub fn new() -> Self {
        Self
    }
}

/// One branch's stretch of rows
#[derive(Debug, Clone)]
struct Segment {
    first: usize,
    last: usize,
    /// Row of the latest branch forked from this one
    last_fork: Option<usize>,
    /// Last row of this segment or anything forked from it
    subtree_end: usize,
    parent: Option<usize>,
    lane: Option<LaneIdx>,
}

impl Segment {
    fn starting_at(row: usize, parent: Option<usize>) -> Self {
        Self {
            first: row,
            last: row,
            last_fork: None,
            subtree_end: row,
            parent,
            lane: None,
        }
    }

    /// Own nodes and outgoing forks are all behind `row`
    fn is_drained_at(&self, row: usize) -> bool {
        row > self.last && self.last_fork.map_or(true, |fork| row > fork)
    }

    /// The lane line keeps going below `row`
    fn continues_below(&self, row: usize) -> bool {
        row < self.last || self.last_fork.map_or(false, |fork| fork > row)
    }
}

struct SegmentPlan {
    segments: Vec<Segment>,
    /// Segment per row
    segment_of: Vec<usize>,
    /// Row of the resolved first parent per row
    parent_row: Vec<Option<usize>>,
}

fn plan_segments(nodes: &[GraphNode]) -> SegmentPlan {
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(row, node)| (node.id.as_str(), row))
        .collect();

    let mut segments = vec![Segment::starting_at(0, None)];
    let mut by_branch: HashMap<&str, usize> = HashMap::new();
    let mut segment_of: Vec<usize> = Vec::with_capacity(nodes.len());
    let mut parent_row = Vec::with_capacity(nodes.len());

    for (row, node) in nodes.iter().enumerate() {
        // Parents must already be on screen; anything else is dangling
        let parent = node
            .first_parent()
            .and_then(|id| index.get(id).copied())
            .filter(|&p| p < row);
        if parent.is_none() && node.first_parent().is_some() {
            tracing::warn!(node = %node.id, parent = ?node.first_parent(), "unresolved parent, laid out as root");
        }
        parent_row.push(parent);

        let segment = if node.branch_name == MAIN_BRANCH {
            MAIN_SEGMENT
        } else if let Some(&existing) = by_branch.get(node.branch_name.as_str()) {
            segments[existing].last = row;
            segments[existing].subtree_end = row;
            existing
        } else {
            let parent_segment = parent.map(|p| segment_of[p]);
            if let Some(ps) = parent_segment {
                segments[ps].last_fork = Some(row);
            }
            segments.push(Segment::starting_at(row, parent_segment));
            by_branch.insert(node.branch_name.as_str(), segments.len() - 1);
            segments.len() - 1
        };
        segment_of.push(segment);
    }

    // Children are created after their parents, so a reverse sweep settles
    // every subtree end before it is propagated upward
    for idx in (1..segments.len()).rev() {
        if let Some(parent) = segments[idx].parent {
            let end = segments[idx].subtree_end;
            let parent = &mut segments[parent];
            parent.subtree_end = parent.subtree_end.max(end);
        }
    }

    SegmentPlan {
        segments,
        segment_of,
        parent_row,
    }
}

/// Lane state threaded through the forward pass
struct PassState {
    /// lane -> owning segment; lane 0 always belongs to main
    occupied: BTreeMap<LaneIdx, usize>,
    node_lanes: Vec<LaneIdx>,
}

impl PassState {
    fn new(rows: usize) -> Self {
        let mut occupied = BTreeMap::new();
        occupied.insert(0, MAIN_SEGMENT);
        Self {
            occupied,
            node_lanes: Vec::with_capacity(rows),
        }
    }

    fn lowest_free(&self) -> LaneIdx {
        let mut lane = 1;
        while self.occupied.contains_key(&lane) {
            lane += 1;
        }
        lane
    }

    fn occupy(&mut self, lane: LaneIdx, segment: usize) {
        if lane != 0 {
            self.occupied.insert(lane, segment);
        }
    }

    fn release(&mut self, lane: LaneIdx, segment: usize) {
        if lane != 0 && self.occupied.get(&lane) == Some(&segment) {
            self.occupied.remove(&lane);
        }
    }
}

impl LaneCalculator for BranchLaneCalculator {
    fn calculate(&self, nodes: &[GraphNode]) -> Layout {
        if nodes.is_empty() {
            return Layout::empty();
        }

        let SegmentPlan {
            mut segments,
            segment_of,
            parent_row,
        } = plan_segments(nodes);
        let mut state = PassState::new(nodes.len());
        let mut rows = Vec::with_capacity(nodes.len());

        for (row, node) in nodes.iter().enumerate() {
            let seg_id = segment_of[row];
            let on_main = seg_id == MAIN_SEGMENT;
            let starts_segment = !on_main && segments[seg_id].first == row;

            let lane = if on_main {
                0
            } else if let Some(lane) = node.lane {
                lane
            } else if let Some(lane) = segments[seg_id].lane {
                lane
            } else {
                state.lowest_free()
            };
            if !on_main && segments[seg_id].lane.is_none() {
                segments[seg_id].lane = Some(lane);
                state.occupy(lane, seg_id);
            }
            state.node_lanes.push(lane);

            let parent_lane = parent_row[row].map(|p| state.node_lanes[p]);
            let connector = if node.lane.is_some() {
                parent_lane
            } else if starts_segment {
                match parent_lane {
                    Some(lane) => Some(lane),
                    // PR branches fork off main even without an explicit parent
                    None if node.kind.is_pull_request() => Some(0),
                    None => None,
                }
            } else {
                None
            };
            let connector = connector.filter(|&from| from != lane);

            let active_lanes = lane_set(
                state
                    .occupied
                    .keys()
                    .copied()
                    .chain(std::iter::once(lane)),
            );

            let reserved_lanes = lane_set(
                state
                    .occupied
                    .iter()
                    .filter(|&(_, &seg)| seg != MAIN_SEGMENT && segments[seg].is_drained_at(row))
                    .map(|(&l, _)| l),
            );

            let ending: Vec<(LaneIdx, usize)> = state
                .occupied
                .iter()
                .filter(|&(_, &seg)| seg != MAIN_SEGMENT && segments[seg].subtree_end == row)
                .map(|(&l, &seg)| (l, seg))
                .collect();
            // A lane whose last fork is this row turns into the connector and
            // is only reserved from the next row on
            let forked_out = state.occupied.iter().filter(|&(_, &seg)| {
                seg != MAIN_SEGMENT
                    && seg != seg_id
                    && !segments[seg].is_drained_at(row)
                    && segments[seg].is_drained_at(row + 1)
            });
            let lanes_ending_this_row = lane_set(
                ending
                    .iter()
                    .map(|&(l, _)| l)
                    .chain(forked_out.map(|(&l, _)| l)),
            );

            let segment = &segments[seg_id];
            let (is_first_row_in_lane, is_last_row_in_lane) = if on_main || lane == 0 {
                (false, false)
            } else {
                (segment.first == row, row == segment.last && !segment.continues_below(row))
            };

            tracing::trace!(
                row,
                node = %node.id,
                lane,
                connector = ?connector,
                active = ?active_lanes,
                ending = ?lanes_ending_this_row,
                "lane assigned"
            );

            rows.push(RowInfo {
                node_id: node.id.clone(),
                node_lane: lane,
                connector_from_lane: connector,
                active_lanes,
                lanes_ending_this_row,
                reserved_lanes,
                is_first_row_in_lane,
                is_last_row_in_lane,
            });

            for (lane, seg) in ending {
                state.release(lane, seg);
            }
        }

        let layout = Layout::from_rows(rows);
        tracing::debug!(rows = layout.rows.len(), max_lanes = layout.max_lanes, "branch layout done");
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{NodeDetail, NodeKind};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use timeline_core::PrStatus;

    fn node(id: &str, branch: &str, parents: &[&str]) -> GraphNode {
        let kind = if branch == MAIN_BRANCH { NodeKind::MergedPr } else { NodeKind::OpenPr };
        GraphNode {
            id: id.to_string(),
            kind,
            branch_name: branch.to_string(),
            parent_ids: parents.iter().map(|p| p.to_string()).collect(),
            time_dimension: 0,
            sort_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            title: id.to_string(),
            url: None,
            color: "#000000".to_string(),
            tag: None,
            lane: None,
            detail: NodeDetail::PullRequest {
                number: 0,
                status: PrStatus::Merged,
            },
        }
    }

    fn issue(id: &str, branch: &str, parents: &[&str]) -> GraphNode {
        GraphNode {
            kind: NodeKind::Issue,
            ..node(id, branch, parents)
        }
    }

    fn lanes(layout: &Layout) -> Vec<LaneIdx> {
        layout.rows.iter().map(|r| r.node_lane).collect()
    }

    #[test]
    fn test_empty_graph() {
        let layout = BranchLaneCalculator::new().calculate(&[]);
        assert_eq!(layout.max_lanes, 1);
        assert!(layout.rows.is_empty());
    }

    #[test]
    fn test_linear_main_stays_on_lane_zero() {
        let nodes = vec![node("pr-2", "main", &[]), node("pr-3", "main", &[]), node("pr-1", "main", &[])];
        let layout = BranchLaneCalculator::new().calculate(&nodes);

        assert_eq!(lanes(&layout), vec![0, 0, 0]);
        assert_eq!(layout.max_lanes, 1);
        for row in &layout.rows {
            assert_eq!(row.active_lanes.as_slice(), &[0]);
            assert!(!row.is_first_row_in_lane);
            assert!(!row.is_last_row_in_lane);
            assert_eq!(row.connector_from_lane, None);
        }
    }

    #[test]
    fn test_closed_pr_forks_from_main() {
        let nodes = vec![node("pr-1", "main", &[]), node("pr-2", "fix", &["pr-1"])];
        let layout = BranchLaneCalculator::new().calculate(&nodes);
        let row = &layout.rows[1];

        assert_eq!(row.node_lane, 1);
        assert_eq!(row.connector_from_lane, Some(0));
        assert!(row.is_single_node_lane());
        assert_eq!(row.lanes_ending_this_row.as_slice(), &[1]);
        assert_eq!(row.active_lanes.as_slice(), &[0, 1]);
        assert_eq!(layout.max_lanes, 2);
    }

    #[test]
    fn test_open_pr_without_parent_connects_to_main() {
        let nodes = vec![node("pr-5", "feature/a", &[])];
        let layout = BranchLaneCalculator::new().calculate(&nodes);
        assert_eq!(layout.rows[0].connector_from_lane, Some(0));
    }

    #[test]
    fn test_orphan_issue_has_no_connector() {
        let nodes = vec![issue("issue-x", "issue/x", &[])];
        let layout = BranchLaneCalculator::new().calculate(&nodes);
        assert_eq!(layout.rows[0].node_lane, 1);
        assert_eq!(layout.rows[0].connector_from_lane, None);
    }

    #[test]
    fn test_finished_branch_lane_is_reused() {
        let nodes = vec![
            node("a1", "a", &[]),
            node("a2", "a", &[]),
            node("b1", "b", &[]),
        ];
        let layout = BranchLaneCalculator::new().calculate(&nodes);

        assert_eq!(lanes(&layout), vec![1, 1, 1]);
        assert!(layout.rows[0].is_first_row_in_lane);
        assert!(!layout.rows[0].is_last_row_in_lane);
        assert!(layout.rows[1].is_last_row_in_lane);
        assert!(layout.rows[2].is_first_row_in_lane);
        // The continuation draws no connector
        assert_eq!(layout.rows[1].connector_from_lane, None);
        assert_eq!(layout.rows[2].active_lanes.as_slice(), &[0, 1]);
    }

    #[test]
    fn test_concurrent_branches_get_different_lanes() {
        let nodes = vec![
            node("a1", "a", &[]),
            node("b1", "b", &[]),
            node("a2", "a", &[]),
            node("c1", "c", &[]),
        ];
        let layout = BranchLaneCalculator::new().calculate(&nodes);

        assert_eq!(lanes(&layout), vec![1, 2, 1, 1]);
        // a2 ends branch a; its lane is still active in its own row
        assert_eq!(layout.rows[2].active_lanes.as_slice(), &[0, 1]);
        assert_eq!(layout.rows[2].lanes_ending_this_row.as_slice(), &[1]);
        assert_eq!(layout.rows[3].active_lanes.as_slice(), &[0, 1]);
    }

    #[test]
    fn test_lane_held_until_forked_subtree_finishes() {
        // a: rows 0-1; d forks from a1 at row 2 and lasts until row 4; e
        // starts at row 3 and must not take a's lane
        let nodes = vec![
            issue("a1", "a", &[]),
            issue("a2", "a", &["a1"]),
            issue("d1", "d", &["a1"]),
            issue("e1", "e", &[]),
            issue("d2", "d", &["d1"]),
            issue("f1", "f", &[]),
        ];
        let layout = BranchLaneCalculator::new().calculate(&nodes);

        assert_eq!(lanes(&layout), vec![1, 1, 2, 3, 2, 1]);
        assert_eq!(layout.rows[2].connector_from_lane, Some(1));
        // a's line stops in the connector at its last fork
        assert!(layout.rows[2].is_ending(1));

        // a2 is a's last node, but the fork below keeps the line going
        assert!(!layout.rows[1].is_last_row_in_lane);
        // a's lane feeds the connector at row 2, then is only reserved
        assert!(!layout.rows[2].is_reserved(1));
        assert!(layout.rows[3].is_reserved(1));
        assert!(layout.rows[4].is_reserved(1));
        assert_eq!(layout.rows[4].lanes_ending_this_row.as_slice(), &[1, 2]);

        // Once the subtree is done lane 1 is free again
        assert!(layout.rows[5].is_first_row_in_lane);
        assert_eq!(layout.max_lanes, 4);
    }

    #[test]
    fn test_dangling_parent_is_ignored() {
        let nodes = vec![issue("issue-b", "issue/b", &["issue-gone"])];
        let layout = BranchLaneCalculator::new().calculate(&nodes);
        assert_eq!(layout.rows[0].connector_from_lane, None);
        assert_eq!(layout.rows[0].node_lane, 1);
    }

    #[test]
    fn test_precomputed_lane_is_used_verbatim() {
        let mut b = issue("b", "b", &["a"]);
        b.lane = Some(3);
        let nodes = vec![node("a", "main", &[]), b];
        let layout = BranchLaneCalculator::new().calculate(&nodes);

        assert_eq!(layout.rows[1].node_lane, 3);
        assert_eq!(layout.rows[1].connector_from_lane, Some(0));
        assert_eq!(layout.max_lanes, 4);
        assert_eq!(layout.lane_of("b"), Some(3));
    }

    #[test]
    fn test_lane_zero_always_active_never_flagged() {
        let nodes = vec![
            node("m1", "main", &[]),
            node("x", "x", &["m1"]),
            node("m2", "main", &[]),
            node("y", "y", &[]),
        ];
        let layout = BranchLaneCalculator::new().calculate(&nodes);
        for row in &layout.rows {
            assert!(row.is_active(0));
            assert!(!row.is_reserved(0));
            assert!(!row.is_ending(0));
            if row.node_lane == 0 {
                assert!(!row.is_first_row_in_lane && !row.is_last_row_in_lane);
            }
        }
    }
}
