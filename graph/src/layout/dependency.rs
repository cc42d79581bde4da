use super::{lane_set, LaneCalculator, LaneIdx, Layout, RowInfo};
use crate::core::GraphNode;
use std::collections::HashMap;

/// Lane calculator for the task graph.
///
/// Leaves (nodes nothing depends on) sit on lane 0 and every other node sits
/// one lane right of its highest child, so dependency chains read as a
/// staircase toward the trunk. Precomputed lanes are taken as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyLaneCalculator;

impl DependencyLaneCalculator {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Visit {
    Pending,
    InProgress,
    Done(LaneIdx),
}

/// Row interval a lane is drawn over: from a node down to its lowest child
#[derive(Debug, Clone, Copy)]
struct Span {
    lane: LaneIdx,
    start: usize,
    end: usize,
}

impl LaneCalculator for DependencyLaneCalculator {
    fn calculate(&self, nodes: &[GraphNode]) -> Layout {
        if nodes.is_empty() {
            return Layout::empty();
        }

        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(row, node)| (node.id.as_str(), row))
            .collect();

        // First resolvable parent per row, and children per row
        let mut first_parent: Vec<Option<usize>> = vec![None; nodes.len()];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        for (row, node) in nodes.iter().enumerate() {
            for parent_id in &node.parent_ids {
                match index.get(parent_id.as_str()) {
                    Some(&parent) if parent != row => {
                        if first_parent[row].is_none() {
                            first_parent[row] = Some(parent);
                        }
                        if !children[parent].contains(&row) {
                            children[parent].push(row);
                        }
                    }
                    Some(_) => {}
                    None => {
                        tracing::warn!(node = %node.id, parent = %parent_id, "parent not in task graph, treating as leaf");
                    }
                }
            }
        }

        let lanes = infer_lanes(nodes, &children);

        let mut spans: Vec<Span> = (0..nodes.len())
            .map(|row| {
                let lowest_child = children[row]
                    .iter()
                    .filter(|&&child| first_parent[child] == Some(row))
                    .copied()
                    .max()
                    .unwrap_or(row);
                Span {
                    lane: lanes[row],
                    start: row.min(lowest_child),
                    end: row.max(lowest_child),
                }
            })
            .filter(|span| span.lane != 0)
            .collect();
        spans.sort_by_key(|span| span.start);

        let below = Coverage::new(&spans, |s| (s.start, s.end));
        let above = Coverage::new(&spans, |s| (s.start + 1, s.end + 1));

        // Sweep spans by start row; `open` holds the spans covering `row`
        let mut next_span = 0;
        let mut open: Vec<Span> = Vec::new();
        let mut rows = Vec::with_capacity(nodes.len());

        for (row, node) in nodes.iter().enumerate() {
            while next_span < spans.len() && spans[next_span].start <= row {
                open.push(spans[next_span]);
                next_span += 1;
            }
            open.retain(|span| span.end >= row);

            let lane = lanes[row];
            let connector = first_parent[row]
                .map(|parent| lanes[parent])
                .filter(|&from| from != lane);

            let active_lanes = lane_set(
                std::iter::once(0)
                    .chain(std::iter::once(lane))
                    .chain(open.iter().map(|s| s.lane)),
            );
            let lanes_ending_this_row = lane_set(
                open.iter()
                    .map(|s| s.lane)
                    .filter(|&l| !below.contains(l, row)),
            );

            let (is_first_row_in_lane, is_last_row_in_lane) = if lane == 0 {
                (false, false)
            } else {
                (!above.contains(lane, row), !below.contains(lane, row))
            };

            rows.push(RowInfo {
                node_id: node.id.clone(),
                node_lane: lane,
                connector_from_lane: connector,
                active_lanes,
                lanes_ending_this_row,
                reserved_lanes: Default::default(),
                is_first_row_in_lane,
                is_last_row_in_lane,
            });
        }

        let layout = Layout::from_rows(rows);
        tracing::debug!(rows = layout.rows.len(), max_lanes = layout.max_lanes, "dependency layout done");
        layout
    }
}

/// Lane per row: precomputed, else 0 for a leaf, else 1 + highest child
/// lane. Post-order over an explicit stack so chain depth never touches the
/// call stack.
fn infer_lanes(nodes: &[GraphNode], children: &[Vec<usize>]) -> Vec<LaneIdx> {
    let mut visits = vec![Visit::Pending; nodes.len()];

    for root in 0..nodes.len() {
        if visits[root] != Visit::Pending {
            continue;
        }
        if let Some(lane) = nodes[root].lane {
            visits[root] = Visit::Done(lane);
            continue;
        }
        visits[root] = Visit::InProgress;
        let mut stack = vec![(root, 0usize)];

        while let Some(top) = stack.last_mut() {
            let (row, cursor) = *top;
            if let Some(&child) = children[row].get(cursor) {
                top.1 += 1;
                match visits[child] {
                    Visit::Pending => match nodes[child].lane {
                        Some(lane) => visits[child] = Visit::Done(lane),
                        None => {
                            visits[child] = Visit::InProgress;
                            stack.push((child, 0));
                        }
                    },
                    Visit::InProgress => {
                        tracing::warn!(node = %nodes[child].id, "dependency cycle, breaking at this node");
                    }
                    Visit::Done(_) => {}
                }
                continue;
            }

            stack.pop();
            let lane = children[row]
                .iter()
                .map(|&child| match visits[child] {
                    Visit::Done(lane) => lane + 1,
                    _ => 1,
                })
                .max()
                .unwrap_or(0);
            visits[row] = Visit::Done(lane);
        }
    }

    visits
        .into_iter()
        .map(|visit| match visit {
            Visit::Done(lane) => lane,
            _ => 0,
        })
        .collect()
}

/// Merged row intervals per lane, for "is this lane drawn at row" lookups
struct Coverage {
    by_lane: HashMap<LaneIdx, Vec<(usize, usize)>>,
}

impl Coverage {
    /// `bounds` maps a span to a half-open `[from, to)` row interval
    fn new(spans: &[Span], bounds: impl Fn(&Span) -> (usize, usize)) -> Self {
        let mut by_lane: HashMap<LaneIdx, Vec<(usize, usize)>> = HashMap::new();
        for span in spans {
            let (from, to) = bounds(span);
            if from < to {
                by_lane.entry(span.lane).or_default().push((from, to));
            }
        }

        for intervals in by_lane.values_mut() {
            intervals.sort_unstable();
            let mut merged: Vec<(usize, usize)> = Vec::with_capacity(intervals.len());
            for &(from, to) in intervals.iter() {
                match merged.last_mut() {
                    Some(last) if from <= last.1 => last.1 = last.1.max(to),
                    _ => merged.push((from, to)),
                }
            }
            *intervals = merged;
        }

        Self { by_lane }
    }

    fn contains(&self, lane: LaneIdx, row: usize) -> bool {
        self.by_lane.get(&lane).map_or(false, |intervals| {
            let idx = intervals.partition_point(|&(from, _)| from <= row);
            idx > 0 && row < intervals[idx - 1].1
        })
    }
}
