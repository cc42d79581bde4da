use super::deps::IssueDeps;
use super::timeline::ISSUE_DIMENSION;
use crate::core::{issue_node_id, Graph, GraphNode, NodeKind};
use crate::error::Result;
use std::collections::HashSet;
use timeline_core::{config::DEFAULT_BRANCH_PALETTE, TaskGraphEntry};

/// Builds the issue-dependency ("task") graph from precomputed entries.
///
/// Lanes and rows come from upstream; each node becomes its own branch.
#[derive(Debug, Clone)]
pub struct TaskGraphBuilder {
    palette: Vec<String>,
}

impl TaskGraphBuilder {
    pub fn new() -> Self {
        Self {
            palette: DEFAULT_BRANCH_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn palette(mut self, palette: Vec<String>) -> Self {
        self.palette = palette;
        self
    }

    pub fn build(&self, entries: &[TaskGraphEntry]) -> Result<Graph> {
        // Ordering is by row, but a cycle is still bad input
        IssueDeps::new(entries.iter().map(|entry| &entry.issue)).dependency_order()?;

        let present: HashSet<&str> = entries.iter().map(|e| e.issue.id.as_str()).collect();
        let mut seen: HashSet<&str> = HashSet::new();

        let mut rows: Vec<(usize, GraphNode)> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !seen.insert(entry.issue.id.as_str()) {
                continue;
            }

            let mut parent_ids: Vec<String> = Vec::new();
            for parent in &entry.issue.parents {
                let id = issue_node_id(parent);
                if present.contains(parent.as_str()) && !parent_ids.contains(&id) {
                    parent_ids.push(id);
                }
            }

            let branch = issue_node_id(&entry.issue.id);
            let node = GraphNode::from_issue(
                &entry.issue,
                NodeKind::Issue,
                branch,
                parent_ids,
                ISSUE_DIMENSION,
            )
            .with_lane(entry.lane)
            .with_actionable(entry.is_actionable);

            rows.push((entry.row, node));
        }

        rows.sort_by(|(row_a, a), (row_b, b)| row_a.cmp(row_b).then_with(|| a.id.cmp(&b.id)));
        let nodes: Vec<GraphNode> = rows.into_iter().map(|(_, node)| node).collect();

        tracing::debug!(nodes = nodes.len(), "built task graph");
        Ok(Graph::from_nodes(nodes, &self.palette))
    }
}

impl Default for TaskGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
