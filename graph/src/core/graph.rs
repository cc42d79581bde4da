use super::{branch::{Branch, MAIN_BRANCH}, node::GraphNode};
use std::collections::{BTreeMap, HashMap};

/// Ordered node sequence plus the branches those nodes live on.
///
/// The node order is the rendering order. It is fixed by the builder and
/// never re-sorted by the layout or render stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub branches: BTreeMap<String, Branch>,
}

impl Graph {
    /// Empty graph; still carries the main branch
    pub fn new() -> Self {
        let mut branches = BTreeMap::new();
        branches.insert(MAIN_BRANCH.to_string(), Branch::main());
        Self {
            nodes: Vec::new(),
            branches,
        }
    }

    /// Build a graph from already-ordered nodes, deriving one branch per
    /// distinct non-main branch name. Colors cycle through `palette` in
    /// order of first appearance.
    pub fn from_nodes(nodes: Vec<GraphNode>, palette: &[String]) -> Self {
        let mut graph = Self::new();

        for node in &nodes {
            if node.branch_name == MAIN_BRANCH || graph.branches.contains_key(&node.branch_name) {
                continue;
            }
            let color = if palette.is_empty() {
                node.color.clone()
            } else {
                palette[(graph.branches.len() - 1) % palette.len()].clone()
            };
            let branch = Branch::forked(
                node.branch_name.clone(),
                color,
                node.first_parent().map(str::to_string),
            );
            graph.branches.insert(node.branch_name.clone(), branch);
        }

        graph.nodes = nodes;
        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Node id -> row index
    pub fn index(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(row, node)| (node.id.as_str(), row))
            .collect()
    }

    pub fn main_branch(&self) -> Option<&Branch> {
        self.branches.get(MAIN_BRANCH)
    }

    /// Parent references that do not resolve inside this graph
    pub fn dangling_references(&self) -> Vec<(&str, &str)> {
        let index = self.index();
        self.nodes
            .iter()
            .flat_map(|node| {
                node.parent_ids
                    .iter()
                    .filter(|parent| !index.contains_key(parent.as_str()))
                    .map(move |parent| (node.id.as_str(), parent.as_str()))
            })
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_nodes: self.nodes.len(),
            pull_requests: self.nodes.iter().filter(|n| n.kind.is_pull_request()).count(),
            issues: self.nodes.iter().filter(|n| n.kind.is_issue()).count(),
            branches: self.branches.len(),
            dangling_references: self.dangling_references().len(),
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub pull_requests: usize,
    pub issues: usize,
    pub branches: usize,
    pub dangling_references: usize,
}
