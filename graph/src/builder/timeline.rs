use super::deps::IssueDeps;
use crate::core::{issue_node_id, Graph, GraphNode, NodeKind, MAIN_BRANCH};
use crate::error::Result;
use timeline_core::{config::DEFAULT_BRANCH_PALETTE, Issue, PullRequest, TimelineConfig};

/// Time dimension of open pull requests
pub const OPEN_PR_DIMENSION: i64 = 1;
/// Lowest time dimension used by issues
pub const ISSUE_DIMENSION: i64 = 2;

/// A built timeline plus the past-PR paging state
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineGraph {
    pub graph: Graph,
    /// More merged/closed PRs exist than were shown
    pub has_more_past_prs: bool,
    pub total_past_prs_shown: usize,
    pub total_past_prs: usize,
}

/// Builds the full PR + issue timeline
#[derive(Debug, Clone)]
pub struct TimelineBuilder {
    max_past_prs: Option<usize>,
    palette: Vec<String>,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self {
            max_past_prs: None,
            palette: DEFAULT_BRANCH_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn from_config(config: &TimelineConfig) -> Self {
        Self::new()
            .max_past_prs(config.max_past_prs())
            .palette(config.palette.branches.clone())
    }

    /// Cap the number of merged/closed PRs; `None` or 0 keeps all
    pub fn max_past_prs(mut self, max: Option<usize>) -> Self {
        self.max_past_prs = max.filter(|&n| n > 0);
        self
    }

    pub fn palette(mut self, palette: Vec<String>) -> Self {
        self.palette = palette;
        self
    }

    /// Build the timeline. Fails only on a cycle in issue parents.
    pub fn build(&self, pull_requests: &[PullRequest], issues: &[Issue]) -> Result<TimelineGraph> {
        let (past, open): (Vec<&PullRequest>, Vec<&PullRequest>) =
            pull_requests.iter().partition(|pr| pr.is_past());

        let total_past_prs = past.len();
        let past = self.select_past(past);
        let has_more_past_prs = past.len() < total_past_prs;

        let mut nodes = Vec::with_capacity(pull_requests.len() + issues.len());
        push_past_prs(&mut nodes, &past);
        push_open_prs(&mut nodes, open);
        push_issues(&mut nodes, issues)?;

        tracing::debug!(
            nodes = nodes.len(),
            past_shown = past.len(),
            total_past_prs,
            "built timeline"
        );

        Ok(TimelineGraph {
            graph: Graph::from_nodes(nodes, &self.palette),
            has_more_past_prs,
            total_past_prs_shown: past.len(),
            total_past_prs,
        })
    }

    /// Oldest first, trimmed to the most recent `max_past_prs`
    fn select_past<'a>(&self, mut past: Vec<&'a PullRequest>) -> Vec<&'a PullRequest> {
        past.sort_by_key(|pr| pr.completed_at());
        match self.max_past_prs {
            Some(max) if past.len() > max => past.split_off(past.len() - max),
            _ => past,
        }
    }
}

impl Default for TimelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn own_branch(pr: &PullRequest) -> String {
    if pr.branch.is_empty() || pr.branch == MAIN_BRANCH {
        format!("pr/{}", pr.number)
    } else {
        pr.branch.clone()
    }
}

fn push_past_prs(nodes: &mut Vec<GraphNode>, past: &[&PullRequest]) {
    let newest = past.len() as i64 - 1;
    let mut last_merged: Option<String> = None;

    for (idx, pr) in past.iter().enumerate() {
        let dimension = idx as i64 - newest;
        let node = if pr.is_merged() {
            let node = GraphNode::from_pull_request(
                pr,
                NodeKind::MergedPr,
                MAIN_BRANCH.to_string(),
                Vec::new(),
                dimension,
            );
            last_merged = Some(node.id.clone());
            node
        } else {
            GraphNode::from_pull_request(
                pr,
                NodeKind::ClosedPr,
                own_branch(pr),
                last_merged.iter().cloned().collect(),
                dimension,
            )
        };
        nodes.push(node);
    }
}

fn push_open_prs(nodes: &mut Vec<GraphNode>, mut open: Vec<&PullRequest>) {
    open.sort_by_key(|pr| pr.created_at);
    for pr in open {
        nodes.push(GraphNode::from_pull_request(
            pr,
            NodeKind::OpenPr,
            own_branch(pr),
            Vec::new(),
            OPEN_PR_DIMENSION,
        ));
    }
}

fn push_issues(nodes: &mut Vec<GraphNode>, issues: &[Issue]) -> Result<()> {
    let deps = IssueDeps::new(issues);
    let order = deps.dependency_order()?;
    let depths = deps.depths(&order);

    let mut branches: Vec<Option<String>> = vec![None; deps.len()];
    let mut continued = vec![false; deps.len()];
    let mut max_dimension = None;

    for &idx in &order {
        let issue = deps.issues[idx];

        // The first child of a parent carries on the parent's branch
        let inherited = deps.parents[idx].first().and_then(|&parent| {
            if continued[parent] {
                return None;
            }
            continued[parent] = true;
            branches[parent].clone()
        });
        let branch = inherited.unwrap_or_else(|| issue_branch(&issue.id));
        branches[idx] = Some(branch.clone());

        let dimension = ISSUE_DIMENSION + depths[idx] as i64;
        max_dimension = max_dimension.max(Some(dimension));

        nodes.push(GraphNode::from_issue(
            issue,
            NodeKind::Issue,
            branch,
            declared_parents(issue),
            dimension,
        ));
    }

    let orphan_dimension = max_dimension.map_or(ISSUE_DIMENSION, |d| d + 1);
    let mut orphans: Vec<&Issue> = (0..deps.len())
        .filter(|&idx| !deps.is_linked(idx))
        .map(|idx| deps.issues[idx])
        .collect();
    orphans.sort_by_key(|issue| issue.created_at);

    for issue in orphans {
        nodes.push(GraphNode::from_issue(
            issue,
            NodeKind::OrphanIssue,
            issue_branch(&issue.id),
            Vec::new(),
            orphan_dimension,
        ));
    }

    Ok(())
}

fn issue_branch(issue_id: &str) -> String {
    format!("issue/{}", issue_id)
}

/// Every declared parent, missing ones included, without repeats
fn declared_parents(issue: &Issue) -> Vec<String> {
    let mut parents: Vec<String> = Vec::with_capacity(issue.parents.len());
    for parent in &issue.parents {
        let id = issue_node_id(parent);
        if !parents.contains(&id) {
            parents.push(id);
        }
    }
    parents
}
