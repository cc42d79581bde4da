use chrono::{DateTime, Utc};
use timeline_core::{Issue, IssueStatus, IssueType, PrStatus, PullRequest};

/// Node id for a pull request (`pr-{number}`)
pub fn pr_node_id(number: u64) -> String {
    format!("pr-{}", number)
}

/// Node id for an issue (`issue-{id}`)
pub fn issue_node_id(issue_id: &str) -> String {
    format!("issue-{}", issue_id)
}

/// What a node stands for on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    MergedPr,
    ClosedPr,
    OpenPr,
    Issue,
    OrphanIssue,
}

impl NodeKind {
    pub fn is_pull_request(&self) -> bool {
        matches!(self, NodeKind::MergedPr | NodeKind::ClosedPr | NodeKind::OpenPr)
    }

    pub fn is_issue(&self) -> bool {
        matches!(self, NodeKind::Issue | NodeKind::OrphanIssue)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::MergedPr => "merged-pr",
            NodeKind::ClosedPr => "closed-pr",
            NodeKind::OpenPr => "open-pr",
            NodeKind::Issue => "issue",
            NodeKind::OrphanIssue => "orphan-issue",
        }
    }
}

/// Source-specific data carried by a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeDetail {
    PullRequest {
        number: u64,
        status: PrStatus,
    },
    Issue {
        issue_id: String,
        issue_type: IssueType,
        status: IssueStatus,
        priority: u8,
        is_actionable: bool,
    },
}

/// A commit-like unit on the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    /// Stable id (`pr-{number}` or `issue-{id}`)
    pub id: String,
    pub kind: NodeKind,
    /// Logical branch; "main" for the trunk
    pub branch_name: String,
    /// Nodes this one depends on or branches from
    pub parent_ids: Vec<String>,
    /// Coarse ordering axis: past PRs <= 0, open PRs = 1, issues >= 2
    pub time_dimension: i64,
    pub sort_date: DateTime<Utc>,
    pub title: String,
    pub url: Option<String>,
    pub color: String,
    pub tag: Option<String>,
    /// Precomputed lane; skips lane inference when present
    pub lane: Option<usize>,
    pub detail: NodeDetail,
}

impl GraphNode {
    pub fn from_pull_request(
        pr: &PullRequest,
        kind: NodeKind,
        branch_name: String,
        parent_ids: Vec<String>,
        time_dimension: i64,
    ) -> Self {
        let sort_date = match kind {
            NodeKind::OpenPr => pr.created_at,
            _ => pr.completed_at(),
        };

        Self {
            id: pr_node_id(pr.number),
            kind,
            branch_name,
            parent_ids,
            time_dimension,
            sort_date,
            title: pr.title.clone(),
            url: pr.url.clone(),
            color: pr_color(kind, pr.status).to_string(),
            tag: Some(format!("#{}", pr.number)),
            lane: None,
            detail: NodeDetail::PullRequest {
                number: pr.number,
                status: pr.status,
            },
        }
    }

    pub fn from_issue(
        issue: &Issue,
        kind: NodeKind,
        branch_name: String,
        parent_ids: Vec<String>,
        time_dimension: i64,
    ) -> Self {
        Self {
            id: issue_node_id(&issue.id),
            kind,
            branch_name,
            parent_ids,
            time_dimension,
            sort_date: issue.created_at,
            title: issue.title.clone(),
            url: issue.url.clone(),
            color: issue_color(issue.status).to_string(),
            tag: Some(issue.issue_type.label().to_string()),
            lane: None,
            detail: NodeDetail::Issue {
                issue_id: issue.id.clone(),
                issue_type: issue.issue_type,
                status: issue.status,
                priority: issue.priority,
                is_actionable: false,
            },
        }
    }

    pub fn with_lane(mut self, lane: usize) -> Self {
        self.lane = Some(lane);
        self
    }

    pub fn with_actionable(mut self, actionable: bool) -> Self {
        if let NodeDetail::Issue { is_actionable, .. } = &mut self.detail {
            *is_actionable = actionable;
        }
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    pub fn first_parent(&self) -> Option<&str> {
        self.parent_ids.first().map(String::as_str)
    }

    pub fn is_actionable(&self) -> bool {
        matches!(self.detail, NodeDetail::Issue { is_actionable: true, .. })
    }
}

fn pr_color(kind: NodeKind, status: PrStatus) -> &'static str {
    match (kind, status) {
        (NodeKind::MergedPr, _) => "#8250df",
        (NodeKind::ClosedPr, _) => "#cf222e",
        (_, PrStatus::ChecksFailing) => "#cf222e",
        _ => "#1a7f37",
    }
}

fn issue_color(status: IssueStatus) -> &'static str {
    match status {
        IssueStatus::Open => "#0969da",
        IssueStatus::InProgress => "#bf8700",
        IssueStatus::Blocked => "#cf222e",
        IssueStatus::Closed => "#6e7781",
    }
}
