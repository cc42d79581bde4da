use crate::core::{GraphNode, NodeDetail, NodeKind};
use timeline_core::{IssueStatus, PrStatus};

/// Shape drawn at a node's position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    /// Pull request
    Circle,
    /// Issue
    Diamond,
    /// "+" button for loading older history
    LoadMore,
}

/// Visual treatment of one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStyle {
    pub shape: NodeShape,
    pub color: String,
    /// Outline only
    pub hollow: bool,
    /// Cross drawn over the shape
    pub error: bool,
    /// Pulsing ring around the shape
    pub actionable: bool,
    pub title: Option<String>,
}

impl NodeStyle {
    pub fn circle(color: impl Into<String>) -> Self {
        Self {
            shape: NodeShape::Circle,
            color: color.into(),
            hollow: false,
            error: false,
            actionable: false,
            title: None,
        }
    }

    pub fn diamond(color: impl Into<String>) -> Self {
        Self {
            shape: NodeShape::Diamond,
            ..Self::circle(color)
        }
    }

    pub fn load_more() -> Self {
        Self {
            shape: NodeShape::LoadMore,
            ..Self::circle("#8c959f")
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn failed(mut self) -> Self {
        self.hollow = true;
        self.error = true;
        self
    }

    /// Style for a graph node, derived from its kind and status
    pub fn for_node(node: &GraphNode) -> Self {
        let base = if node.kind.is_pull_request() {
            Self::circle(node.color.clone())
        } else {
            Self::diamond(node.color.clone())
        };
        let mut style = base.with_title(node.title.clone());

        match &node.detail {
            NodeDetail::PullRequest { status, .. } => {
                if node.kind == NodeKind::ClosedPr || *status == PrStatus::ChecksFailing {
                    style = style.failed();
                }
            }
            NodeDetail::Issue {
                status,
                is_actionable,
                ..
            } => {
                if *status == IssueStatus::Blocked {
                    style = style.failed();
                }
                style.actionable = *is_actionable;
            }
        }
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TimelineBuilder;
    use chrono::{TimeZone, Utc};
    use timeline_core::{Issue, IssueType, PullRequest};

    fn pr(number: u64, status: PrStatus) -> PullRequest {
        let at = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        PullRequest {
            number,
            title: "t".to_string(),
            status,
            branch: format!("b{}", number),
            url: None,
            created_at: at,
            updated_at: at,
            merged_at: None,
            closed_at: None,
        }
    }

    #[test]
    fn test_pr_styles() {
        let prs = vec![pr(1, PrStatus::Closed), pr(2, PrStatus::ChecksFailing), pr(3, PrStatus::Approved)];
        let graph = TimelineBuilder::new().build(&prs, &[]).unwrap().graph;

        let closed = NodeStyle::for_node(graph.get("pr-1").unwrap());
        assert_eq!(closed.shape, NodeShape::Circle);
        assert!(closed.hollow && closed.error);

        let failing = NodeStyle::for_node(graph.get("pr-2").unwrap());
        assert!(failing.error);

        let fine = NodeStyle::for_node(graph.get("pr-3").unwrap());
        assert!(!fine.hollow && !fine.error);
        assert_eq!(fine.title.as_deref(), Some("t"));
    }

    #[test]
    fn test_issue_styles() {
        let at = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let issue = Issue {
            id: "x".to_string(),
            title: "Blocked".to_string(),
            issue_type: IssueType::Bug,
            status: IssueStatus::Blocked,
            priority: 0,
            url: None,
            created_at: at,
            updated_at: at,
            parents: Vec::new(),
        };
        let graph = TimelineBuilder::new().build(&[], &[issue]).unwrap().graph;
        let style = NodeStyle::for_node(&graph.nodes[0]);

        assert_eq!(style.shape, NodeShape::Diamond);
        assert!(style.hollow && style.error);
        assert!(!style.actionable);

        let actionable = NodeStyle::for_node(&graph.nodes[0].clone().with_actionable(true));
        assert!(actionable.actionable);
    }
}
