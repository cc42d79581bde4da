//! Stable JSON shape handed to UI consumers.
//!
//! Commit hashes are the node ids themselves (`pr-{number}`,
//! `issue-{id}`), so documents built from the same records diff cleanly.

use crate::builder::TimelineGraph;
use crate::core::{Branch, Graph, GraphNode, MAIN_BRANCH};
use crate::layout::Layout;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGraph {
    pub commits: Vec<WireCommit>,
    pub branches: Vec<WireBranch>,
    pub main_branch_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_more_past_prs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_past_prs_shown: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lanes: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCommit {
    pub hash: String,
    pub parent_ids: Vec<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub branch: String,
    pub kind: String,
    pub time_dimension: i64,
    pub sort_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBranch {
    pub name: String,
    pub color: String,
    pub parent_branch: Option<String>,
    pub parent_commit_id: Option<String>,
}

impl From<&GraphNode> for WireCommit {
    fn from(node: &GraphNode) -> Self {
        Self {
            hash: node.id.clone(),
            parent_ids: node.parent_ids.clone(),
            title: node.title.clone(),
            url: node.url.clone(),
            color: node.color.clone(),
            tag: node.tag.clone(),
            branch: node.branch_name.clone(),
            kind: node.kind.as_str().to_string(),
            time_dimension: node.time_dimension,
            sort_date: node.sort_date,
            lane: None,
        }
    }
}

impl From<&Branch> for WireBranch {
    fn from(branch: &Branch) -> Self {
        Self {
            name: branch.name.clone(),
            color: branch.color.clone(),
            parent_branch: branch.parent_branch.clone(),
            parent_commit_id: branch.parent_commit_id.clone(),
        }
    }
}

/// Map a graph to its wire form. Main is listed first, the remaining
/// branches follow by name.
pub fn to_wire(graph: &Graph) -> WireGraph {
    let main = graph.branches.get(MAIN_BRANCH).map(WireBranch::from);
    let others = graph
        .branches
        .values()
        .filter(|branch| !branch.is_main())
        .map(WireBranch::from);

    WireGraph {
        commits: graph.nodes.iter().map(WireCommit::from).collect(),
        branches: main.into_iter().chain(others).collect(),
        main_branch_name: MAIN_BRANCH.to_string(),
        has_more_past_prs: None,
        total_past_prs_shown: None,
        max_lanes: None,
    }
}

/// Like [`to_wire`], with each commit's lane and the document's lane count
pub fn to_wire_with_layout(graph: &Graph, layout: &Layout) -> WireGraph {
    let mut wire = to_wire(graph);
    for commit in &mut wire.commits {
        commit.lane = layout.lane_of(&commit.hash);
    }
    wire.max_lanes = Some(layout.max_lanes);
    wire
}

/// Wire form of a timeline, including its past-PR paging state
pub fn from_timeline(timeline: &TimelineGraph, layout: Option<&Layout>) -> WireGraph {
    let mut wire = match layout {
        Some(layout) => to_wire_with_layout(&timeline.graph, layout),
        None => to_wire(&timeline.graph),
    };
    wire.has_more_past_prs = Some(timeline.has_more_past_prs);
    wire.total_past_prs_shown = Some(timeline.total_past_prs_shown);
    wire
}

impl WireGraph {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn commit(&self, hash: &str) -> Option<&WireCommit> {
        self.commits.iter().find(|commit| commit.hash == hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TimelineBuilder;
    use crate::layout::{BranchLaneCalculator, LaneCalculator};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use timeline_core::{Issue, IssueStatus, IssueType, PrStatus, PullRequest};

    fn merged(number: u64, d: u32) -> PullRequest {
        let at = Utc.with_ymd_and_hms(2024, 6, d, 12, 0, 0).unwrap();
        PullRequest {
            number,
            title: format!("PR {}", number),
            status: PrStatus::Merged,
            branch: format!("feature/{}", number),
            url: Some(format!("https://example.test/pull/{}", number)),
            created_at: at,
            updated_at: at,
            merged_at: Some(at),
            closed_at: None,
        }
    }

    fn issue(id: &str, parents: &[&str]) -> Issue {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        Issue {
            id: id.to_string(),
            title: format!("Issue {}", id),
            issue_type: IssueType::Task,
            status: IssueStatus::Open,
            priority: 1,
            url: None,
            created_at: at,
            updated_at: at,
            parents: parents.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn sample() -> TimelineGraph {
        let prs = vec![merged(1, 1), merged(2, 2)];
        let issues = vec![issue("ISSUE-001", &[]), issue("ISSUE-002", &["ISSUE-001"])];
        TimelineBuilder::new().build(&prs, &issues).unwrap()
    }

    #[test]
    fn test_hashes_are_node_ids() {
        let wire = to_wire(&sample().graph);
        let hashes: Vec<&str> = wire.commits.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, vec!["pr-1", "pr-2", "issue-ISSUE-001", "issue-ISSUE-002"]);

        let child = wire.commit("issue-ISSUE-002").unwrap();
        assert_eq!(child.parent_ids, vec!["issue-ISSUE-001".to_string()]);
        for commit in &wire.commits {
            for parent in &commit.parent_ids {
                assert!(wire.commit(parent).is_some(), "{} has unknown parent {}", commit.hash, parent);
            }
        }
    }

    #[test]
    fn test_main_branch_listed_first() {
        let wire = to_wire(&sample().graph);
        assert_eq!(wire.main_branch_name, "main");
        assert_eq!(wire.branches[0].name, "main");
        assert_eq!(wire.branches[0].parent_branch, None);
        for branch in &wire.branches[1..] {
            assert_eq!(branch.parent_branch.as_deref(), Some("main"));
        }
    }

    #[test]
    fn test_json_field_names() {
        let timeline = sample();
        let json = from_timeline(&timeline, None).to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["mainBranchName"], "main");
        assert_eq!(value["hasMorePastPrs"], false);
        assert_eq!(value["totalPastPrsShown"], 2);
        assert!(value.get("maxLanes").is_none());

        let first = &value["commits"][0];
        assert_eq!(first["hash"], "pr-1");
        assert_eq!(first["parentIds"], serde_json::json!([]));
        assert_eq!(first["kind"], "merged-pr");
        assert_eq!(first["timeDimension"], -1);
        assert!(first.get("lane").is_none());
        assert!(value["commits"][2].get("url").is_none());
    }

    #[test]
    fn test_layout_adds_lanes() {
        let timeline = sample();
        let layout = BranchLaneCalculator::new().calculate(&timeline.graph.nodes);
        let wire = from_timeline(&timeline, Some(&layout));

        assert_eq!(wire.max_lanes, Some(layout.max_lanes));
        assert_eq!(wire.commit("pr-1").unwrap().lane, Some(0));
        assert!(wire.commits.iter().all(|c| c.lane.is_some()));
    }

    #[test]
    fn test_json_parses_back() {
        let wire = to_wire(&sample().graph);
        let parsed = WireGraph::from_json(&wire.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, wire);
    }

    #[test]
    fn test_empty_graph() {
        let wire = to_wire(&Graph::new());
        assert!(wire.commits.is_empty());
        assert_eq!(wire.branches.len(), 1);
    }
}
