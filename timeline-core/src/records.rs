use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Review/merge state of a pull request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PrStatus {
    Draft,
    InProgress,
    ReadyForReview,
    ChangesRequested,
    Approved,
    ChecksFailing,
    Merged,
    Closed,
}

impl PrStatus {
    /// Merged or closed PRs belong to the history part of the timeline
    pub fn is_past(&self) -> bool {
        matches!(self, PrStatus::Merged | PrStatus::Closed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrStatus::Draft => "draft",
            PrStatus::InProgress => "in progress",
            PrStatus::ReadyForReview => "ready for review",
            PrStatus::ChangesRequested => "changes requested",
            PrStatus::Approved => "approved",
            PrStatus::ChecksFailing => "checks failing",
            PrStatus::Merged => "merged",
            PrStatus::Closed => "closed",
        }
    }
}

/// A pull request as reported by the source-control host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub status: PrStatus,
    pub branch: String,
    #[serde(default)]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.status == PrStatus::Merged || self.merged_at.is_some()
    }

    pub fn is_past(&self) -> bool {
        self.status.is_past() || self.merged_at.is_some()
    }

    /// Date used to order merged/closed PRs
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.merged_at
            .or(self.closed_at)
            .unwrap_or(self.updated_at)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    InProgress,
    Blocked,
    Closed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Task,
    Bug,
    Feature,
    Epic,
    Chore,
}

impl IssueType {
    pub fn label(&self) -> &'static str {
        match self {
            IssueType::Task => "task",
            IssueType::Bug => "bug",
            IssueType::Feature => "feature",
            IssueType::Epic => "epic",
            IssueType::Chore => "chore",
        }
    }
}

/// A work item from the ticket tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub issue_type: IssueType,
    pub status: IssueStatus,
    /// 0 is the highest priority
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Issues this one depends on, in declaration order
    #[serde(default)]
    pub parents: Vec<String>,
}

/// One entry of a precomputed issue-dependency graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGraphEntry {
    pub issue: Issue,
    pub lane: usize,
    pub row: usize,
    #[serde(default)]
    pub is_actionable: bool,
}

/// Everything the timeline needs for one project, already fetched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub pull_requests: Vec<PullRequest>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl Snapshot {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse snapshot")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        Self::from_json_str(&json)
    }
}

/// Load a task-graph document (a JSON array of entries)
pub fn load_task_graph<P: AsRef<Path>>(path: P) -> Result<Vec<TaskGraphEntry>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read task graph {}", path.display()))?;
    serde_json::from_str(&json).context("Failed to parse task graph")
}
