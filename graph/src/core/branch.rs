/// Name of the trunk branch; always lane 0
pub const MAIN_BRANCH: &str = "main";

pub const MAIN_BRANCH_COLOR: &str = "#57606a";

/// A named line of work forked from another branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub color: String,
    /// Branch this one forked from; `None` for main
    pub parent_branch: Option<String>,
    /// Node the branch's first node connects from
    pub parent_commit_id: Option<String>,
}

impl Branch {
    pub fn main() -> Self {
        Self {
            name: MAIN_BRANCH.to_string(),
            color: MAIN_BRANCH_COLOR.to_string(),
            parent_branch: None,
            parent_commit_id: None,
        }
    }

    pub fn forked(name: String, color: String, parent_commit_id: Option<String>) -> Self {
        Self {
            name,
            color,
            parent_branch: Some(MAIN_BRANCH.to_string()),
            parent_commit_id,
        }
    }

    pub fn is_main(&self) -> bool {
        self.name == MAIN_BRANCH
    }
}
