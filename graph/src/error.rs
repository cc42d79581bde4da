use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    /// Issue parent references loop back on themselves. Carries every issue
    /// id that could not be ordered, sorted.
    #[error("dependency cycle among issues: {}", issue_ids.join(", "))]
    DependencyCycle { issue_ids: Vec<String> },
}

pub type Result<T> = std::result::Result<T, GraphError>;
