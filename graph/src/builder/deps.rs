use crate::error::{GraphError, Result};
use std::collections::HashMap;
use timeline_core::Issue;

/// Parent/child index over a set of issues.
///
/// Only references between issues of the set become edges. Declared
/// parents outside the set are kept by the callers for display but play no
/// part in ordering.
pub(crate) struct IssueDeps<'a> {
    pub issues: Vec<&'a Issue>,
    /// Present parents per issue, de-duplicated, in declaration order
    pub parents: Vec<Vec<usize>>,
    /// Children per issue, in input order
    pub children: Vec<Vec<usize>>,
}

impl<'a> IssueDeps<'a> {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = &'a Issue>,
    {
        let mut unique: Vec<&'a Issue> = Vec::new();
        let mut index: HashMap<&'a str, usize> = HashMap::new();

        for issue in issues {
            if index.contains_key(issue.id.as_str()) {
                tracing::warn!(issue = %issue.id, "duplicate issue id, keeping first occurrence");
                continue;
            }
            index.insert(issue.id.as_str(), unique.len());
            unique.push(issue);
        }

        let mut parents = vec![Vec::new(); unique.len()];
        let mut children = vec![Vec::new(); unique.len()];

        for (idx, issue) in unique.iter().enumerate() {
            for parent_id in &issue.parents {
                match index.get(parent_id.as_str()) {
                    Some(&parent) if !parents[idx].contains(&parent) => {
                        parents[idx].push(parent);
                        children[parent].push(idx);
                    }
                    Some(_) => {}
                    None => {
                        tracing::warn!(issue = %issue.id, parent = %parent_id, "parent issue not in set");
                    }
                }
            }
        }

        Self {
            issues: unique,
            parents,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Part of a dependency chain: declares a parent or is one
    pub fn is_linked(&self, idx: usize) -> bool {
        !self.issues[idx].parents.is_empty() || !self.children[idx].is_empty()
    }

    /// Depth-first order over linked issues, seeded at roots in input order.
    /// A child is emitted once its last present parent has been emitted.
    pub fn dependency_order(&self) -> Result<Vec<usize>> {
        let mut remaining: Vec<usize> = self.parents.iter().map(Vec::len).collect();
        let mut emitted = vec![false; self.len()];
        let mut order = Vec::new();

        let roots = (0..self.len()).filter(|&idx| self.is_linked(idx) && self.parents[idx].is_empty());

        for root in roots {
            emitted[root] = true;
            order.push(root);
            let mut stack = vec![(root, 0usize)];

            while let Some(top) = stack.last_mut() {
                let (node, cursor) = *top;
                if cursor >= self.children[node].len() {
                    stack.pop();
                    continue;
                }
                top.1 += 1;

                let child = self.children[node][cursor];
                remaining[child] -= 1;
                if remaining[child] == 0 && !emitted[child] {
                    emitted[child] = true;
                    order.push(child);
                    stack.push((child, 0));
                }
            }
        }

        let mut stuck: Vec<String> = (0..self.len())
            .filter(|&idx| self.is_linked(idx) && !emitted[idx])
            .map(|idx| self.issues[idx].id.clone())
            .collect();

        if !stuck.is_empty() {
            stuck.sort();
            tracing::warn!(issues = ?stuck, "dependency cycle detected");
            return Err(GraphError::DependencyCycle { issue_ids: stuck });
        }

        Ok(order)
    }

    /// Longest chain of present parents above each issue, given an order in
    /// which parents precede children.
    pub fn depths(&self, order: &[usize]) -> Vec<usize> {
        let mut depth = vec![0; self.len()];
        for &idx in order {
            depth[idx] = self.parents[idx]
                .iter()
                .map(|&parent| depth[parent] + 1)
                .max()
                .unwrap_or(0);
        }
        depth
    }
}
