//! Group walk and project collection.

use std::collections::BTreeMap;

use tracing::info;

use crate::Result;
use crate::api::{GitlabApi, Group};
use crate::config::RunConfig;

/// A project found under one of the kept groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: u64,
    pub name: String,
    pub path_with_namespace: String,
}

impl ProjectRef {
    /// Full path of the owning group (namespace part of the project path).
    /// Groups a project is merely shared into do not count.
    #[must_use]
    pub fn group_path(&self) -> &str {
        self.path_with_namespace
            .rsplit_once('/')
            .map_or("", |(group, _)| group)
    }
}

/// Outcome of the include/exclude gates for one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupDecision {
    Keep,
    NotIncluded,
    Excluded,
}

/// A group passes iff it contains `include_path` (when set) and does not
/// contain `exclude_path` (when set).
#[must_use]
pub fn group_decision(full_path: &str, include_path: &str, exclude_path: &str) -> GroupDecision {
    if !include_path.is_empty() && !full_path.contains(include_path) {
        GroupDecision::NotIncluded
    } else if !exclude_path.is_empty() && full_path.contains(exclude_path) {
        GroupDecision::Excluded
    } else {
        GroupDecision::Keep
    }
}

/// Distinct projects keyed and ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectSet {
    projects: BTreeMap<u64, ProjectRef>,
}

impl ProjectSet {
    /// Insert or replace the entry for `project.id`.
    pub fn insert(&mut self, project: ProjectRef) {
        self.projects.insert(project.id, project);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Projects in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectRef> {
        self.projects.values()
    }
}

fn keep_group(group: &Group, config: &RunConfig) -> bool {
    match group_decision(&group.full_path, &config.include_path, &config.exclude_path) {
        GroupDecision::Keep => true,
        GroupDecision::NotIncluded => {
            info!(
                "Skipping group {} because include_path {} excludes it",
                group.full_path, config.include_path
            );
            false
        }
        GroupDecision::Excluded => {
            info!(
                "Skipping group {} because exclude_path {} requires it",
                group.full_path, config.exclude_path
            );
            false
        }
    }
}

/// Walk all groups and collect the projects of those passing the path gates.
///
/// # Errors
/// Returns the first upstream error hit while listing groups or projects.
pub fn enumerate_projects(api: &impl GitlabApi, config: &RunConfig) -> Result<ProjectSet> {
    let groups: Vec<Group> = api.groups().collect::<Result<_>>()?;
    info!("Got {} groups", groups.len());

    let mut projects = ProjectSet::default();
    for group in groups.iter().filter(|g| keep_group(g, config)) {
        for summary in api.group_projects(group.id) {
            let summary = summary?;
            info!("Adding project {} to the buffer", summary.path_with_namespace);
            projects.insert(ProjectRef {
                id: summary.id,
                name: summary.name,
                path_with_namespace: summary.path_with_namespace,
            });
        }
    }

    info!("Got {} projects to fetch details for", projects.len());
    Ok(projects)
}

#[cfg(test)]
#[path = "hierarchy_tests.rs"]
mod tests;
