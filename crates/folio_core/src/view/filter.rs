//! Project search and technology filter.

use crate::model::entry::ProjectEntry;
use std::collections::HashSet;

/// Technology tag selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TechFilter {
    #[default]
    All,
    /// Case-insensitive exact tag match.
    Tag(String),
}

/// Search box plus tag buttons of the projects section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    /// Case-insensitive substring over title, description and tags.
    pub query: String,
    pub tech: TechFilter,
}

impl ProjectFilter {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            tech: TechFilter::All,
        }
    }

    pub fn tech(tag: impl Into<String>) -> Self {
        Self {
            query: String::new(),
            tech: TechFilter::Tag(tag.into()),
        }
    }

    pub fn matches(&self, project: &ProjectEntry) -> bool {
        self.matches_query(project) && self.matches_tech(project)
    }

    /// Keeps matching projects in collection order.
    pub fn apply<'a>(&self, projects: &'a [ProjectEntry]) -> Vec<&'a ProjectEntry> {
        projects
            .iter()
            .filter(|project| self.matches(project))
            .collect()
    }

    fn matches_query(&self, project: &ProjectEntry) -> bool {
        let needle = self.query.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        project.title.to_lowercase().contains(&needle)
            || project.description.to_lowercase().contains(&needle)
            || project
                .tech
                .iter()
                .any(|tech| tech.to_lowercase().contains(&needle))
    }

    fn matches_tech(&self, project: &ProjectEntry) -> bool {
        match &self.tech {
            TechFilter::All => true,
            TechFilter::Tag(tag) => {
                let tag = tag.to_lowercase();
                project.tech.iter().any(|tech| tech.to_lowercase() == tag)
            }
        }
    }
}

/// Unique tags across all projects, in first-seen order.
pub fn distinct_techs(projects: &[ProjectEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    projects
        .iter()
        .flat_map(|project| project.tech.iter())
        .filter(|tech| seen.insert(*tech))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{distinct_techs, ProjectFilter, TechFilter};
    use crate::model::entry::ProjectEntry;

    fn project(id: i64, title: &str, tech: &[&str]) -> ProjectEntry {
        ProjectEntry {
            id,
            title: title.to_string(),
            description: format!("{title} description"),
            tech: tech.iter().map(|tag| tag.to_string()).collect(),
            image: None,
            link: None,
        }
    }

    fn sample() -> Vec<ProjectEntry> {
        vec![
            project(1, "Codo File", &["React", "Node.js"]),
            project(2, "Clinic Booking", &["PHP"]),
        ]
    }

    #[test]
    fn tech_filter_returns_exact_tag_matches() {
        let projects = sample();
        let hits = ProjectFilter::tech("Node.js").apply(&projects);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);

        let hits = ProjectFilter::tech("node").apply(&projects);
        assert!(hits.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let projects = sample();
        let hits = ProjectFilter::query("cod").apply(&projects);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Codo File");

        assert_eq!(ProjectFilter::query("php").apply(&projects).len(), 1);
        assert_eq!(ProjectFilter::default().apply(&projects).len(), 2);
    }

    #[test]
    fn search_does_not_trim_the_query() {
        let projects = sample();
        assert!(ProjectFilter::query("cod ").apply(&projects).is_empty());

        let hits = ProjectFilter::query("codo ").apply(&projects);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn query_and_tech_combine() {
        let projects = sample();
        let filter = ProjectFilter {
            query: "clinic".to_string(),
            tech: TechFilter::Tag("react".to_string()),
        };
        assert!(filter.apply(&projects).is_empty());
    }

    #[test]
    fn distinct_techs_keeps_first_seen_order() {
        let mut projects = sample();
        projects.push(project(3, "Chat", &["Node.js", "Socket.io"]));
        assert_eq!(
            distinct_techs(&projects),
            vec!["React", "Node.js", "PHP", "Socket.io"]
        );
    }
}
