//! View models built from project records. Nothing here touches markup.

use chrono::DateTime;

use crate::types::ProjectRecord;

pub const EMPTY_LIST_MESSAGE: &str = "There are no projects to display.";
pub const LOAD_ERROR_MESSAGE: &str = "Could not load project information. Please try again later.";
pub const NO_DOCUMENTATION_TEXT: &str = "No README file.";
pub const DETAIL_LINK_LABEL: &str = "View Details";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCard {
    pub index: usize,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub lazy_load: bool,
    /// Opens the detail view for `index`.
    pub detail_href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Empty { message: &'static str },
    Cards(Vec<ProjectCard>),
}

impl ListView {
    pub fn cards(&self) -> &[ProjectCard] {
        match self {
            ListView::Cards(c) => c,
            ListView::Empty { .. } => &[],
        }
    }
}

/// File name of the detail page for a project at a given gallery cursor.
pub fn detail_page_name(project_index: usize, cursor: usize) -> String {
    if cursor == 0 { format!("project-{project_index}.html") } else { format!("project-{project_index}-{cursor}.html") }
}

pub fn build_list_view(projects: &[ProjectRecord]) -> ListView {
    if projects.is_empty() {
        return ListView::Empty { message: EMPTY_LIST_MESSAGE };
    }
    ListView::Cards(
        projects
            .iter()
            .enumerate()
            .map(|(index, p)| ProjectCard {
                index,
                title: p.title.clone(),
                description: p.description.clone(),
                thumbnail_url: p.thumbnail_url.clone(),
                lazy_load: true,
                detail_href: detail_page_name(index, 0),
            })
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: &'static str,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub title: String,
    pub updated_label: String,
    pub links: Vec<Link>,
    /// Raw markdown handed to the renderer; never empty.
    pub documentation_text: String,
}

pub fn build_detail_view(project: &ProjectRecord) -> DetailView {
    let mut links = vec![Link { label: "GitHub Repo", href: project.repo_url.clone() }];
    if let Some(home) = project.homepage_url.as_deref().filter(|h| !h.trim().is_empty()) {
        links.push(Link { label: "Live Demo", href: home.to_string() });
    }
    let documentation_text = if project.documentation_text.trim().is_empty() {
        NO_DOCUMENTATION_TEXT.to_string()
    } else {
        project.documentation_text.clone()
    };
    DetailView {
        title: project.title.clone(),
        updated_label: format_date(project.updated_at.as_deref()),
        links,
        documentation_text,
    }
}

/// `YYYY-MM-DD` of an RFC 3339 timestamp; `Unknown` when missing or unparseable.
pub fn format_date(value: Option<&str>) -> String {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}
