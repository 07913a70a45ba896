use serde::{Deserialize, Serialize};

/// Shown on a card when the manifest declares no image.
pub const THUMBNAIL_PLACEHOLDER: &str = "https://via.placeholder.com/400x250?text=No+Image";

/// One entry of a project's media gallery.
///
/// The serialized form is the manifest form: `{"type": "img" | "video" | "youtube", "url": ...}`.
/// For YouTube entries `url` holds the video id, not a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MediaItem {
    #[serde(rename = "img")]
    Image { url: String },
    #[serde(rename = "video")]
    Video { url: String },
    #[serde(rename = "youtube")]
    YouTube {
        #[serde(rename = "url")]
        id: String,
    },
}

/// Per-repository `portfolio.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub list: Vec<MediaItem>,
}

impl Manifest {
    /// First image entry; videos listed before it are skipped on purpose.
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.list.iter().find_map(|m| match m {
            MediaItem::Image { url } => Some(url.as_str()),
            _ => None,
        })
    }
}

/// A project as shown on the page. Built once per acquisition pass and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub repo_name: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub media: Vec<MediaItem>,
    pub documentation_text: String,
    pub repo_url: String,
    pub homepage_url: Option<String>,
    pub updated_at: Option<String>,
}

/// The single persisted snapshot: capture time in epoch milliseconds plus every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub timestamp: i64,
    pub data: Vec<ProjectRecord>,
}

/// Ordered, index-addressable list of the records acquired for this session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectStore {
    records: Vec<ProjectRecord>,
}

impl ProjectStore {
    pub fn new(records: Vec<ProjectRecord>) -> Self { Self { records } }

    pub fn get(&self, index: usize) -> Option<&ProjectRecord> { self.records.get(index) }

    pub fn records(&self) -> &[ProjectRecord] { &self.records }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

impl From<Vec<ProjectRecord>> for ProjectStore {
    fn from(records: Vec<ProjectRecord>) -> Self { Self::new(records) }
}
