//! Media gallery of the detail view.
//!
//! The gallery is either closed or open on one project. While open it holds that
//! project's media list and a cursor; every transition hands back the frame to show
//! so a display layer only has to commit it.

use thiserror::Error;

use crate::types::{MediaItem, ProjectStore};
use crate::view::{build_detail_view, DetailView};

/// Strip icon for videos; frames are not captured.
pub const VIDEO_THUMBNAIL_ICON: &str = "media/img/video_placeholder.png";
/// Swapped in by the page when a strip thumbnail fails to load.
pub const THUMBNAIL_FALLBACK: &str = "https://via.placeholder.com/100?text=Media";

pub fn youtube_embed_url(id: &str) -> String { format!("https://www.youtube.com/embed/{id}?autoplay=1&rel=0") }

pub fn youtube_thumbnail_url(id: &str) -> String { format!("https://img.youtube.com/vi/{id}/default.jpg") }

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GalleryError {
    #[error("no project at index {0}")]
    UnknownProject(usize),
    #[error("gallery is closed")]
    Closed,
    #[error("media index {index} out of range for {len} items")]
    OutOfRange { index: usize, len: usize },
}

/// The single element shown in the preview area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewElement {
    Image { src: String },
    Video { src: String, controls: bool, autoplay: bool, muted: bool },
    Embed { src: String, allow_fullscreen: bool },
}

impl PreviewElement {
    pub fn for_media(item: &MediaItem) -> Self {
        match item {
            MediaItem::Image { url } => PreviewElement::Image { src: url.clone() },
            MediaItem::Video { url } => PreviewElement::Video { src: url.clone(), controls: true, autoplay: true, muted: true },
            MediaItem::YouTube { id } => PreviewElement::Embed { src: youtube_embed_url(id), allow_fullscreen: true },
        }
    }

    /// What must happen to this element before the gallery hides.
    fn teardown(&self) -> Option<Teardown> {
        match self {
            PreviewElement::Image { .. } => None,
            PreviewElement::Video { .. } => Some(Teardown::PauseVideo),
            PreviewElement::Embed { src, .. } => Some(Teardown::ReloadEmbed { src: src.clone() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub index: usize,
    pub src: String,
    pub fallback: &'static str,
    pub active: bool,
}

pub fn thumbnail_src(item: &MediaItem) -> String {
    match item {
        MediaItem::Image { url } => url.clone(),
        MediaItem::Video { .. } => VIDEO_THUMBNAIL_ICON.to_string(),
        MediaItem::YouTube { id } => youtube_thumbnail_url(id),
    }
}

/// One rendering of the gallery: the active preview plus the strip.
/// `preview` is `None` and the strip empty when the project has no media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryFrame {
    pub cursor: usize,
    pub len: usize,
    pub preview: Option<PreviewElement>,
    pub thumbnails: Vec<Thumbnail>,
}

impl GalleryFrame {
    pub fn is_visible(&self) -> bool { self.preview.is_some() }

    /// Whether arrow navigation does anything.
    pub fn can_navigate(&self) -> bool { self.len > 1 }
}

/// Media list and cursor of the open gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GallerySelection {
    media: Vec<MediaItem>,
    cursor: usize,
}

impl GallerySelection {
    pub fn new(media: Vec<MediaItem>) -> Self { Self { media, cursor: 0 } }

    pub fn cursor(&self) -> usize { self.cursor }

    pub fn len(&self) -> usize { self.media.len() }

    pub fn is_empty(&self) -> bool { self.media.is_empty() }

    pub fn current(&self) -> Option<&MediaItem> { self.media.get(self.cursor) }

    fn select(&mut self, index: usize) -> Result<(), GalleryError> {
        if index >= self.media.len() {
            return Err(GalleryError::OutOfRange { index, len: self.media.len() });
        }
        self.cursor = index;
        Ok(())
    }

    pub fn prev_index(&self) -> usize {
        let n = self.media.len();
        if n < 2 { self.cursor } else { (self.cursor + n - 1) % n }
    }

    pub fn next_index(&self) -> usize {
        let n = self.media.len();
        if n < 2 { self.cursor } else { (self.cursor + 1) % n }
    }

    pub fn frame(&self) -> GalleryFrame {
        let thumbnails = self
            .media
            .iter()
            .enumerate()
            .map(|(i, m)| Thumbnail { index: i, src: thumbnail_src(m), fallback: THUMBNAIL_FALLBACK, active: i == self.cursor })
            .collect();
        GalleryFrame {
            cursor: self.cursor,
            len: self.media.len(),
            preview: self.current().map(PreviewElement::for_media),
            thumbnails,
        }
    }
}

/// Side effects the page performs before hiding the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Teardown {
    PauseVideo,
    /// Re-assigning the same source stops an embedded player.
    ReloadEmbed { src: String },
}

/// Returned by [`Gallery::open`]: chrome for the detail view plus the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedGallery {
    pub detail: DetailView,
    pub frame: GalleryFrame,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GalleryState {
    #[default]
    Closed,
    Open { project_index: usize, selection: GallerySelection },
}

#[derive(Debug, Default)]
pub struct Gallery {
    state: GalleryState,
}

impl Gallery {
    pub fn new() -> Self { Self::default() }

    pub fn state(&self) -> &GalleryState { &self.state }

    pub fn is_open(&self) -> bool { matches!(self.state, GalleryState::Open { .. }) }

    pub fn selection(&self) -> Option<&GallerySelection> {
        match &self.state {
            GalleryState::Open { selection, .. } => Some(selection),
            GalleryState::Closed => None,
        }
    }

    pub fn project_index(&self) -> Option<usize> {
        match &self.state {
            GalleryState::Open { project_index, .. } => Some(*project_index),
            GalleryState::Closed => None,
        }
    }

    /// Open on `index`, replacing whatever was open. The cursor always starts at 0.
    pub fn open(&mut self, store: &ProjectStore, index: usize) -> Result<OpenedGallery, GalleryError> {
        let project = store.get(index).ok_or(GalleryError::UnknownProject(index))?;
        let selection = GallerySelection::new(project.media.clone());
        let frame = selection.frame();
        self.state = GalleryState::Open { project_index: index, selection };
        Ok(OpenedGallery { detail: build_detail_view(project), frame })
    }

    pub fn change_media(&mut self, index: usize) -> Result<GalleryFrame, GalleryError> {
        let selection = self.selection_mut()?;
        selection.select(index)?;
        Ok(selection.frame())
    }

    /// Step back with wraparound. With fewer than two items nothing changes.
    pub fn navigate_prev(&mut self) -> Result<GalleryFrame, GalleryError> {
        let selection = self.selection_mut()?;
        if selection.len() < 2 { return Ok(selection.frame()); }
        let target = selection.prev_index();
        self.change_media(target)
    }

    /// Step forward with wraparound. With fewer than two items nothing changes.
    pub fn navigate_next(&mut self) -> Result<GalleryFrame, GalleryError> {
        let selection = self.selection_mut()?;
        if selection.len() < 2 { return Ok(selection.frame()); }
        let target = selection.next_index();
        self.change_media(target)
    }

    /// Close and report what has to be stopped. Closing a closed gallery does nothing.
    pub fn close(&mut self) -> Vec<Teardown> {
        let previous = std::mem::take(&mut self.state);
        match previous {
            GalleryState::Open { selection, .. } => selection
                .current()
                .map(PreviewElement::for_media)
                .and_then(|p| p.teardown())
                .into_iter()
                .collect(),
            GalleryState::Closed => Vec::new(),
        }
    }

    fn selection_mut(&mut self) -> Result<&mut GallerySelection, GalleryError> {
        match &mut self.state {
            GalleryState::Open { selection, .. } => Ok(selection),
            GalleryState::Closed => Err(GalleryError::Closed),
        }
    }
}

/// Terminal commands understood by the interactive browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryCommand {
    List,
    Open(usize),
    Show(usize),
    Next,
    Prev,
    Close,
    Quit,
    Help,
}

impl std::str::FromStr for GalleryCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let cmd = parts.next().unwrap_or("").to_ascii_lowercase();
        let arg = parts.next();
        let index = |what: &str| -> Result<usize, String> {
            arg.ok_or_else(|| format!("`{what}` needs an index"))?
                .parse::<usize>()
                .map_err(|_| format!("`{what}` needs a numeric index"))
        };
        match cmd.as_str() {
            "list" | "ls" => Ok(GalleryCommand::List),
            "open" => index("open").map(GalleryCommand::Open),
            "show" => index("show").map(GalleryCommand::Show),
            "next" | "n" | ">" => Ok(GalleryCommand::Next),
            "prev" | "p" | "<" => Ok(GalleryCommand::Prev),
            "close" | "esc" | "escape" => Ok(GalleryCommand::Close),
            "quit" | "q" | "exit" => Ok(GalleryCommand::Quit),
            "help" | "?" => Ok(GalleryCommand::Help),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command `{other}`")),
        }
    }
}
