//! Commits view models to HTML and writes the static site.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use askama::Template;
use pulldown_cmark::{html, CowStr, Event, Options, Parser};
use tracing::{debug, info};

use crate::gallery::{Gallery, GalleryFrame, PreviewElement};
use crate::types::ProjectStore;
use crate::view::{build_list_view, detail_page_name, DetailView, Link, ListView, ProjectCard, DETAIL_LINK_LABEL, LOAD_ERROR_MESSAGE};

/// Turns raw documentation text into HTML that is safe to insert into a page.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, text: &str) -> String;
}

/// Post-processes rendered documentation so code blocks get highlighted.
pub trait CodeHighlighter: Send + Sync {
    fn highlight(&self, html: String) -> String;
}

/// CommonMark with GitHub extensions. Raw HTML in the source is emitted as text.
#[derive(Debug, Default, Clone, Copy)]
pub struct CmarkRenderer;

impl MarkdownRenderer for CmarkRenderer {
    fn render(&self, text: &str) -> String {
        let mut opts = Options::empty();
        opts.insert(Options::ENABLE_TABLES);
        opts.insert(Options::ENABLE_STRIKETHROUGH);
        opts.insert(Options::ENABLE_TASKLISTS);
        let parser = Parser::new_ext(text, opts).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::Start(pulldown_cmark::Tag::Link { link_type, dest_url, title, id }) if is_script_url(&dest_url) => {
                Event::Start(pulldown_cmark::Tag::Link { link_type, dest_url: CowStr::Borrowed("#"), title, id })
            }
            other => other,
        });
        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

fn is_script_url(url: &str) -> bool {
    url.trim_start().to_ascii_lowercase().starts_with("javascript:")
}

/// Tags code blocks for highlight.js, which the detail page loads.
#[derive(Debug, Default, Clone, Copy)]
pub struct HljsHighlighter;

impl CodeHighlighter for HljsHighlighter {
    fn highlight(&self, html: String) -> String {
        html.replace("<pre><code class=\"", "<pre><code class=\"hljs ")
            .replace("<pre><code>", "<pre><code class=\"hljs\">")
    }
}

#[derive(Template)]
#[template(path = "list.html")]
struct ListTemplate<'a> {
    empty_message: Option<&'a str>,
    cards: &'a [ProjectCard],
    detail_label: &'a str,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    heading: &'a str,
    error_message: Option<&'a str>,
    list_html: String,
}

struct ThumbLink {
    href: String,
    src: String,
    fallback: &'static str,
    active: bool,
}

#[derive(Template)]
#[template(path = "detail.html")]
struct DetailTemplate<'a> {
    title: &'a str,
    updated_label: &'a str,
    links: &'a [Link],
    has_media: bool,
    can_navigate: bool,
    prev_href: String,
    next_href: String,
    preview_kind: &'static str,
    preview_src: String,
    thumbnails: Vec<ThumbLink>,
    documentation_html: String,
}

/// HTML for the card list; an empty list renders only the placeholder.
pub fn render_list(view: &ListView) -> Result<String> {
    let tpl = match view {
        ListView::Empty { message } => ListTemplate { empty_message: Some(*message), cards: &[], detail_label: DETAIL_LINK_LABEL },
        ListView::Cards(cards) => ListTemplate { empty_message: None, cards, detail_label: DETAIL_LINK_LABEL },
    };
    tpl.render().context("rendering project list")
}

pub fn render_index_page(heading: &str, view: &ListView) -> Result<String> {
    let list_html = render_list(view)?;
    IndexTemplate { heading, error_message: None, list_html }.render().context("rendering index page")
}

/// Index page shown when the repository list could not be fetched.
pub fn render_error_page(heading: &str) -> Result<String> {
    IndexTemplate { heading, error_message: Some(LOAD_ERROR_MESSAGE), list_html: String::new() }
        .render()
        .context("rendering error page")
}

/// One detail page: the chrome of `detail` around gallery `frame`.
pub fn render_detail_page(
    project_index: usize,
    detail: &DetailView,
    frame: &GalleryFrame,
    prev_cursor: usize,
    next_cursor: usize,
    markdown: &dyn MarkdownRenderer,
    highlighter: &dyn CodeHighlighter,
) -> Result<String> {
    let (preview_kind, preview_src) = match &frame.preview {
        Some(PreviewElement::Image { src }) => ("img", src.clone()),
        Some(PreviewElement::Video { src, .. }) => ("video", src.clone()),
        Some(PreviewElement::Embed { src, .. }) => ("embed", src.clone()),
        None => ("", String::new()),
    };
    let thumbnails = frame
        .thumbnails
        .iter()
        .map(|t| ThumbLink {
            href: detail_page_name(project_index, t.index),
            src: t.src.clone(),
            fallback: t.fallback,
            active: t.active,
        })
        .collect();
    let documentation_html = highlighter.highlight(markdown.render(&detail.documentation_text));

    DetailTemplate {
        title: &detail.title,
        updated_label: &detail.updated_label,
        links: &detail.links,
        has_media: frame.is_visible(),
        can_navigate: frame.can_navigate(),
        prev_href: detail_page_name(project_index, prev_cursor),
        next_href: detail_page_name(project_index, next_cursor),
        preview_kind,
        preview_src,
        thumbnails,
        documentation_html,
    }
    .render()
    .context("rendering detail page")
}

/// Writes `index.html` plus one page per gallery position of every project.
pub struct SiteWriter {
    out_dir: PathBuf,
    heading: String,
    markdown: Box<dyn MarkdownRenderer>,
    highlighter: Box<dyn CodeHighlighter>,
}

impl SiteWriter {
    pub fn new(out_dir: impl Into<PathBuf>, heading: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            heading: heading.into(),
            markdown: Box::new(CmarkRenderer),
            highlighter: Box::new(HljsHighlighter),
        }
    }

    pub fn with_renderers(mut self, markdown: Box<dyn MarkdownRenderer>, highlighter: Box<dyn CodeHighlighter>) -> Self {
        self.markdown = markdown;
        self.highlighter = highlighter;
        self
    }

    pub fn out_dir(&self) -> &Path { &self.out_dir }

    /// Returns the number of files written.
    pub async fn write_site(&self, store: &ProjectStore) -> Result<usize> {
        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .with_context(|| format!("creating {}", self.out_dir.display()))?;

        let index = render_index_page(&self.heading, &build_list_view(store.records()))?;
        self.write_file("index.html", index).await?;
        let mut written = 1;

        let mut gallery = Gallery::new();
        for project_index in 0..store.len() {
            let opened = gallery.open(store, project_index)?;
            let count = opened.frame.len.max(1);
            for cursor in 0..count {
                let frame = if cursor == 0 { opened.frame.clone() } else { gallery.change_media(cursor)? };
                let (prev, next) = gallery
                    .selection()
                    .map(|s| (s.prev_index(), s.next_index()))
                    .unwrap_or((0, 0));
                let page = render_detail_page(
                    project_index,
                    &opened.detail,
                    &frame,
                    prev,
                    next,
                    self.markdown.as_ref(),
                    self.highlighter.as_ref(),
                )?;
                self.write_file(&detail_page_name(project_index, cursor), page).await?;
                written += 1;
            }
            gallery.close();
        }
        info!("Wrote {} pages to {}", written, self.out_dir.display());
        Ok(written)
    }

    pub async fn write_error_page(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .with_context(|| format!("creating {}", self.out_dir.display()))?;
        self.write_file("index.html", render_error_page(&self.heading)?).await
    }

    async fn write_file(&self, name: &str, contents: String) -> Result<()> {
        let path = self.out_dir.join(name);
        debug!("writing {}", path.display());
        tokio::fs::write(&path, contents).await.with_context(|| format!("writing {}", path.display()))
    }
}
