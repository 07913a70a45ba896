//! Line-oriented project browser: the card list and the gallery driven from a terminal.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::gallery::{Gallery, GalleryCommand, GalleryFrame, PreviewElement, Teardown};
use crate::types::ProjectStore;
use crate::view::{build_list_view, ListView};

const HELP: &str = "commands: list | open <n> | show <i> | next | prev | close (esc) | quit";

pub fn write_list<W: Write>(out: &mut W, view: &ListView) -> Result<()> {
    match view {
        ListView::Empty { message } => writeln!(out, "{message}")?,
        ListView::Cards(cards) => {
            for card in cards {
                writeln!(out, "[{}] {} - {}", card.index, card.title, card.description)?;
            }
        }
    }
    Ok(())
}

fn write_frame<W: Write>(out: &mut W, frame: &GalleryFrame) -> Result<()> {
    let Some(preview) = &frame.preview else {
        writeln!(out, "(no media)")?;
        return Ok(());
    };
    let shown = match preview {
        PreviewElement::Image { src } => format!("image {src}"),
        PreviewElement::Video { src, .. } => format!("video {src} (autoplay, muted)"),
        PreviewElement::Embed { src, .. } => format!("embed {src}"),
    };
    let strip: String = frame.thumbnails.iter().map(|t| if t.active { '*' } else { '.' }).collect();
    writeln!(out, "media {}/{}: {}  [{}]", frame.cursor + 1, frame.len, shown, strip)?;
    Ok(())
}

/// Reads commands until `quit` or end of input. Bad commands are reported, not fatal.
pub fn run_browser<R: BufRead, W: Write>(store: &ProjectStore, input: R, out: &mut W) -> Result<()> {
    let mut gallery = Gallery::new();
    write_list(out, &build_list_view(store.records()))?;
    writeln!(out, "{HELP}")?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let cmd = match line.parse::<GalleryCommand>() {
            Ok(c) => c,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };
        match cmd {
            GalleryCommand::List => write_list(out, &build_list_view(store.records()))?,
            GalleryCommand::Help => writeln!(out, "{HELP}")?,
            GalleryCommand::Open(index) => match gallery.open(store, index) {
                Ok(opened) => {
                    writeln!(out, "== {} (updated {})", opened.detail.title, opened.detail.updated_label)?;
                    for link in &opened.detail.links {
                        writeln!(out, "{}: {}", link.label, link.href)?;
                    }
                    write_frame(out, &opened.frame)?;
                }
                Err(e) => writeln!(out, "{e}")?,
            },
            GalleryCommand::Show(i) => match gallery.change_media(i) {
                Ok(frame) => write_frame(out, &frame)?,
                Err(e) => writeln!(out, "{e}")?,
            },
            GalleryCommand::Next => match gallery.navigate_next() {
                Ok(frame) => write_frame(out, &frame)?,
                Err(e) => writeln!(out, "{e}")?,
            },
            GalleryCommand::Prev => match gallery.navigate_prev() {
                Ok(frame) => write_frame(out, &frame)?,
                Err(e) => writeln!(out, "{e}")?,
            },
            GalleryCommand::Close => {
                for action in gallery.close() {
                    match action {
                        Teardown::PauseVideo => writeln!(out, "pausing video")?,
                        Teardown::ReloadEmbed { src } => writeln!(out, "stopping embed {src}")?,
                    }
                }
                writeln!(out, "closed")?;
            }
            GalleryCommand::Quit => break,
        }
    }
    gallery.close();
    Ok(())
}
