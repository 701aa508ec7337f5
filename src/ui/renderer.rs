//! Plain-text renderer for the gallery view model.
//!
//! The renderer follows a two-step process:
//!
//! 1. **View Model Computation**: Transform `GallerySession` into `GalleryViewModel`
//! 2. **Layout**: Lay the view model out as text, one grid row per line
//!
//! Rendering is a pure function: the same view model always produces the same
//! text, and nothing but the view model is consulted.
//!
//! # Example
//!
//! ```rust
//! use tapestry_client::app::GallerySession;
//! use tapestry_client::storage::Preferences;
//! use tapestry_client::ui::render;
//! use tapestry_client::Config;
//!
//! let session = GallerySession::new(&Config::default(), Preferences::default());
//! let frame = render(&session);
//! assert!(frame.contains("No dataset selected"));
//! ```

use crate::app::GallerySession;
use crate::ui::viewmodel::{GalleryViewModel, SidebarEntry, Tile};
use std::fmt::Write;

/// Renders the session to text.
#[must_use]
pub fn render(session: &GallerySession) -> String {
    render_viewmodel(&session.compute_viewmodel())
}

/// Renders a pre-computed view model.
#[must_use]
pub fn render_viewmodel(vm: &GalleryViewModel) -> String {
    let mut out = String::new();

    let dataset = vm.header.dataset.as_deref().unwrap_or("-");
    let _ = writeln!(out, "{} [{dataset}] ({} images)", vm.header.title, vm.header.total_count);
    if !vm.search_bar.query.is_empty() {
        let _ = writeln!(out, "search: {}", vm.search_bar.query);
    }
    if let Some(processing) = &vm.processing {
        let _ = writeln!(out, "{processing}");
    }
    if let Some(notice) = &vm.notice {
        let _ = writeln!(out, "! {notice}");
    }

    if !vm.sidebar.is_empty() {
        let entries: Vec<String> = vm.sidebar.iter().map(sidebar_entry).collect();
        let _ = writeln!(out, "collections: {}", entries.join(" | "));
    }

    if let Some(empty) = &vm.empty_state {
        let _ = writeln!(out, "{}", empty.message);
        if !empty.subtitle.is_empty() {
            let _ = writeln!(out, "  {}", empty.subtitle);
        }
    } else {
        let columns = usize::from(vm.columns.max(1));
        for (row, chunk) in vm.tiles.chunks(columns).enumerate() {
            let cells: Vec<String> = chunk
                .iter()
                .enumerate()
                .map(|(col, tile)| tile_cell(row * columns + col, tile))
                .collect();
            let _ = writeln!(out, "{}", cells.join("  "));
        }
    }

    if vm.loading {
        let _ = writeln!(out, "loading...");
    } else if vm.has_more {
        let _ = writeln!(out, "(scroll for more)");
    }

    if let Some(preview) = &vm.preview {
        let _ = writeln!(
            out,
            "preview {}/{}: {}",
            preview.index + 1,
            preview.total,
            preview.display_url
        );
        if let Some(caption) = &preview.caption {
            let _ = writeln!(out, "  {caption}");
        }
    }

    out
}

fn tile_cell(index: usize, tile: &Tile) -> String {
    let marker = if tile.is_dragging {
        "*"
    } else if tile.is_drop_target {
        ">"
    } else {
        " "
    };
    format!("{marker}{index}:{}", tile.identity)
}

fn sidebar_entry(entry: &SidebarEntry) -> String {
    match (entry.is_active, entry.is_highlighted) {
        (_, true) => format!(">{}<", entry.name),
        (true, false) => format!("[{}]", entry.name),
        (false, false) => entry.name.clone(),
    }
}
