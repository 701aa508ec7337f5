//! User interface layer: view models and a text renderer.
//!
//! # Architecture
//!
//! The UI layer follows a declarative rendering model:
//!
//! ```text
//! GallerySession → compute_viewmodel → GalleryViewModel → render → text frame
//! ```
//!
//! # Modules
//!
//! - [`viewmodel`]: View model types representing renderable state
//! - [`renderer`]: Plain-text layout of the view model

pub mod renderer;
pub mod viewmodel;

pub use renderer::{render, render_viewmodel};
pub use viewmodel::{
    EmptyState, GalleryViewModel, HeaderInfo, PreviewInfo, SearchBarInfo, SidebarEntry, Tile,
};
