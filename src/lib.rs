//! # Marginalia
//!
//! A sidenote layout engine.
//!
//! Footnotes usually render at the bottom of the page, a scroll away from
//! the sentence that cites them. Marginalia renders them as **sidenotes**: a
//! vertically stacked column to the right of the running text, each note
//! level with its in-text reference wherever possible, and never overlapping
//! another note — or, in the figure-avoidance variant, a floated figure.
//!
//! The engine operates on an already-rendered document. It discovers
//! reference markers and their target notes, clones note content into a
//! positioned column, and recomputes absolute pixel positions whenever the
//! viewport changes. It never reflows text and never persists layout; every
//! pass recomputes from live geometry.
//!
//! ## Architecture
//!
//! ```text
//! Rendered document (host-owned)
//!       ↓
//!   [registry]  — discover reference markers, clone note content
//!       ↓
//!   [layout]    — desired position + downward collision resolution
//!       ↓
//!   [surface]   — adapter applying positions to the live page
//! ```
//!
//! The placement math is pure ([`layout::resolve_positions`]); everything
//! that touches a page goes through the [`surface::RenderSurface`] trait.
//! Hosts with a real rendering layer implement the trait; headless hosts and
//! tests use [`surface::MemorySurface`].
//!
//! ## Driving the engine
//!
//! The host owns the event loop. When the document has fully parsed, call
//! [`SidenoteLayout::ready`]; on each viewport resize,
//! [`SidenoteLayout::viewport_resized`]; and pump [`SidenoteLayout::tick`]
//! so debounced passes run after the resize storm quiets.

pub mod error;
pub mod highlight;
pub mod layout;
pub mod model;
pub mod registry;
pub mod surface;
pub mod trigger;

pub use error::MarginaliaError;
pub use layout::SidenoteLayout;
pub use model::{LayoutConfig, LayoutReport, Placement, Rect};

use surface::RenderSurface;

/// Discover footnotes on a surface and run the first placement pass.
///
/// This is the primary entry point. Returns the layout instance (keep it to
/// handle resizes and hovers) and the first report, `None` when the document
/// has no recognized references — in that case nothing was inserted and the
/// instance stays inert.
pub fn attach<S: RenderSurface>(
    surface: &mut S,
    config: LayoutConfig,
) -> (SidenoteLayout<S>, Option<LayoutReport>) {
    let mut layout = SidenoteLayout::new(config);
    let report = layout.ready(surface);
    (layout, report)
}
