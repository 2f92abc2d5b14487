//! # Rendering Surface Adapter
//!
//! The placement math in [`crate::layout`] is pure: geometry in, positions
//! out. Everything that touches a live page goes through the [`RenderSurface`]
//! trait instead, so the same engine drives a real DOM, a GUI scene graph, or
//! the in-memory surface used by the test suite.
//!
//! A surface is deliberately not a DOM. It exposes only the handful of
//! queries and mutations the engine actually performs: class/id/tag lookup in
//! document order, live geometry reads, and the few writes that build and
//! position the sidenote column.

pub mod memory;

pub use memory::{DocumentSnapshot, MemNode, MemorySurface, SnapshotNode};

use std::fmt;

use crate::model::{ContainerFrame, Rect};

// ── Markup contract ─────────────────────────────────────────────
//
// The well-known names the engine recognizes in the source document and the
// names it stamps onto what it creates.

/// Class carried by every in-text footnote reference anchor.
pub const REFERENCE_CLASS: &str = "footnote-ref";
/// Tag of elements treated as obstacles in the figure-avoidance variant.
pub const FIGURE_TAG: &str = "figure";
/// A figure with a direct child carrying this class is exempt from avoidance.
pub const INLINE_FIGURE_CLASS: &str = "inlinefig";
/// Identifier of the main content region the column anchors to, when present.
pub const MAIN_CONTENT_ID: &str = "markdownBody";
/// Identifier stamped onto the sidenote column container.
pub const CONTAINER_ID: &str = "sidenote-container";
/// Class stamped onto every sidenote clone.
pub const SIDENOTE_CLASS: &str = "sidenote";
/// Shared marker class toggled on a hovered reference/note pair.
pub const HIGHLIGHT_CLASS: &str = "highlighted-footnote";

/// Identifier of the in-text anchor a sidenote's back-reference points at.
/// Ordinals are 1-based, matching the visible footnote numbering.
pub fn backref_anchor_id(ordinal: usize) -> String {
    format!("fnref{ordinal}")
}

/// The back-reference label prefixed to a sidenote clone: the visible ordinal
/// plus a link back to the in-text anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backlink {
    pub ordinal: usize,
    pub target: String,
}

impl Backlink {
    /// Backlink for the reference at `index` (0-based).
    pub fn for_index(index: usize) -> Self {
        let ordinal = index + 1;
        Self {
            target: format!("#{}", backref_anchor_id(ordinal)),
            ordinal,
        }
    }
}

/// The seam between the engine and whatever is actually rendering the page.
///
/// Geometry queries follow the degenerate-geometry rule: asking about an
/// element that is not attached to the document returns [`Rect::ZERO`] or a
/// zero height, never an error. A partially initialized page must not crash.
pub trait RenderSurface {
    /// Opaque handle to an element on this surface.
    type NodeRef: Copy + Eq + fmt::Debug;

    // ── Queries ─────────────────────────────────────────────────

    /// The whole-page element, the anchor of last resort for the column.
    fn root(&self) -> Self::NodeRef;

    /// All elements carrying `class`, in document appearance order.
    fn elements_with_class(&self, class: &str) -> Vec<Self::NodeRef>;

    /// All elements with tag `tag`, in document appearance order.
    fn elements_with_tag(&self, tag: &str) -> Vec<Self::NodeRef>;

    fn element_by_id(&self, id: &str) -> Option<Self::NodeRef>;

    /// The href of an anchor element, if any (e.g. `#fn3`).
    fn link_target(&self, node: Self::NodeRef) -> Option<String>;

    /// Whether `node` has a *direct* child carrying `class`.
    fn has_child_with_class(&self, node: Self::NodeRef, class: &str) -> bool;

    /// Bounding rectangle in absolute document coordinates, measured now.
    fn document_rect(&self, node: Self::NodeRef) -> Rect;

    /// Rendered height, measured now. Height is a function of content and the
    /// width constraints on the container, not of vertical position.
    fn measured_height(&self, node: Self::NodeRef) -> f64;

    fn viewport_width(&self) -> f64;

    // ── Mutations ───────────────────────────────────────────────

    /// Create the sidenote column container and attach it to the page.
    fn create_container(&mut self) -> Self::NodeRef;

    /// Deep-copy the rendered content of `source` into a new sidenote,
    /// optionally prefixed with a back-reference label, and append it to
    /// `container`. Mutating the clone never affects the original markup.
    fn clone_note(
        &mut self,
        container: Self::NodeRef,
        source: Self::NodeRef,
        backlink: Option<Backlink>,
    ) -> Self::NodeRef;

    fn set_container_frame(&mut self, container: Self::NodeRef, frame: ContainerFrame);

    /// Assign a sidenote's offset within the container.
    fn set_note_position(&mut self, note: Self::NodeRef, top: f64, left: f64);

    /// Toggle the shared highlight marker class on an element.
    fn set_highlighted(&mut self, node: Self::NodeRef, on: bool);
}
