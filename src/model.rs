//! # Geometry and Layout Model
//!
//! The shared vocabulary of the engine: rectangles in absolute document
//! coordinates, the entities discovered by the registry, and the tunables
//! that drive a placement pass.
//!
//! Geometry is always *live*. A [`Rect`] held anywhere in this crate is a
//! snapshot taken during the current pass, never a cached coordinate from an
//! earlier one — the page may have reflowed in between.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in absolute document coordinates, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// The degenerate rectangle returned by geometry queries against elements
    /// that are not attached to the document. The engine treats it as
    /// "top 0, height 0" rather than as a fault.
    pub const ZERO: Rect = Rect {
        top: 0.0,
        left: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// An in-text footnote reference marker.
///
/// Discovered once, in appearance order; `index` is the canonical index space
/// shared with the sidenote list. Read-only after discovery — geometry is
/// re-queried from the rendered document on every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootnoteRef {
    /// 0-based position in document appearance order.
    pub index: usize,
    /// Fragment identifier of the target note, without the leading `#`.
    pub note_id: String,
}

/// A vertical span sidenotes must not intrude into beyond a small tolerance.
///
/// Rebuilt from figure elements on every pass, never stored between passes.
/// A figure carrying an inline-figure marker is `exempt` from avoidance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub rect: Rect,
    pub exempt: bool,
}

/// Where the sidenote column sits this pass: top-aligned with the main
/// content region and offset right of its right edge. Recomputed every pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerFrame {
    pub top: f64,
    pub left: f64,
    pub width: f64,
}

/// One resolved sidenote position, in container-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Index of the reference/note pair this placement belongs to.
    pub index: usize,
    pub top: f64,
    pub left: f64,
}

/// The serializable outcome of one placement pass, for debug overlays and
/// host tooling. Skipped notes (missing targets) have no entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReport {
    pub container: ContainerFrame,
    pub placements: Vec<Placement>,
}

/// Tunables for discovery and placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Minimum vertical gap between consecutive sidenotes, in pixels.
    pub note_gap: f64,
    /// How far a sidenote may intrude into an obstacle before it is moved.
    pub obstacle_tolerance: f64,
    /// Horizontal gap between the main content's right edge and the column.
    pub column_offset: f64,
    /// Upper bound on the column width; the column also never extends past
    /// the right edge of the viewport.
    pub max_column_width: f64,
    /// Quiet period after the last resize event before a pass runs.
    pub debounce: Duration,
    /// Route placement around figure obstacles. Off by default.
    pub avoid_obstacles: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            note_gap: 10.0,
            obstacle_tolerance: 20.0,
            column_offset: 40.0,
            max_column_width: 384.0, // 24em at 16px
            debounce: Duration::from_millis(200),
            avoid_obstacles: false,
        }
    }
}
