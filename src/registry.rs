//! # Reference/Note Registry
//!
//! Discovers footnote reference markers in appearance order, resolves each
//! one's target note by fragment identifier, and builds one positioned clone
//! per resolved target inside a freshly created container.
//!
//! Appearance order is the canonical index space for the whole engine:
//! `notes[i]` always pairs with `refs[i]`. A reference whose target cannot be
//! found is skipped, but it still occupies its slot as `None` so that later
//! pairs keep their indices. Discovery runs once per page load; resize only
//! repositions, it never rediscovers.

use log::debug;

use crate::model::FootnoteRef;
use crate::surface::{Backlink, RenderSurface, REFERENCE_CLASS};

/// Everything discovery found, index-aligned across all three lists.
#[derive(Debug, Clone)]
pub struct Discovery<N> {
    /// Reference descriptors in appearance order.
    pub refs: Vec<FootnoteRef>,
    /// Handles to the in-text anchors, parallel to `refs`.
    pub ref_nodes: Vec<N>,
    /// Handles to the sidenote clones; `None` where the target was missing.
    pub notes: Vec<Option<N>>,
    /// The sidenote column, created only when at least one reference exists.
    pub container: Option<N>,
}

impl<N> Discovery<N> {
    pub fn empty() -> Self {
        Self {
            refs: Vec::new(),
            ref_nodes: Vec::new(),
            notes: Vec::new(),
            container: None,
        }
    }

    /// True when the document had no recognized references. An inert
    /// discovery created nothing and the engine treats every operation as a
    /// no-op.
    pub fn is_inert(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

impl<N> Default for Discovery<N> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Scan the surface and build the sidenote set.
///
/// Side effect: inserts the container and all sidenote clones into the
/// document, once. With zero references the surface is left untouched.
pub fn discover<S: RenderSurface>(surface: &mut S) -> Discovery<S::NodeRef> {
    let anchors = surface.elements_with_class(REFERENCE_CLASS);
    if anchors.is_empty() {
        debug!("no footnote references found; sidenotes are inert");
        return Discovery::empty();
    }

    let container = surface.create_container();
    let mut refs = Vec::with_capacity(anchors.len());
    let mut notes = Vec::with_capacity(anchors.len());

    for (index, &anchor) in anchors.iter().enumerate() {
        let note_id = surface
            .link_target(anchor)
            .map(|href| href.trim_start_matches('#').to_string())
            .unwrap_or_default();

        let source = if note_id.is_empty() {
            None
        } else {
            surface.element_by_id(&note_id)
        };
        let note = match source {
            Some(source) => {
                Some(surface.clone_note(container, source, Some(Backlink::for_index(index))))
            }
            None => {
                // Skipped, but the slot stays so later indices don't shift.
                debug!("footnote reference {index} targets missing note '#{note_id}'; skipped");
                None
            }
        };

        refs.push(FootnoteRef { index, note_id });
        notes.push(note);
    }

    debug!(
        "discovered {} footnote references, built {} sidenotes",
        refs.len(),
        notes.iter().filter(|n| n.is_some()).count()
    );

    Discovery {
        refs,
        ref_nodes: anchors,
        notes,
        container: Some(container),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;
    use crate::surface::{DocumentSnapshot, MemorySurface, SnapshotNode, CONTAINER_ID};

    fn anchor(n: usize, top: f64) -> SnapshotNode {
        SnapshotNode {
            tag: "a".to_string(),
            classes: vec![REFERENCE_CLASS.to_string()],
            href: Some(format!("#fn{n}")),
            rect: Rect::new(top, 10.0, 12.0, 16.0),
            ..Default::default()
        }
    }

    fn footnote(n: usize, height: f64) -> SnapshotNode {
        SnapshotNode {
            tag: "li".to_string(),
            id: Some(format!("fn{n}")),
            content: format!("footnote {n}"),
            rect: Rect::new(2000.0 + 100.0 * n as f64, 0.0, 600.0, height),
            ..Default::default()
        }
    }

    #[test]
    fn empty_document_creates_nothing() {
        let mut surface = MemorySurface::new(1024.0);
        let discovery = discover(&mut surface);
        assert!(discovery.is_inert());
        assert!(discovery.container.is_none());
        assert!(surface.element_by_id(CONTAINER_ID).is_none());
    }

    #[test]
    fn pairs_are_index_aligned() {
        let snapshot = DocumentSnapshot {
            viewport_width: 1024.0,
            nodes: vec![
                anchor(1, 50.0),
                anchor(2, 120.0),
                footnote(1, 40.0),
                footnote(2, 60.0),
            ],
        };
        let mut surface = MemorySurface::from_snapshot(&snapshot);
        let discovery = discover(&mut surface);
        assert_eq!(discovery.len(), 2);
        assert_eq!(discovery.refs[0].note_id, "fn1");
        assert_eq!(discovery.refs[1].note_id, "fn2");
        assert!(discovery.notes.iter().all(|n| n.is_some()));
        assert_eq!(surface.backlink(discovery.notes[1].unwrap()).unwrap().ordinal, 2);
    }

    #[test]
    fn missing_target_keeps_later_indices() {
        // fn2 does not exist: slot 1 must stay None, slot 2 must still pair
        // with the third reference.
        let snapshot = DocumentSnapshot {
            viewport_width: 1024.0,
            nodes: vec![
                anchor(1, 50.0),
                anchor(2, 120.0),
                anchor(3, 300.0),
                footnote(1, 40.0),
                footnote(3, 60.0),
            ],
        };
        let mut surface = MemorySurface::from_snapshot(&snapshot);
        let discovery = discover(&mut surface);
        assert_eq!(discovery.len(), 3);
        assert!(discovery.notes[0].is_some());
        assert!(discovery.notes[1].is_none());
        assert!(discovery.notes[2].is_some());
        assert_eq!(surface.content(discovery.notes[2].unwrap()), "footnote 3");
    }

    #[test]
    fn anchor_without_href_is_skipped() {
        let mut broken = anchor(1, 50.0);
        broken.href = None;
        let snapshot = DocumentSnapshot {
            viewport_width: 1024.0,
            nodes: vec![broken, footnote(1, 40.0)],
        };
        let mut surface = MemorySurface::from_snapshot(&snapshot);
        let discovery = discover(&mut surface);
        assert_eq!(discovery.len(), 1);
        assert!(discovery.notes[0].is_none());
    }
}
