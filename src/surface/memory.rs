//! In-memory rendering surface.
//!
//! Backs headless hosts and the test suite. The surface never computes
//! geometry: it stores whatever rectangles the host's renderer reported and
//! hands them back on query, which mirrors how a live surface re-reads
//! bounding rectangles from the page each pass. A host can feed it a
//! [`DocumentSnapshot`] as JSON: one rendered-document capture, element
//! tree plus measured geometry.

use serde::{Deserialize, Serialize};

use super::{Backlink, RenderSurface, CONTAINER_ID, SIDENOTE_CLASS};
use crate::error::MarginaliaError;
use crate::model::{ContainerFrame, Rect};

/// Handle into a [`MemorySurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemNode(usize);

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    href: Option<String>,
    /// Rendered content payload. Opaque to the engine; clones copy it.
    content: String,
    /// Host-assigned geometry in absolute document coordinates.
    rect: Rect,
    /// Live measured height. Defaults to `rect.height`; hosts overwrite it
    /// after any width-affecting change.
    height: f64,
    children: Vec<usize>,
    /// Back-reference label, present only on sidenote clones.
    backlink: Option<Backlink>,
    /// Container-local offset assigned by the placement engine.
    offset: Option<(f64, f64)>,
    /// Column frame, present only on the container.
    frame: Option<ContainerFrame>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            href: None,
            content: String::new(),
            rect: Rect::ZERO,
            height: 0.0,
            children: Vec::new(),
            backlink: None,
            offset: None,
            frame: None,
        }
    }
}

/// One element of a rendered-document capture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub content: String,
    /// Geometry as rendered, in absolute document coordinates.
    #[serde(default)]
    pub rect: Rect,
    #[serde(default)]
    pub children: Vec<SnapshotNode>,
}

/// A rendered-document capture a host hands to [`MemorySurface`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    pub viewport_width: f64,
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
}

#[derive(Debug)]
pub struct MemorySurface {
    /// Arena in document appearance order (depth-first, parents first).
    elements: Vec<Element>,
    viewport_width: f64,
}

impl MemorySurface {
    /// An empty surface holding only the page body.
    pub fn new(viewport_width: f64) -> Self {
        Self {
            elements: vec![Element::new("body")],
            viewport_width,
        }
    }

    pub fn from_snapshot(snapshot: &DocumentSnapshot) -> Self {
        let mut surface = Self::new(snapshot.viewport_width);
        for node in &snapshot.nodes {
            surface.insert_snapshot(0, node);
        }
        surface
    }

    pub fn from_json(json: &str) -> Result<Self, MarginaliaError> {
        let snapshot: DocumentSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(&snapshot))
    }

    fn insert_snapshot(&mut self, parent: usize, node: &SnapshotNode) -> usize {
        let mut element = Element::new(&node.tag);
        element.id = node.id.clone();
        element.classes = node.classes.clone();
        element.href = node.href.clone();
        element.content = node.content.clone();
        element.rect = node.rect;
        element.height = node.rect.height;
        let index = self.attach(parent, element);
        for child in &node.children {
            self.insert_snapshot(index, child);
        }
        index
    }

    fn attach(&mut self, parent: usize, element: Element) -> usize {
        let index = self.elements.len();
        self.elements.push(element);
        self.elements[parent].children.push(index);
        index
    }

    // ── Host-facing mutators (reflow, resize) ───────────────────

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    /// Overwrite an element's rendered geometry, as a reflow would.
    pub fn set_rect(&mut self, node: MemNode, rect: Rect) {
        let element = &mut self.elements[node.0];
        element.rect = rect;
        element.height = rect.height;
    }

    /// Overwrite an element's measured height without moving it, as a
    /// width-constraint change on the column would.
    pub fn set_measured_height(&mut self, node: MemNode, height: f64) {
        self.elements[node.0].height = height;
    }

    // ── Read accessors ──────────────────────────────────────────

    pub fn classes(&self, node: MemNode) -> &[String] {
        &self.elements[node.0].classes
    }

    pub fn content(&self, node: MemNode) -> &str {
        &self.elements[node.0].content
    }

    pub fn backlink(&self, node: MemNode) -> Option<&Backlink> {
        self.elements[node.0].backlink.as_ref()
    }

    /// Container-local offset last assigned by the engine, if any.
    pub fn position(&self, node: MemNode) -> Option<(f64, f64)> {
        self.elements[node.0].offset
    }

    pub fn container_frame(&self, node: MemNode) -> Option<ContainerFrame> {
        self.elements[node.0].frame
    }
}

impl RenderSurface for MemorySurface {
    type NodeRef = MemNode;

    fn root(&self) -> MemNode {
        MemNode(0)
    }

    fn elements_with_class(&self, class: &str) -> Vec<MemNode> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.classes.iter().any(|c| c == class))
            .map(|(i, _)| MemNode(i))
            .collect()
    }

    fn elements_with_tag(&self, tag: &str) -> Vec<MemNode> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.tag == tag)
            .map(|(i, _)| MemNode(i))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<MemNode> {
        self.elements
            .iter()
            .position(|e| e.id.as_deref() == Some(id))
            .map(MemNode)
    }

    fn link_target(&self, node: MemNode) -> Option<String> {
        self.elements[node.0].href.clone()
    }

    fn has_child_with_class(&self, node: MemNode, class: &str) -> bool {
        self.elements[node.0]
            .children
            .iter()
            .any(|&child| self.elements[child].classes.iter().any(|c| c == class))
    }

    fn document_rect(&self, node: MemNode) -> Rect {
        self.elements[node.0].rect
    }

    fn measured_height(&self, node: MemNode) -> f64 {
        self.elements[node.0].height
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn create_container(&mut self) -> MemNode {
        let mut container = Element::new("div");
        container.id = Some(CONTAINER_ID.to_string());
        MemNode(self.attach(0, container))
    }

    fn clone_note(
        &mut self,
        container: MemNode,
        source: MemNode,
        backlink: Option<Backlink>,
    ) -> MemNode {
        let mut note = Element::new("div");
        note.classes.push(SIDENOTE_CLASS.to_string());
        // Deep copy of rendered content: the clone owns its payload, so
        // mutating it never touches the original footnote markup.
        note.content = self.elements[source.0].content.clone();
        note.height = self.elements[source.0].height;
        note.backlink = backlink;
        MemNode(self.attach(container.0, note))
    }

    fn set_container_frame(&mut self, container: MemNode, frame: ContainerFrame) {
        self.elements[container.0].frame = Some(frame);
    }

    fn set_note_position(&mut self, note: MemNode, top: f64, left: f64) {
        self.elements[note.0].offset = Some((top, left));
    }

    fn set_highlighted(&mut self, node: MemNode, on: bool) {
        let classes = &mut self.elements[node.0].classes;
        if on {
            if !classes.iter().any(|c| c == super::HIGHLIGHT_CLASS) {
                classes.push(super::HIGHLIGHT_CLASS.to_string());
            }
        } else {
            classes.retain(|c| c != super::HIGHLIGHT_CLASS);
        }
    }
}
