//! Hover pairing: reference *i* and sidenote *i* light up together.
//!
//! Pure per-call logic over the registry's index-to-handle mapping. The
//! coordinator holds no state of its own; enter adds the shared marker class
//! to both halves of the pair, leave removes it from both. An out-of-range
//! index, or a pair whose note was skipped at discovery, toggles nothing.

use crate::registry::Discovery;
use crate::surface::RenderSurface;

/// Apply or clear the highlight on the pair at `index`.
pub fn toggle_pair<S: RenderSurface>(
    surface: &mut S,
    discovery: &Discovery<S::NodeRef>,
    index: usize,
    on: bool,
) {
    let (Some(anchor), Some(Some(note))) =
        (discovery.ref_nodes.get(index), discovery.notes.get(index))
    else {
        return;
    };
    surface.set_highlighted(*anchor, on);
    surface.set_highlighted(*note, on);
}
