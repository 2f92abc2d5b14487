//! # Sidenote Placement Engine
//!
//! This is the heart of the crate.
//!
//! ## The problem
//!
//! A sidenote wants to sit exactly level with its in-text reference. But
//! notes are often denser than the references that spawn them: two
//! references one line apart can each carry a paragraph of commentary, and
//! naive alignment stacks the second note on top of the first.
//!
//! ## How placement works
//!
//! Notes are placed strictly in document order, each one aware only of what
//! came before it:
//!
//! 1. Anchor the column's top to the main content region, recomputed every
//!    pass (the page may have reflowed).
//! 2. For note *i*, `desired` is the reference's top translated into
//!    container-local coordinates.
//! 3. `min_top` is the bottom of note *i − 1* plus a fixed gap (0 for the
//!    first note).
//! 4. `candidate = max(desired, min_top)`. This is the central tie-break:
//!    when reference proximity and non-overlap conflict, **non-overlap
//!    wins** and the note slides down. A note is never pulled above its own
//!    reference's natural position by this step.
//! 5. With figure avoidance on, each obstacle in document order may push the
//!    candidate: a note intruding beyond the tolerance moves up to hang just
//!    above the obstacle when that still clears the previous note, otherwise
//!    it drops below the obstacle.
//! 6. The resolved top plus the note's measured height becomes the floor for
//!    the next note.
//!
//! The math is pure ([`resolve_positions`]); [`run_pass`] gathers live
//! geometry from the surface, runs it, and writes the results back.
//! Detached elements read as zero rectangles and flow through the same path,
//! so a partially initialized page degrades instead of crashing.

use std::time::Instant;

use log::{debug, trace};

use crate::highlight;
use crate::model::{ContainerFrame, LayoutConfig, LayoutReport, Obstacle, Placement};
use crate::registry::{self, Discovery};
use crate::surface::{RenderSurface, FIGURE_TAG, INLINE_FIGURE_CLASS, MAIN_CONTENT_ID};
use crate::trigger::Debouncer;

/// Live geometry for one note, gathered at the start of a pass.
///
/// Heights depend on content and the width constraints on the container, not
/// on vertical position, so measuring before resolution is equivalent to
/// measuring after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteInput {
    /// Index of the reference/note pair.
    pub index: usize,
    /// Absolute document top of the reference marker.
    pub ref_top: f64,
    /// Measured rendered height of the note.
    pub height: f64,
}

/// Resolve a non-overlapping container-local top for every note.
///
/// `notes` holds only the notes that exist (skipped references are absent),
/// in index order. `anchor_top` is the container's absolute document top.
/// Obstacle rectangles are absolute; they are translated into the same local
/// space as the candidates before testing.
pub fn resolve_positions(
    notes: &[NoteInput],
    obstacles: &[Obstacle],
    anchor_top: f64,
    config: &LayoutConfig,
) -> Vec<Placement> {
    let mut placements = Vec::with_capacity(notes.len());
    let mut last_bottom: Option<f64> = None;

    for note in notes {
        let desired = note.ref_top - anchor_top;
        let min_top = match last_bottom {
            Some(bottom) => bottom + config.note_gap,
            None => 0.0,
        };
        let mut top = desired.max(min_top);

        if config.avoid_obstacles {
            for obstacle in obstacles.iter().filter(|o| !o.exempt) {
                let obstacle_top = obstacle.rect.top - anchor_top;
                let obstacle_bottom = obstacle.rect.bottom() - anchor_top;
                let tolerance = config.obstacle_tolerance;
                let intrudes =
                    top < obstacle_bottom && top + note.height > obstacle_top + tolerance;
                if intrudes {
                    // Hanging just above the obstacle leaves exactly the
                    // tolerated intrusion. Only allowed when it keeps the
                    // note clear of the previous one; otherwise drop below.
                    let lifted = obstacle_top + tolerance - note.height;
                    top = if lifted >= min_top {
                        lifted
                    } else {
                        obstacle_bottom
                    };
                }
            }
        }

        trace!(
            "note {}: desired {:.1}, min {:.1}, resolved {:.1} (h {:.1})",
            note.index,
            desired,
            min_top,
            top,
            note.height
        );
        placements.push(Placement {
            index: note.index,
            top,
            left: 0.0, // single column
        });
        last_bottom = Some(top + note.height);
    }

    placements
}

/// Collect obstacle spans from figure elements, in document order. A figure
/// with a direct inline-figure child is exempt.
pub fn gather_obstacles<S: RenderSurface>(surface: &S) -> Vec<Obstacle> {
    surface
        .elements_with_tag(FIGURE_TAG)
        .into_iter()
        .map(|figure| Obstacle {
            rect: surface.document_rect(figure),
            exempt: surface.has_child_with_class(figure, INLINE_FIGURE_CLASS),
        })
        .collect()
}

/// Run one full placement pass: anchor the container, gather live geometry,
/// resolve positions, and write them back to the surface.
///
/// Returns `None` when the discovery is inert (no container exists).
pub fn run_pass<S: RenderSurface>(
    surface: &mut S,
    discovery: &Discovery<S::NodeRef>,
    config: &LayoutConfig,
) -> Option<LayoutReport> {
    let container = discovery.container?;

    // Anchor the column to the main content region, or the whole page when
    // none is designated. Recomputed every pass.
    let main = surface
        .element_by_id(MAIN_CONTENT_ID)
        .unwrap_or_else(|| surface.root());
    let main_rect = surface.document_rect(main);
    let left = main_rect.right() + config.column_offset;
    let width = config
        .max_column_width
        .min(surface.viewport_width() - left)
        .max(0.0);
    let frame = ContainerFrame {
        top: main_rect.top,
        left,
        width,
    };
    surface.set_container_frame(container, frame);

    let obstacles = if config.avoid_obstacles {
        gather_obstacles(surface)
    } else {
        Vec::new()
    };

    let mut inputs = Vec::with_capacity(discovery.len());
    for (index, note) in discovery.notes.iter().enumerate() {
        let Some(note) = note else { continue };
        inputs.push(NoteInput {
            index,
            ref_top: surface.document_rect(discovery.ref_nodes[index]).top,
            height: surface.measured_height(*note),
        });
    }

    let placements = resolve_positions(&inputs, &obstacles, frame.top, config);
    for placement in &placements {
        if let Some(Some(note)) = discovery.notes.get(placement.index) {
            surface.set_note_position(*note, placement.top, placement.left);
        }
    }

    debug!(
        "placed {} sidenotes at column left {:.1}, width {:.1}",
        placements.len(),
        frame.left,
        frame.width
    );
    Some(LayoutReport {
        container: frame,
        placements,
    })
}

/// One independent sidenote layer: its discovery, its tunables, and its
/// debounced resize scheduling.
///
/// The host owns the event loop and feeds it in: call [`ready`] when the
/// document has fully parsed, [`viewport_resized`] on every resize event,
/// and [`tick`] from a frame callback or timer so due passes actually run.
///
/// [`ready`]: SidenoteLayout::ready
/// [`viewport_resized`]: SidenoteLayout::viewport_resized
/// [`tick`]: SidenoteLayout::tick
pub struct SidenoteLayout<S: RenderSurface> {
    config: LayoutConfig,
    discovery: Discovery<S::NodeRef>,
    resize: Debouncer,
}

impl<S: RenderSurface> SidenoteLayout<S> {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            resize: Debouncer::new(config.debounce),
            discovery: Discovery::empty(),
            config,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn discovery(&self) -> &Discovery<S::NodeRef> {
        &self.discovery
    }

    /// Run discovery once, then an immediate placement pass so the first
    /// paint is already correct. Returns `None` on an inert document.
    pub fn ready(&mut self, surface: &mut S) -> Option<LayoutReport> {
        self.discovery = registry::discover(surface);
        self.place(surface)
    }

    /// Run a placement pass now, without rediscovery. Idempotent: with no
    /// intervening geometry change, repeated passes assign identical
    /// positions.
    pub fn place(&mut self, surface: &mut S) -> Option<LayoutReport> {
        run_pass(surface, &self.discovery, &self.config)
    }

    /// Note a viewport resize. Schedules a placement-only pass after the
    /// quiet period; scheduling again supersedes the pending deadline, so a
    /// resize storm collapses into one pass. Inert layouts ignore resizes.
    pub fn viewport_resized(&mut self, now: Instant) {
        if self.discovery.is_inert() {
            return;
        }
        self.resize.schedule(now);
    }

    /// Run the debounced pass if its quiet period has elapsed.
    pub fn tick(&mut self, surface: &mut S, now: Instant) -> Option<LayoutReport> {
        if self.resize.fire_due(now) {
            self.place(surface)
        } else {
            None
        }
    }

    /// Hover/focus entered (`entering = true`) or left the reference or note
    /// at `index`: toggle the shared highlight on both halves of the pair.
    pub fn on_hover(&mut self, surface: &mut S, index: usize, entering: bool) {
        highlight::toggle_pair(surface, &self.discovery, index, entering);
    }
}

impl<S: RenderSurface> Default for SidenoteLayout<S> {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;

    fn note(index: usize, ref_top: f64, height: f64) -> NoteInput {
        NoteInput {
            index,
            ref_top,
            height,
        }
    }

    fn resolve(notes: &[NoteInput]) -> Vec<f64> {
        resolve_positions(notes, &[], 0.0, &LayoutConfig::default())
            .into_iter()
            .map(|p| p.top)
            .collect()
    }

    fn avoidance_config() -> LayoutConfig {
        LayoutConfig {
            avoid_obstacles: true,
            ..Default::default()
        }
    }

    fn obstacle(top: f64, bottom: f64) -> Obstacle {
        Obstacle {
            rect: Rect::new(top, 0.0, 300.0, bottom - top),
            exempt: false,
        }
    }

    #[test]
    fn crowded_references_cascade_downward() {
        // References at 50/60/500, heights 100/30/40:
        // note1 is pushed to 50+100+10, note2 is free to sit at 500.
        let tops = resolve(&[
            note(0, 50.0, 100.0),
            note(1, 60.0, 30.0),
            note(2, 500.0, 40.0),
        ]);
        assert_eq!(tops, vec![50.0, 160.0, 500.0]);
    }

    #[test]
    fn gap_is_exact() {
        let tops = resolve(&[note(0, 0.0, 25.0), note(1, 0.0, 25.0), note(2, 0.0, 25.0)]);
        assert_eq!(tops, vec![0.0, 35.0, 70.0]);
    }

    #[test]
    fn unconstrained_note_sits_level_with_its_reference() {
        let tops = resolve(&[note(0, 40.0, 20.0), note(1, 200.0, 20.0)]);
        assert_eq!(tops[1], 200.0, "no unnecessary downward push");
    }

    #[test]
    fn first_note_never_rises_above_the_container() {
        // A degenerate (detached) reference reads as top 0; with a non-zero
        // anchor the desired local top goes negative and clamps to 0.
        let placements =
            resolve_positions(&[note(0, 0.0, 20.0)], &[], 300.0, &LayoutConfig::default());
        assert_eq!(placements[0].top, 0.0);
    }

    #[test]
    fn anchor_translation_is_container_local() {
        let placements = resolve_positions(
            &[note(0, 450.0, 20.0)],
            &[],
            300.0,
            &LayoutConfig::default(),
        );
        assert_eq!(placements[0].top, 150.0);
    }

    #[test]
    fn empty_input_resolves_to_nothing() {
        assert!(resolve(&[]).is_empty());
    }

    #[test]
    fn skipped_notes_leave_no_hole_in_the_stack() {
        // Index 1 was a missing target: indices 0 and 2 stack directly.
        let placements = resolve_positions(
            &[note(0, 50.0, 100.0), note(2, 60.0, 40.0)],
            &[],
            0.0,
            &LayoutConfig::default(),
        );
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[1].index, 2);
        assert_eq!(placements[1].top, 160.0);
    }

    #[test]
    fn intruding_note_lifts_above_the_obstacle() {
        // Obstacle [200, 400], note height 50 landing at 380: lifted to
        // 200 + 20 - 50 = 170, bottom 220, exactly the tolerated intrusion.
        let placements = resolve_positions(
            &[note(0, 380.0, 50.0)],
            &[obstacle(200.0, 400.0)],
            0.0,
            &avoidance_config(),
        );
        assert_eq!(placements[0].top, 170.0);
    }

    #[test]
    fn blocked_lift_drops_below_the_obstacle() {
        // The previous note occupies [0, 180], so min_top is 190. Lifting
        // the second note would put it at 170, inside the previous note;
        // the engine drops it below the obstacle instead.
        let placements = resolve_positions(
            &[note(0, 0.0, 180.0), note(1, 380.0, 50.0)],
            &[obstacle(200.0, 400.0)],
            0.0,
            &avoidance_config(),
        );
        assert_eq!(placements[1].top, 400.0);
    }

    #[test]
    fn resolved_top_never_intrudes_beyond_tolerance() {
        // Clearance property: either above with at most the tolerated
        // intrusion (bottom <= obstacle top + 20) or fully below.
        for ref_top in [150.0, 250.0, 380.0, 390.0] {
            let placements = resolve_positions(
                &[note(0, ref_top, 50.0)],
                &[obstacle(200.0, 400.0)],
                0.0,
                &avoidance_config(),
            );
            let top = placements[0].top;
            let bottom = top + 50.0;
            assert!(
                bottom <= 220.0 || top >= 400.0,
                "ref_top {}: resolved [{}, {}] intrudes into [200, 400]",
                ref_top,
                top,
                bottom
            );
        }
    }

    #[test]
    fn exempt_obstacle_is_ignored() {
        let mut inline = obstacle(200.0, 400.0);
        inline.exempt = true;
        let placements = resolve_positions(
            &[note(0, 380.0, 50.0)],
            &[inline],
            0.0,
            &avoidance_config(),
        );
        assert_eq!(placements[0].top, 380.0);
    }

    #[test]
    fn notes_clear_of_obstacles_are_untouched() {
        let placements = resolve_positions(
            &[note(0, 500.0, 50.0)],
            &[obstacle(200.0, 400.0)],
            0.0,
            &avoidance_config(),
        );
        assert_eq!(placements[0].top, 500.0);
    }

    #[test]
    fn a_note_can_be_pushed_through_two_obstacles() {
        // Dropping below the first obstacle lands inside the second, which
        // pushes it down again. Obstacles are tested in document order.
        let placements = resolve_positions(
            &[note(0, 180.0, 150.0)],
            &[obstacle(200.0, 300.0), obstacle(320.0, 500.0)],
            0.0,
            &avoidance_config(),
        );
        // Lift above [200,300] needs top 200+20-150 = 70 (fine, min_top 0).
        assert_eq!(placements[0].top, 70.0);

        // Now pin the note so it cannot lift: it drops to 300, intrudes into
        // [320,500] (bottom 450 > 340), cannot lift back up, drops to 500.
        let placements = resolve_positions(
            &[note(0, 0.0, 190.0), note(1, 180.0, 150.0)],
            &[obstacle(200.0, 300.0), obstacle(320.0, 500.0)],
            0.0,
            &avoidance_config(),
        );
        assert_eq!(placements[1].top, 500.0);
    }

    #[test]
    fn pure_core_is_deterministic() {
        let notes = [note(0, 50.0, 100.0), note(1, 60.0, 30.0)];
        let a = resolve_positions(&notes, &[], 0.0, &LayoutConfig::default());
        let b = resolve_positions(&notes, &[], 0.0, &LayoutConfig::default());
        assert_eq!(a, b);
    }
}
