//! Two-endpoint text selection over the scrollback buffer.
//!
//! State machine for touch-driven selection:
//!
//! - A long press activates the selection on one cell and expands it to the
//!   surrounding word.
//! - Dragging either endpoint remaps it through the coordinate mapper,
//!   keeps the span ordered, snaps out of double-width glyphs, and nudges
//!   the visible window one row at a time when the drag crosses its edge.
//! - Dismissal returns to the inactive sentinel span.
//!
//! Span invariant: `y1 <= y2`, and `x1 <= x2` whenever `y1 == y2`. `x2` is
//! an exclusive end column; a span with both endpoints negative means no
//! selection.

mod handle;

pub use handle::{HandleDrag, HandleMetrics, HandleSide};

use crate::coords::CoordinateMapper;
use crate::screen::ScreenBuffer;
use tracing::trace;

/// Characters that terminate word expansion.
///
/// Deliberately small so paths and URLs select as one word; most punctuation
/// expands through.
const WORD_SPLIT: [char; 6] = ['/', '.', ' ', '&', ',', ':'];

/// Which endpoint of the span a gesture addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionHandle {
    /// The `(x1, y1)` endpoint.
    Start,
    /// The `(x2, y2)` endpoint.
    End,
}

/// Selection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    /// No selection; the span holds the sentinel.
    #[default]
    Inactive,
    /// A span is live and draggable.
    Active,
}

/// A selection span in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSpan {
    /// Start column (inclusive).
    pub x1: i32,
    /// Start row.
    pub y1: i32,
    /// End column (exclusive).
    pub x2: i32,
    /// End row.
    pub y2: i32,
}

impl SelectionSpan {
    /// The no-selection sentinel.
    pub const NONE: Self = Self {
        x1: -1,
        y1: -1,
        x2: -1,
        y2: -1,
    };

    /// Whether this span is the no-selection sentinel.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.x1 < 0 && self.y1 < 0 && self.x2 < 0 && self.y2 < 0
    }

    /// Whether the span ordering invariant holds.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.y1 < self.y2 || (self.y1 == self.y2 && self.x1 <= self.x2)
    }
}

impl Default for SelectionSpan {
    fn default() -> Self {
        Self::NONE
    }
}

/// Tracks the selection span and its gesture-driven transitions.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    span: SelectionSpan,
    state: SelectionState,
}

impl SelectionTracker {
    /// Create an inactive tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    #[must_use]
    #[inline]
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Whether a selection is live.
    #[must_use]
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == SelectionState::Active
    }

    /// The current span (the sentinel while inactive).
    #[must_use]
    #[inline]
    pub fn span(&self) -> SelectionSpan {
        self.span
    }

    /// Activate the selection from a long press.
    ///
    /// The pressed pixel maps to one cell; unless that cell holds a single
    /// space, the span grows left and right through non-empty, non-split
    /// characters to cover the whole word under the finger.
    pub fn long_press(
        &mut self,
        screen: &ScreenBuffer,
        mapper: &CoordinateMapper,
        px: f32,
        py: f32,
        top_row: i32,
        from_mouse: bool,
    ) {
        let (cx, cy) = mapper.pixel_to_cell_biased(px, py, top_row, from_mouse);
        let mut x1 = cx;
        let mut x2 = cx + 1;

        if screen.text_at(cy, x1) != " " {
            let columns = i32::from(screen.columns());
            while x1 > 0 {
                let left = screen.text_at(cy, x1 - 1);
                if left.is_empty() || is_word_split(&left) {
                    break;
                }
                x1 -= 1;
            }
            while x2 < columns - 1 {
                let right = screen.text_at(cy, x2);
                if right.is_empty() || is_word_split(&right) {
                    break;
                }
                x2 += 1;
            }
        }

        self.span = SelectionSpan {
            x1,
            y1: cy,
            x2,
            y2: cy,
        };
        self.state = SelectionState::Active;
        trace!(span = ?self.span, "selection activated");
    }

    /// Drag one endpoint to a new pixel position.
    ///
    /// Clamps into the buffer, keeps the span ordered by pulling the other
    /// endpoint along, snaps the dragged column out of a wide glyph, and
    /// scrolls `top_row` by at most one row when the drag crosses the
    /// visible window's edge.
    pub fn drag(
        &mut self,
        screen: &ScreenBuffer,
        mapper: &CoordinateMapper,
        handle: SelectionHandle,
        px: f32,
        py: f32,
        top_row: &mut i32,
    ) {
        if !self.is_active() {
            return;
        }
        let rows = i32::from(mapper.geometry().rows);
        let scroll_rows = screen.transcript_rows();
        let (cx, cy) = mapper.pixel_to_cell_biased(px, py, *top_row, false);
        let x = cx.max(0);
        let y = cy.clamp(-scroll_rows, rows - 1);

        match handle {
            SelectionHandle::Start => {
                self.span.x1 = x;
                self.span.y1 = y;
                if self.span.y1 > self.span.y2 {
                    self.span.y2 = self.span.y1;
                }
                if self.span.y1 == self.span.y2 && self.span.x1 > self.span.x2 {
                    self.span.x2 = self.span.x1;
                }
            }
            SelectionHandle::End => {
                self.span.x2 = x;
                self.span.y2 = y;
                if self.span.y1 > self.span.y2 {
                    self.span.y1 = self.span.y2;
                }
                if self.span.y1 == self.span.y2 && self.span.x1 > self.span.x2 {
                    self.span.x1 = self.span.x2;
                }
            }
        }

        // One row per drag update, never a jump.
        if y <= *top_row {
            *top_row = (*top_row - 1).max(-scroll_rows);
        } else if y >= *top_row + rows {
            *top_row = (*top_row + 1).min(0);
        }

        let snapped = screen.row(y).map_or(x, |r| r.snap_column(x));
        match handle {
            SelectionHandle::Start => {
                self.span.x1 = snapped;
                if self.span.y1 == self.span.y2 && self.span.x1 > self.span.x2 {
                    self.span.x2 = self.span.x1;
                }
            }
            SelectionHandle::End => {
                self.span.x2 = snapped;
                if self.span.y1 == self.span.y2 && self.span.x1 > self.span.x2 {
                    self.span.x1 = self.span.x2;
                }
            }
        }
    }

    /// Re-clamp the span rows after the buffer or geometry changed.
    pub fn clamp_rows(&mut self, screen: &ScreenBuffer, rows: u16) {
        if !self.is_active() {
            return;
        }
        let lo = -screen.transcript_rows();
        let hi = i32::from(rows) - 1;
        self.span.y1 = self.span.y1.clamp(lo, hi);
        self.span.y2 = self.span.y2.clamp(lo, hi);
        if self.span.y1 == self.span.y2 && self.span.x1 > self.span.x2 {
            self.span.x2 = self.span.x1;
        }
    }

    /// Deactivate and reset to the sentinel span.
    pub fn dismiss(&mut self) {
        if self.is_active() {
            trace!("selection dismissed");
        }
        self.span = SelectionSpan::NONE;
        self.state = SelectionState::Inactive;
    }

    /// The text currently covered by the span.
    #[must_use]
    pub fn selected_text(&self, screen: &ScreenBuffer) -> String {
        if !self.is_active() || self.span.is_none() {
            return String::new();
        }
        screen.selected_text(self.span.x1, self.span.y1, self.span.x2, self.span.y2)
    }
}

/// Whether a one-character string terminates word expansion.
fn is_word_split(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => WORD_SPLIT.contains(&c),
        _ => false,
    }
}
