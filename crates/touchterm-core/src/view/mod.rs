//! View-level coordination of the overlay subsystem.
//!
//! [`TerminalView`] wires the coordinate mapper, link index, and selection
//! tracker together under the single consuming thread: decoded gestures come
//! in as pixels, overlay queries go out as cell-space state. It owns the
//! scroll position (`top_row`, 0 at the live screen, negative into the
//! transcript) and the horizontal column window, and it reacts to the two
//! external signals that invalidate derived state — a geometry push from the
//! rendering collaborator and the producer's "new content" notification.
//!
//! The view never owns the [`ScreenBuffer`]; every operation borrows it for
//! the duration of one call and treats the contents as a fresh snapshot.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::coords::{CoordinateMapper, Geometry};
use crate::links::LinkIndex;
use crate::mouse::{
    encode_mouse_report, MouseReport, BUTTON_PRESS, BUTTON_RELEASE, WHEEL_DOWN, WHEEL_UP,
};
use crate::screen::ScreenBuffer;
use crate::selection::{SelectionHandle, SelectionSpan, SelectionTracker};

/// Largest selection, in UTF-16 code units, that [`TerminalView::copy_text`]
/// will hand to the clipboard collaborator.
pub const MAX_COPY_UNITS: usize = 99 * 1024;

/// Error type for clipboard extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CopyError {
    #[error("selection of {len} units exceeds the copy limit of {max}")]
    TooLarge { len: usize, max: usize },
}

/// Optional gesture-capability hook.
///
/// A registered override sees each gesture before the default handling and
/// consumes it by returning `true`. The default implementations pass
/// everything through.
pub trait GestureOverride {
    /// A long press at a pixel position. Return `true` to consume.
    fn on_long_press(&mut self, px: f32, py: f32) -> bool {
        let _ = (px, py);
        false
    }

    /// A single tap at a pixel position. Return `true` to consume.
    fn on_single_tap(&mut self, px: f32, py: f32) -> bool {
        let _ = (px, py);
        false
    }

    /// A scroll gesture. Return `true` to consume.
    fn on_scroll(&mut self, px: f32, py: f32, distance_y: f32) -> bool {
        let _ = (px, py, distance_y);
        false
    }
}

/// Coordinates gestures, scrolling, and the overlay structures for one view.
pub struct TerminalView {
    mapper: CoordinateMapper,
    links: LinkIndex,
    selection: SelectionTracker,
    /// First visible row; 0 at the live screen, negative while scrolled back.
    top_row: i32,
    /// First visible column when the screen is wider than the view.
    left_column: i32,
    /// Sub-row pixel remainder carried between scroll gestures.
    scroll_remainder: f32,
    /// Whether the terminal application requested mouse reporting.
    mouse_tracking: bool,
    gesture_override: Option<Box<dyn GestureOverride>>,
}

impl TerminalView {
    /// Create a view over the given geometry.
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            mapper: CoordinateMapper::new(geometry),
            links: LinkIndex::new(geometry.columns),
            selection: SelectionTracker::new(),
            top_row: 0,
            left_column: 0,
            scroll_remainder: 0.0,
            mouse_tracking: false,
            gesture_override: None,
        }
    }

    /// The active geometry.
    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        self.mapper.geometry()
    }

    /// First visible row.
    #[must_use]
    #[inline]
    pub fn top_row(&self) -> i32 {
        self.top_row
    }

    /// First visible column.
    #[must_use]
    #[inline]
    pub fn left_column(&self) -> i32 {
        self.left_column
    }

    /// Whether mouse events are forwarded to the terminal as reports.
    #[must_use]
    pub fn mouse_tracking(&self) -> bool {
        self.mouse_tracking
    }

    /// Toggle mouse reporting.
    pub fn set_mouse_tracking(&mut self, tracking: bool) {
        self.mouse_tracking = tracking;
    }

    /// Register (or clear) the gesture-capability override.
    pub fn set_gesture_override(&mut self, hook: Option<Box<dyn GestureOverride>>) {
        self.gesture_override = hook;
    }

    /// Apply a geometry push from the rendering collaborator.
    ///
    /// Column indices from the old geometry are meaningless, so the whole
    /// link layer drops; the selection span is re-clamped rather than lost,
    /// and the scroll position resets to the live screen.
    pub fn resize(&mut self, geometry: Geometry, screen: &ScreenBuffer) {
        debug!(
            columns = geometry.columns,
            rows = geometry.rows,
            "view resized"
        );
        self.mapper.set_geometry(geometry);
        self.links.set_columns(geometry.columns);
        self.links.clear();
        self.top_row = 0;
        self.left_column = 0;
        self.scroll_remainder = 0.0;
        self.selection.clamp_rows(screen, geometry.rows);
    }

    /// React to the producer's new-content notification.
    ///
    /// Runs on the consuming thread only: snap back to the live screen and
    /// re-clamp row-count-dependent state against the current transcript.
    pub fn on_buffer_update(&mut self, screen: &ScreenBuffer) {
        self.top_row = 0;
        self.selection
            .clamp_rows(screen, self.mapper.geometry().rows);
    }

    /// Handle a long press; returns whether a selection was activated.
    pub fn long_press(
        &mut self,
        screen: &ScreenBuffer,
        px: f32,
        py: f32,
        from_mouse: bool,
    ) -> bool {
        if let Some(hook) = self.gesture_override.as_mut() {
            if hook.on_long_press(px, py) {
                return false;
            }
        }
        self.selection
            .long_press(screen, &self.mapper, px, py, self.top_row, from_mouse);
        true
    }

    /// Drag one selection endpoint.
    pub fn drag_move(&mut self, screen: &ScreenBuffer, handle: SelectionHandle, px: f32, py: f32) {
        self.selection
            .drag(screen, &self.mapper, handle, px, py, &mut self.top_row);
    }

    /// Handle a single tap.
    ///
    /// Dismisses any selection; while mouse tracking is on, yields a
    /// press/release report pair for the tapped cell.
    pub fn single_tap(&mut self, px: f32, py: f32) -> Vec<MouseReport> {
        self.selection.dismiss();
        if let Some(hook) = self.gesture_override.as_mut() {
            if hook.on_single_tap(px, py) {
                return Vec::new();
            }
        }
        if !self.mouse_tracking {
            return Vec::new();
        }
        let (x, y) = self.mapper.pixel_to_mouse_cell(px, py);
        let g = self.mapper.geometry();
        [BUTTON_PRESS, BUTTON_RELEASE]
            .iter()
            .filter_map(|&button| encode_mouse_report(button, x, y, g.columns, g.rows))
            .collect()
    }

    /// A tap outside any interactive region dismisses the selection.
    pub fn tap_outside(&mut self) {
        self.selection.dismiss();
    }

    /// Handle the back intent; returns whether it was consumed.
    pub fn back(&mut self) -> bool {
        if self.selection.is_active() {
            self.selection.dismiss();
            return true;
        }
        false
    }

    /// Handle a scroll gesture measured in pixels.
    ///
    /// Sub-row remainders accumulate across calls so slow drags still
    /// scroll. While mouse tracking is on the gesture converts into wheel
    /// reports for the terminal instead of moving the window.
    pub fn scroll_pixels(
        &mut self,
        screen: &ScreenBuffer,
        px: f32,
        py: f32,
        distance_y: f32,
    ) -> Vec<MouseReport> {
        if let Some(hook) = self.gesture_override.as_mut() {
            if hook.on_scroll(px, py, distance_y) {
                return Vec::new();
            }
        }
        let cell_height = self.mapper.geometry().cell_height;
        let total = distance_y + self.scroll_remainder;
        let mut delta_rows = (total / cell_height) as i32;
        self.scroll_remainder = total - delta_rows as f32 * cell_height;

        if self.mouse_tracking {
            let (x, y) = self.mapper.pixel_to_mouse_cell(px, py);
            let g = self.mapper.geometry();
            let mut reports = Vec::new();
            while delta_rows > 0 {
                reports.extend(encode_mouse_report(WHEEL_DOWN, x, y, g.columns, g.rows));
                delta_rows -= 1;
            }
            while delta_rows < 0 {
                reports.extend(encode_mouse_report(WHEEL_UP, x, y, g.columns, g.rows));
                delta_rows += 1;
            }
            return reports;
        }

        self.top_row = (self.top_row + delta_rows).clamp(-screen.transcript_rows(), 0);
        Vec::new()
    }

    /// Scroll by whole screenfuls; positive scrolls toward the live screen.
    pub fn page(&mut self, screen: &ScreenBuffer, delta: i32) {
        let rows = i32::from(self.mapper.geometry().rows);
        self.top_row =
            (self.top_row + rows * delta).clamp(-screen.transcript_rows(), 0);
    }

    /// Move the horizontal column window.
    pub fn page_horizontal(&mut self, delta: i32, visible_columns: i32) {
        let columns = i32::from(self.mapper.geometry().columns);
        let max_left = (columns - visible_columns).max(0);
        self.left_column = (self.left_column + delta).clamp(0, max_left);
    }

    /// Jump to the oldest transcript row.
    pub fn jump_to_top(&mut self, screen: &ScreenBuffer) {
        self.top_row = -screen.transcript_rows();
    }

    /// Jump back to the live screen.
    pub fn jump_to_bottom(&mut self) {
        self.top_row = 0;
    }

    /// Index links for every logical line crossing the visible window.
    ///
    /// Wrapped groups are consumed whole, so continuation rows are never
    /// rescanned.
    pub fn scan_visible_links(&mut self, screen: &ScreenBuffer) {
        let mut row = self.top_row;
        let end = self.top_row + i32::from(self.mapper.geometry().rows);
        while row < end {
            row += self.links.scan_from(screen, row) as i32;
        }
    }

    /// The link under a cell, if any.
    #[must_use]
    pub fn link_at_cell(&self, row: i32, col: usize) -> Option<Arc<str>> {
        self.links.link_at(row, col)
    }

    /// The link under a pixel position, if any.
    ///
    /// Proportional hit test over the visible area; degenerate view
    /// dimensions yield `None` rather than dividing by zero.
    #[must_use]
    pub fn link_at_px(
        &self,
        x: f32,
        y: f32,
        view_width: f32,
        view_height: f32,
    ) -> Option<Arc<str>> {
        if view_width <= 0.0 || view_height <= 0.0 {
            return None;
        }
        let g = self.mapper.geometry();
        let col = (x / view_width * f32::from(g.columns)).floor() as i32;
        let row = (y / view_height * f32::from(g.rows)).floor() as i32 + self.top_row;
        if col < 0 {
            return None;
        }
        self.links.link_at(row, col as usize)
    }

    /// The current selection span.
    #[must_use]
    pub fn selection_span(&self) -> SelectionSpan {
        self.selection.span()
    }

    /// Whether a selection is live.
    #[must_use]
    pub fn is_selecting(&self) -> bool {
        self.selection.is_active()
    }

    /// The text under the current selection.
    #[must_use]
    pub fn selected_text(&self, screen: &ScreenBuffer) -> String {
        self.selection.selected_text(screen)
    }

    /// Extract the selection for the clipboard and dismiss it.
    ///
    /// # Errors
    ///
    /// Returns [`CopyError::TooLarge`] for selections past the copy cap;
    /// the selection stays active so the user can shrink it.
    pub fn copy_text(&mut self, screen: &ScreenBuffer) -> Result<String, CopyError> {
        let text = self.selection.selected_text(screen);
        let len = text.encode_utf16().count();
        if len > MAX_COPY_UNITS {
            return Err(CopyError::TooLarge {
                len,
                max: MAX_COPY_UNITS,
            });
        }
        self.selection.dismiss();
        Ok(text)
    }

    /// Encode a mouse event at a pixel position.
    #[must_use]
    pub fn mouse_report(&self, button: i32, px: f32, py: f32) -> Option<MouseReport> {
        let (x, y) = self.mapper.pixel_to_mouse_cell(px, py);
        let g = self.mapper.geometry();
        encode_mouse_report(button, x, y, g.columns, g.rows)
    }
}
