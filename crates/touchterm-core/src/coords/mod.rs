//! Pixel/cell coordinate mapping.
//!
//! Pure parameter-driven conversion between the rendering surface's pixel
//! space and terminal cell coordinates. Cell rows are addressed in the same
//! absolute frame as [`crate::screen::ScreenBuffer`]: the caller supplies the
//! current top visible row so a hit while scrolled back resolves into the
//! transcript.
//!
//! # Example
//!
//! ```
//! use touchterm_core::coords::{CoordinateMapper, Geometry};
//!
//! let geometry = Geometry::new(80, 24, 10.0, 16.0).unwrap();
//! let mapper = CoordinateMapper::new(geometry);
//! let (x, y) = mapper.cell_to_pixel(12, 5, 0);
//! let (col, row) = mapper.pixel_to_cell(x as f32, y as f32, 0);
//! assert_eq!((col, row), (12, 5));
//! ```

use thiserror::Error;

/// Vertical bias applied to touch-driven hit tests, in pixels.
///
/// Compensates for the finger (or drag handle) occluding the pressed cell;
/// mouse input is precise and gets no bias.
pub const PRESS_BIAS_Y: f32 = -40.0;

/// Error type for geometry validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("cell dimensions must be positive, got {width}x{height}")]
    DegenerateCell { width: f32, height: f32 },
}

/// Visible grid geometry, pushed by the rendering collaborator on resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Number of columns.
    pub columns: u16,
    /// Number of visible rows.
    pub rows: u16,
    /// Cell width in pixels.
    pub cell_width: f32,
    /// Cell height in pixels.
    pub cell_height: f32,
    /// Left screen margin in pixels.
    pub left_margin: f32,
    /// Top screen margin in pixels.
    pub top_margin: f32,
}

impl Geometry {
    /// Create a geometry with zero margins.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateCell`] when either cell dimension
    /// is not strictly positive.
    pub fn new(
        columns: u16,
        rows: u16,
        cell_width: f32,
        cell_height: f32,
    ) -> Result<Self, GeometryError> {
        Self::with_margins(columns, rows, cell_width, cell_height, 0.0, 0.0)
    }

    /// Create a geometry with explicit margins.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateCell`] when either cell dimension
    /// is not strictly positive.
    pub fn with_margins(
        columns: u16,
        rows: u16,
        cell_width: f32,
        cell_height: f32,
        left_margin: f32,
        top_margin: f32,
    ) -> Result<Self, GeometryError> {
        if cell_width <= 0.0 || cell_height <= 0.0 {
            return Err(GeometryError::DegenerateCell {
                width: cell_width,
                height: cell_height,
            });
        }
        Ok(Self {
            columns: columns.max(1),
            rows: rows.max(1),
            cell_width,
            cell_height,
            left_margin,
            top_margin,
        })
    }
}

/// Converts between pixel and cell coordinates.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    geometry: Geometry,
    press_bias_y: f32,
}

impl CoordinateMapper {
    /// Create a mapper over a validated geometry.
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            press_bias_y: PRESS_BIAS_Y,
        }
    }

    /// Override the touch press bias.
    #[must_use]
    pub fn with_press_bias(mut self, bias_y: f32) -> Self {
        self.press_bias_y = bias_y;
        self
    }

    /// The geometry this mapper converts against.
    #[must_use]
    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Replace the geometry on resize, keeping the press bias.
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    /// Convert a pixel position to a cell coordinate.
    ///
    /// The returned row is absolute: `top_row` (the first visible row, 0 or
    /// negative while scrolled back) is folded in.
    #[must_use]
    pub fn pixel_to_cell(&self, x: f32, y: f32, top_row: i32) -> (i32, i32) {
        let g = &self.geometry;
        debug_assert!(g.cell_width > 0.0 && g.cell_height > 0.0);
        let col = ((x - g.left_margin) / g.cell_width).ceil() as i32;
        let row = ((y - g.top_margin) / g.cell_height).ceil() as i32 + top_row;
        (col, row)
    }

    /// Convert a touch-press pixel position to a cell coordinate.
    ///
    /// Applies the occlusion bias unless the event came from a mouse.
    #[must_use]
    pub fn pixel_to_cell_biased(&self, x: f32, y: f32, top_row: i32, from_mouse: bool) -> (i32, i32) {
        let bias = if from_mouse { 0.0 } else { self.press_bias_y };
        self.pixel_to_cell(x, y + bias, top_row)
    }

    /// Convert a cell coordinate to the pixel position of its origin.
    ///
    /// The column is clamped to `[0, columns]` before conversion.
    #[must_use]
    pub fn cell_to_pixel(&self, col: i32, row: i32, top_row: i32) -> (i32, i32) {
        let g = &self.geometry;
        let col = col.clamp(0, i32::from(g.columns));
        let x = (col as f32 * g.cell_width).round() as i32 + g.left_margin as i32;
        let y = ((row - top_row) as f32 * g.cell_height).round() as i32;
        (x, y)
    }

    /// Convert a pixel position to a 1-based mouse-protocol cell.
    ///
    /// Mouse reports use floor semantics and ignore scrollback: the
    /// coordinate is relative to the visible screen only.
    #[must_use]
    pub fn pixel_to_mouse_cell(&self, x: f32, y: f32) -> (i32, i32) {
        let g = &self.geometry;
        debug_assert!(g.cell_width > 0.0 && g.cell_height > 0.0);
        let col = ((x - g.left_margin) / g.cell_width) as i32 + 1;
        let row = ((y - g.top_margin) / g.cell_height) as i32 + 1;
        (col, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mapper(columns: u16, rows: u16, cw: f32, ch: f32) -> CoordinateMapper {
        CoordinateMapper::new(Geometry::new(columns, rows, cw, ch).unwrap())
    }

    #[test]
    fn degenerate_cell_rejected() {
        assert!(matches!(
            Geometry::new(80, 24, 0.0, 16.0),
            Err(GeometryError::DegenerateCell { .. })
        ));
        assert!(Geometry::new(80, 24, 10.0, 16.0).is_ok());
    }

    #[test]
    fn round_trip_exact_without_margins() {
        let m = mapper(80, 24, 10.0, 16.0);
        for (col, row) in [(0, 0), (5, 3), (79, 23)] {
            let (x, y) = m.cell_to_pixel(col, row, 0);
            assert_eq!(m.pixel_to_cell(x as f32, y as f32, 0), (col, row));
        }
    }

    #[test]
    fn round_trip_with_scrollback_offset() {
        let m = mapper(80, 24, 10.0, 16.0);
        let top_row = -12;
        let (x, y) = m.cell_to_pixel(7, -5, top_row);
        assert_eq!(m.pixel_to_cell(x as f32, y as f32, top_row), (7, -5));
    }

    #[test]
    fn column_clamped_before_conversion() {
        let m = mapper(10, 4, 8.0, 16.0);
        assert_eq!(m.cell_to_pixel(99, 0, 0), m.cell_to_pixel(10, 0, 0));
        assert_eq!(m.cell_to_pixel(-3, 0, 0), m.cell_to_pixel(0, 0, 0));
    }

    #[test]
    fn press_bias_applies_to_touch_only() {
        let m = mapper(80, 24, 10.0, 16.0).with_press_bias(-16.0);
        let touch = m.pixel_to_cell_biased(55.0, 40.0, 0, false);
        let mouse = m.pixel_to_cell_biased(55.0, 40.0, 0, true);
        assert_eq!(touch.1 + 1, mouse.1);
        assert_eq!(touch.0, mouse.0);
    }

    #[test]
    fn mouse_cell_is_one_based_floor() {
        let m = mapper(80, 24, 10.0, 16.0);
        assert_eq!(m.pixel_to_mouse_cell(0.0, 0.0), (1, 1));
        assert_eq!(m.pixel_to_mouse_cell(9.9, 15.9), (1, 1));
        assert_eq!(m.pixel_to_mouse_cell(10.0, 16.0), (2, 2));
    }

    proptest! {
        #[test]
        fn round_trip_within_one_cell(
            col in 0i32..200,
            row in -100i32..100,
            top_row in -100i32..=0,
            cw in 4.0f32..24.0,
            ch in 8.0f32..40.0,
            left in 0.0f32..12.0,
            top in 0.0f32..12.0,
        ) {
            let g = Geometry::with_margins(200, 100, cw, ch, left, top).unwrap();
            let m = CoordinateMapper::new(g);
            let (x, y) = m.cell_to_pixel(col, row, top_row);
            let (c2, r2) = m.pixel_to_cell(x as f32, y as f32, top_row);
            prop_assert!((c2 - col).abs() <= 1);
            prop_assert!((r2 - row).abs() <= 1);
        }
    }
}
