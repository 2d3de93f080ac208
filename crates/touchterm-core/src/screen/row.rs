//! Row storage for the screen buffer.
//!
//! A row is one of two encodings:
//!
//! - **Basic**: every stored code unit is valid text and occupies exactly one
//!   column. The stored length is the row width.
//! - **Extended**: valid text ends at the first NUL code unit; anything after
//!   it is unspecified garbage left over from earlier writes. All accessors
//!   go through [`Row::units`], which truncates at the terminator, so the
//!   garbage tail is never observable.
//!
//! A row additionally carries [`RowFlags`]; the `WRAPPED` bit marks a row
//! whose content continues into the next physical row as one logical line.

use bitflags::bitflags;

use crate::width;

bitflags! {
    /// Per-row attribute bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RowFlags: u8 {
        /// Content continues into the next physical row.
        const WRAPPED = 1 << 0;
    }
}

/// Row text storage, tagged by encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RowStorage {
    /// One code unit per column; full stored length is valid.
    Basic(Vec<u16>),
    /// NUL-terminated; units past the terminator are garbage.
    Extended(Vec<u16>),
}

/// A single physical screen row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    storage: RowStorage,
    flags: RowFlags,
}

impl Row {
    /// Create a basic row from raw code units.
    ///
    /// Basic rows promise one unit per column; callers are expected to store
    /// exactly the screen width, space-padded.
    #[must_use]
    pub fn basic(units: Vec<u16>) -> Self {
        Self {
            storage: RowStorage::Basic(units),
            flags: RowFlags::empty(),
        }
    }

    /// Create an extended row from raw code units.
    ///
    /// The slice may carry garbage after the first NUL; it will never be
    /// read.
    #[must_use]
    pub fn extended(units: Vec<u16>) -> Self {
        Self {
            storage: RowStorage::Extended(units),
            flags: RowFlags::empty(),
        }
    }

    /// Create a basic row from a string.
    #[must_use]
    pub fn basic_str(text: &str) -> Self {
        Self::basic(text.encode_utf16().collect())
    }

    /// Create a NUL-terminated extended row from a string.
    #[must_use]
    pub fn extended_str(text: &str) -> Self {
        let mut units: Vec<u16> = text.encode_utf16().collect();
        units.push(0);
        Self::extended(units)
    }

    /// Set the wrap flag, builder style.
    #[must_use]
    pub fn with_wrapped(mut self, wrapped: bool) -> Self {
        self.set_wrapped(wrapped);
        self
    }

    /// Mark whether this row continues into the next physical row.
    pub fn set_wrapped(&mut self, wrapped: bool) {
        self.flags.set(RowFlags::WRAPPED, wrapped);
    }

    /// Whether this row continues into the next physical row.
    #[must_use]
    #[inline]
    pub fn is_wrapped(&self) -> bool {
        self.flags.contains(RowFlags::WRAPPED)
    }

    /// Whether this row uses the basic (one unit per column) encoding.
    #[must_use]
    #[inline]
    pub fn is_basic(&self) -> bool {
        matches!(self.storage, RowStorage::Basic(_))
    }

    /// The valid code units of this row.
    ///
    /// For an extended row this stops at the first NUL; the tail past it is
    /// unspecified and never returned.
    #[must_use]
    pub fn units(&self) -> &[u16] {
        match &self.storage {
            RowStorage::Basic(units) => units,
            RowStorage::Extended(units) => {
                let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
                &units[..end]
            }
        }
    }

    /// Whether the row has no valid text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units().is_empty()
    }

    /// The row text as a string.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf16_lossy(self.units())
    }

    /// Text covering the column range `[start_col, end_col)`.
    ///
    /// Basic rows index directly. Extended rows walk the units accumulating
    /// display width; a character is included when its cells intersect the
    /// range, and zero-width marks ride along with their base character.
    #[must_use]
    pub fn column_range_text(&self, start_col: usize, end_col: usize) -> String {
        if end_col <= start_col {
            return String::new();
        }
        match &self.storage {
            RowStorage::Basic(units) => {
                let lo = start_col.min(units.len());
                let hi = end_col.min(units.len());
                String::from_utf16_lossy(&units[lo..hi])
            }
            RowStorage::Extended(_) => {
                let mut out = String::new();
                let mut col = 0usize;
                let mut last_included = false;
                for sc in width::scalars(self.units()) {
                    let w = usize::from(sc.width);
                    if w == 0 {
                        if last_included {
                            out.push(sc.ch);
                        }
                        continue;
                    }
                    let cell_end = col + w;
                    let included = col < end_col && cell_end > start_col;
                    if included {
                        out.push(sc.ch);
                    }
                    last_included = included;
                    col = cell_end;
                }
                out
            }
        }
    }

    /// The character occupying a single column, or an empty string past the
    /// end of the text.
    #[must_use]
    pub fn column_text(&self, col: usize) -> String {
        self.column_range_text(col, col + 1)
    }

    /// Snap a column to the nearest valid cell boundary on this row.
    ///
    /// A column landing inside a double-width glyph's second cell moves to
    /// the glyph's end boundary; everything else passes through unchanged.
    #[must_use]
    pub fn snap_column(&self, col: i32) -> i32 {
        if self.is_basic() {
            // One unit per column: every boundary is valid.
            return col;
        }
        let mut c = 0i32;
        for sc in width::scalars(self.units()) {
            let cell_end = c + i32::from(sc.width);
            if col > c && col < cell_end {
                return cell_end;
            }
            c = cell_end;
        }
        col
    }
}
