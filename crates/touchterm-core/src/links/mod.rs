//! Clickable-link overlay for the scrollback buffer.
//!
//! ## Design
//!
//! [`LinkIndex::scan_from`] joins a run of wrapped physical rows into one
//! logical line, matches URLs over it, and records per-row, per-column link
//! references in a layer keyed by absolute row index. Lookup is then a
//! direct array access.
//!
//! Two offset-to-cell mapping paths exist:
//!
//! - **Fast**: every joined row is basic (one code unit per column), so a
//!   code-unit offset converts with div/mod arithmetic. The end coordinate
//!   uses the *last* matched unit rather than the exclusive end, which would
//!   otherwise land one row too far when a match ends exactly at a row
//!   boundary.
//! - **Slow**: any joined row is extended, so the logical buffer is walked
//!   accumulating display width (surrogate pairs merged before lookup),
//!   wrapping whenever the accumulated width reaches the column count.
//!
//! The layer is append-only within one geometry epoch: scrollback rows are
//! immutable once appended, so an indexed row never needs rescanning. A
//! column-count change invalidates everything at once via
//! [`LinkIndex::set_columns`].

use std::sync::Arc;

use regex::Regex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::screen::ScreenBuffer;
use crate::width;

/// Scheme-general URL shape; accepted matches are filtered to http/https.
const URL_PATTERN: &str = r#"\b[A-Za-z][A-Za-z0-9+.-]*://[^\s<>"]+"#;

/// Accept only matches whose scheme is http or https.
///
/// Case-insensitive on the scheme alone; the remainder of the URL keeps its
/// case significance.
fn accepts_scheme(text: &str) -> bool {
    starts_with_ignore_ascii_case(text, "http:") || starts_with_ignore_ascii_case(text, "https:")
}

fn starts_with_ignore_ascii_case(text: &str, prefix: &str) -> bool {
    // Byte-wise so a multibyte character right after the scheme cannot land
    // a slice off a char boundary.
    let (text, prefix) = (text.as_bytes(), prefix.as_bytes());
    text.len() >= prefix.len() && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Per-row link slots and the index over them.
#[derive(Debug)]
pub struct LinkIndex {
    columns: usize,
    matcher: Regex,
    /// Absolute row index -> one optional link per column.
    layer: FxHashMap<i32, Vec<Option<Arc<str>>>>,
}

impl LinkIndex {
    /// Create an empty index for the given column count.
    #[must_use]
    pub fn new(columns: u16) -> Self {
        Self {
            columns: usize::from(columns.max(1)),
            matcher: Regex::new(URL_PATTERN).expect("built-in URL pattern compiles"),
            layer: FxHashMap::default(),
        }
    }

    /// Update the column count, dropping the whole layer when it changes.
    ///
    /// Column indices from the previous geometry are meaningless, so there
    /// is no partial invalidation.
    pub fn set_columns(&mut self, columns: u16) {
        let columns = usize::from(columns.max(1));
        if columns != self.columns {
            self.columns = columns;
            self.layer.clear();
        }
    }

    /// Drop every indexed row.
    pub fn clear(&mut self) {
        self.layer.clear();
    }

    /// Number of rows currently indexed.
    #[must_use]
    pub fn indexed_rows(&self) -> usize {
        self.layer.len()
    }

    /// Whether a row has already been indexed in this geometry epoch.
    #[must_use]
    pub fn contains_row(&self, row: i32) -> bool {
        self.layer.contains_key(&row)
    }

    /// The link covering a cell, if any.
    #[must_use]
    pub fn link_at(&self, row: i32, col: usize) -> Option<Arc<str>> {
        self.layer.get(&row)?.get(col)?.clone()
    }

    /// Scan the logical line starting at `row` and index any URLs on it.
    ///
    /// Returns the number of physical rows consumed (always at least 1) so
    /// the caller can advance its cursor past the whole wrapped group
    /// instead of rescanning continuation rows.
    pub fn scan_from(&mut self, screen: &ScreenBuffer, row: i32) -> usize {
        let Some(first) = screen.row(row) else {
            return 1;
        };
        if first.is_empty() {
            return 1;
        }

        // Join wrapped continuation rows into one logical buffer.
        let mut joined: Vec<u16> = first.units().to_vec();
        let mut all_basic = first.is_basic();
        let mut rows_consumed = 1usize;
        let mut wrapped = first.is_wrapped();
        while wrapped {
            let Some(next) = screen.row(row + rows_consumed as i32) else {
                break;
            };
            if next.is_empty() {
                break;
            }
            all_basic &= next.is_basic();
            joined.extend_from_slice(next.units());
            wrapped = next.is_wrapped();
            rows_consumed += 1;
        }

        let text: String = char::decode_utf16(joined.iter().copied())
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();

        let columns = self.columns;
        let mut link_rows: Option<Vec<Vec<Option<Arc<str>>>>> = None;
        let mut matched = 0usize;

        for m in self.matcher.find_iter(&text) {
            if !accepts_scheme(m.as_str()) {
                continue;
            }
            matched += 1;
            let url: Arc<str> = Arc::from(m.as_str());

            // Regex offsets are byte positions; the cell math needs
            // code-unit offsets into the joined buffer.
            let start = text[..m.start()].encode_utf16().count();
            let end = start + m.as_str().encode_utf16().count();

            let (start_row, start_col, end_row, end_col) = if all_basic {
                let last = end - 1;
                (
                    start / columns,
                    start % columns,
                    last / columns,
                    last % columns,
                )
            } else {
                map_offsets_by_width(&joined, start, end, columns)
            };

            let rows =
                link_rows.get_or_insert_with(|| vec![vec![None; columns]; rows_consumed]);
            for (i, slots) in rows
                .iter_mut()
                .enumerate()
                .take(end_row + 1)
                .skip(start_row)
            {
                let run_start = if i == start_row { start_col } else { 0 };
                let run_end = if i == end_row { end_col } else { columns - 1 };
                for slot in &mut slots[run_start..=run_end.min(columns - 1)] {
                    *slot = Some(Arc::clone(&url));
                }
            }
        }

        if let Some(rows) = link_rows {
            trace!(row, rows_consumed, matched, "indexed links");
            for (i, slots) in rows.into_iter().enumerate() {
                self.layer.insert(row + i as i32, slots);
            }
        }

        rows_consumed
    }
}

/// Map `[start, end)` code-unit offsets to start/end cells by walking the
/// logical buffer and accumulating display width.
///
/// The end cell is the last cell the match occupies, mirroring the fast
/// path's last-unit arithmetic: a match ending exactly at a row boundary
/// stays on that row.
fn map_offsets_by_width(
    units: &[u16],
    start: usize,
    end: usize,
    columns: usize,
) -> (usize, usize, usize, usize) {
    let mut row = 0usize;
    let mut col = 0usize;
    let mut start_cell: Option<(usize, usize)> = None;
    let mut end_cell: Option<(usize, usize)> = None;

    for sc in width::scalars(units) {
        if sc.offset >= end {
            break;
        }
        if sc.offset >= start {
            if start_cell.is_none() {
                start_cell = Some((row, col));
            }
            let w = usize::from(sc.width);
            if w > 0 {
                end_cell = Some((row, (col + w - 1).min(columns - 1)));
            }
        }
        col += usize::from(sc.width);
        if col >= columns {
            row += 1;
            col %= columns;
        }
    }

    let start_cell = start_cell.unwrap_or((row, col));
    let end_cell = end_cell.unwrap_or(start_cell);
    (start_cell.0, start_cell.1, end_cell.0, end_cell.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::Row;

    fn screen(columns: u16, rows: u16, lines: &[Row]) -> ScreenBuffer {
        let mut buf = ScreenBuffer::new(columns, rows);
        for line in lines {
            buf.push_row(line.clone());
        }
        buf
    }

    fn padded(text: &str, columns: usize) -> Row {
        let mut s = text.to_string();
        while s.encode_utf16().count() < columns {
            s.push(' ');
        }
        Row::basic_str(&s)
    }

    #[test]
    fn basic_line_offsets_map_by_div_mod() {
        let buf = screen(80, 4, &[padded("visit http://x.test now", 80)]);
        let mut index = LinkIndex::new(80);
        assert_eq!(index.scan_from(&buf, 0), 1);

        // Covered run is columns 6..=18 (last character, not one past it).
        assert!(index.link_at(0, 5).is_none());
        assert_eq!(index.link_at(0, 6).as_deref(), Some("http://x.test"));
        assert_eq!(index.link_at(0, 18).as_deref(), Some("http://x.test"));
        assert!(index.link_at(0, 19).is_none());
    }

    #[test]
    fn wrapped_link_spans_both_rows() {
        let buf = screen(
            10,
            4,
            &[
                Row::basic_str("http://exa").with_wrapped(true),
                padded("mple.test", 10),
            ],
        );
        let mut index = LinkIndex::new(10);
        assert_eq!(index.scan_from(&buf, 0), 2);

        assert_eq!(index.link_at(0, 0).as_deref(), Some("http://example.test"));
        assert_eq!(index.link_at(0, 9).as_deref(), Some("http://example.test"));
        assert_eq!(index.link_at(1, 0).as_deref(), Some("http://example.test"));
        assert_eq!(index.link_at(1, 8).as_deref(), Some("http://example.test"));
        assert!(index.link_at(1, 9).is_none());
    }

    #[test]
    fn scheme_filter_is_case_insensitive_and_http_only() {
        let buf = screen(
            80,
            4,
            &[
                padded("see HTTPS://Example.test/Path", 80),
                padded("get ftp://files.test/x", 80),
            ],
        );
        let mut index = LinkIndex::new(80);
        index.scan_from(&buf, 0);
        index.scan_from(&buf, 1);

        assert_eq!(
            index.link_at(0, 4).as_deref(),
            Some("HTTPS://Example.test/Path")
        );
        assert!(index.link_at(1, 4).is_none());
    }

    #[test]
    fn extended_rows_take_the_width_path() {
        // 中中 occupy columns 0-3 and the space column 4, so the URL starts
        // at column 5.
        let buf = screen(40, 4, &[Row::extended_str("中中 http://x.test")]);
        let mut index = LinkIndex::new(40);
        index.scan_from(&buf, 0);

        assert!(index.link_at(0, 4).is_none());
        assert_eq!(index.link_at(0, 5).as_deref(), Some("http://x.test"));
        assert_eq!(index.link_at(0, 17).as_deref(), Some("http://x.test"));
        assert!(index.link_at(0, 18).is_none());
    }

    #[test]
    fn surrogate_pairs_count_their_full_width() {
        // 😀 is one scalar (two code units) and two columns wide.
        let buf = screen(40, 4, &[Row::extended_str("\u{1F600}http://x.test")]);
        let mut index = LinkIndex::new(40);
        index.scan_from(&buf, 0);

        assert!(index.link_at(0, 1).is_none());
        assert_eq!(index.link_at(0, 2).as_deref(), Some("http://x.test"));
        assert_eq!(index.link_at(0, 14).as_deref(), Some("http://x.test"));
    }

    #[test]
    fn wrapped_extended_match_ending_at_row_boundary() {
        // Ten columns; the URL's last character lands exactly on the row
        // boundary of the second row. The end cell must stay on row 1.
        let buf = screen(
            10,
            4,
            &[
                Row::extended_str("http://exa").with_wrapped(true),
                Row::extended_str("mple.tests"),
            ],
        );
        let mut index = LinkIndex::new(10);
        assert_eq!(index.scan_from(&buf, 0), 2);
        assert_eq!(index.link_at(1, 9).as_deref(), Some("http://example.tests"));
        assert!(index.link_at(2, 0).is_none());
    }

    #[test]
    fn empty_or_missing_row_consumes_one() {
        let mut buf = ScreenBuffer::new(10, 4);
        buf.push_row(Row::extended_str(""));
        let mut index = LinkIndex::new(10);
        assert_eq!(index.scan_from(&buf, 0), 1);
        assert_eq!(index.scan_from(&buf, 7), 1);
        assert_eq!(index.indexed_rows(), 0);
    }

    #[test]
    fn rows_without_links_are_not_installed() {
        let buf = screen(20, 4, &[padded("plain text only", 20)]);
        let mut index = LinkIndex::new(20);
        index.scan_from(&buf, 0);
        assert!(!index.contains_row(0));
        assert!(index.link_at(0, 3).is_none());
    }

    #[test]
    fn column_change_invalidates_everything() {
        let buf = screen(80, 4, &[padded("go http://a.test", 80)]);
        let mut index = LinkIndex::new(80);
        index.scan_from(&buf, 0);
        assert!(index.contains_row(0));

        index.set_columns(40);
        assert_eq!(index.indexed_rows(), 0);

        // Same width is not a geometry change.
        index.scan_from(&buf, 0);
        index.set_columns(40);
        assert!(index.contains_row(0));
    }

    #[test]
    fn scan_into_scrollback_rows() {
        let mut buf = ScreenBuffer::new(80, 2);
        buf.push_row(padded("old http://old.test line", 80));
        buf.push_row(padded("newer", 80));
        buf.push_row(padded("newest", 80));
        // The first row spilled into the transcript at index -1.
        let mut index = LinkIndex::new(80);
        index.scan_from(&buf, -1);
        assert_eq!(index.link_at(-1, 4).as_deref(), Some("http://old.test"));
    }
}
