//! Screen coordinate and overlay core for a touch-driven terminal view.
//!
//! This crate reconciles three coordinate systems — pixels, UTF-16 code-unit
//! offsets, and terminal cell columns — over a scrollback buffer whose rows
//! may be fixed-width or wide-character aware, and keeps two overlay
//! structures consistent with it:
//!
//! - a clickable-link layer ([`links::LinkIndex`]) built by scanning
//!   wrap-joined logical lines for URLs, and
//! - a two-endpoint text selection ([`selection::SelectionTracker`]) driven
//!   by long-press and handle-drag gestures.
//!
//! ## Modules
//!
//! - [`width`] — display width classification and UTF-16 surrogate handling
//! - [`screen`] — row storage (basic/extended encodings) and the scrollback
//!   buffer
//! - [`coords`] — pixel ⇄ cell conversion
//! - [`links`] — URL span indexing and lookup
//! - [`selection`] — selection state machine and handle geometry
//! - [`mouse`] — mouse report wire encoding
//! - [`view`] — per-view coordination of gestures, scrolling, and overlays
//!
//! ## Threading
//!
//! Everything here runs on one consuming thread; the buffer's producer hands
//! off through a notification, never by calling in. No operation blocks, and
//! no locking exists anywhere in the crate.
//!
//! # Example
//!
//! ```
//! use touchterm_core::coords::Geometry;
//! use touchterm_core::screen::{Row, ScreenBuffer};
//! use touchterm_core::view::TerminalView;
//!
//! let mut screen = ScreenBuffer::new(80, 24);
//! screen.push_row(Row::basic_str("see http://example.test for details"));
//!
//! let geometry = Geometry::new(80, 24, 10.0, 16.0).unwrap();
//! let mut view = TerminalView::new(geometry);
//! view.scan_visible_links(&screen);
//!
//! let url = view.link_at_cell(0, 8).unwrap();
//! assert_eq!(&*url, "http://example.test");
//! ```

pub mod coords;
pub mod links;
pub mod mouse;
pub mod screen;
pub mod selection;
pub mod view;
pub mod width;

pub use coords::{CoordinateMapper, Geometry, GeometryError};
pub use links::LinkIndex;
pub use mouse::{encode_mouse_report, MouseReport};
pub use screen::{Row, RowFlags, ScreenBuffer};
pub use selection::{SelectionHandle, SelectionSpan, SelectionTracker};
pub use view::{CopyError, GestureOverride, TerminalView};
