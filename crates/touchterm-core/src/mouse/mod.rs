//! Mouse report wire encoding.
//!
//! X10-style 6-byte reports: `ESC [ M (32+button) (32+x) (32+y)` with
//! 1-based cell coordinates. The encoding is 8-bit, so coordinates cap at
//! 223; anything out of range is silently suppressed rather than clamped,
//! matching what terminal applications expect.

use tracing::{debug, warn};

/// A single encoded mouse event.
pub type MouseReport = [u8; 6];

/// Left button press.
pub const BUTTON_PRESS: i32 = 0;
/// Button release.
pub const BUTTON_RELEASE: i32 = 3;
/// Scroll wheel up.
pub const WHEEL_UP: i32 = 64;
/// Scroll wheel down.
pub const WHEEL_DOWN: i32 = 65;

/// Largest coordinate or button code the 8-bit encoding can carry.
pub const MAX_ENCODABLE: i32 = 255 - 32;

/// Encode one mouse event, or `None` when it cannot be represented.
///
/// `x` and `y` are 1-based cell coordinates. Emission requires
/// `1 <= x <= columns`, `1 <= y <= rows`, both within the 8-bit ceiling,
/// and a button code in `[0, 223]`. Out-of-range input is dropped, not an
/// error.
#[must_use]
pub fn encode_mouse_report(
    button: i32,
    x: i32,
    y: i32,
    columns: u16,
    rows: u16,
) -> Option<MouseReport> {
    if !(0..=MAX_ENCODABLE).contains(&button) {
        warn!(button, "mouse button code out of range");
        return None;
    }
    let out_of_bounds = x < 1
        || y < 1
        || x > i32::from(columns)
        || y > i32::from(rows)
        || x > MAX_ENCODABLE
        || y > MAX_ENCODABLE;
    if out_of_bounds {
        debug!(x, y, "mouse event outside reportable area");
        return None;
    }
    Some([
        0x1B,
        b'[',
        b'M',
        (32 + button) as u8,
        (32 + x) as u8,
        (32 + y) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_in_bounds_event() {
        let report = encode_mouse_report(BUTTON_PRESS, 1, 1, 80, 24).unwrap();
        assert_eq!(report, [0x1B, b'[', b'M', 32, 33, 33]);

        let report = encode_mouse_report(WHEEL_DOWN, 80, 24, 80, 24).unwrap();
        assert_eq!(report, [0x1B, b'[', b'M', 32 + 65, 32 + 80, 32 + 24]);
    }

    #[test]
    fn button_code_out_of_range_is_suppressed() {
        assert!(encode_mouse_report(300, 5, 5, 80, 24).is_none());
        assert!(encode_mouse_report(-1, 5, 5, 80, 24).is_none());
        assert!(encode_mouse_report(223, 5, 5, 80, 24).is_some());
    }

    #[test]
    fn coordinates_out_of_range_are_suppressed() {
        assert!(encode_mouse_report(0, 0, 5, 80, 24).is_none());
        assert!(encode_mouse_report(0, 5, 0, 80, 24).is_none());
        assert!(encode_mouse_report(0, 81, 5, 80, 24).is_none());
        assert!(encode_mouse_report(0, 5, 25, 80, 24).is_none());
    }

    #[test]
    fn eight_bit_ceiling_applies_even_on_huge_screens() {
        assert!(encode_mouse_report(0, 224, 5, 500, 200).is_none());
        assert!(encode_mouse_report(0, 223, 5, 500, 200).is_some());
    }
}
