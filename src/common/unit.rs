//! Unit conversion utilities.
//!
//! RTF measures lengths in twips (1/1440 inch) and font sizes in half-points.
//! XAML uses device-independent pixels (1/96 inch).

use std::fmt::Write;

pub const TWIPS_PER_INCH: i32 = 1440;
pub const PX_PER_INCH: i32 = 96;
pub const TWIPS_PER_PX: f64 = (TWIPS_PER_INCH / PX_PER_INCH) as f64;

#[inline]
pub fn twips_to_px(twips: i32) -> f64 {
    twips as f64 / TWIPS_PER_PX
}

#[inline]
pub fn px_to_twips(px: f64) -> i32 {
    (px * TWIPS_PER_PX).round() as i32
}

/// Half-points to pixels: `px = pt * 96 / 72 = hp * 2 / 3`.
#[inline]
pub fn half_points_to_px(half_points: i32) -> f64 {
    half_points as f64 * 2.0 / 3.0
}

#[inline]
pub fn px_to_half_points(px: f64) -> i32 {
    (px * 1.5).round() as i32
}

/// Write a number with at most two decimal places and no trailing zeros.
///
/// # Examples
///
/// ```
/// use flowrtf::common::unit::write_num;
///
/// let mut buf = String::new();
/// write_num(&mut buf, 10.0);
/// buf.push(',');
/// write_num(&mut buf, 10.5);
/// buf.push(',');
/// write_num(&mut buf, 10.123);
/// assert_eq!(buf, "10,10.5,10.12");
/// ```
#[inline]
pub fn write_num(buf: &mut String, n: f64) {
    let rounded = (n * 100.0).round() / 100.0;
    // Fast path: if it's an integer, use direct formatting
    if rounded.fract() == 0.0 && rounded.abs() < 1e10 {
        let _ = write!(buf, "{}", rounded as i64);
    } else {
        let mut buffer = ryu::Buffer::new();
        let s = buffer.format(rounded);
        if s.contains('.') && !s.contains('e') {
            buf.push_str(s.trim_end_matches('0').trim_end_matches('.'));
        } else {
            buf.push_str(s);
        }
    }
}

/// Format a number with [`write_num`] into a new string.
#[inline]
pub fn fmt_num(n: f64) -> String {
    let mut s = String::with_capacity(16);
    write_num(&mut s, n);
    s
}

/// Parse a floating point number, rejecting trailing garbage.
#[inline]
pub fn parse_f64(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    fast_float2::parse::<f64, _>(s).ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twips_pixels() {
        assert_eq!(twips_to_px(1440), 96.0);
        assert_eq!(px_to_twips(96.0), 1440);
        assert_eq!(px_to_twips(twips_to_px(2880)), 2880);
    }

    #[test]
    fn test_half_points_pixels() {
        // 12pt
        assert_eq!(half_points_to_px(24), 16.0);
        assert_eq!(px_to_half_points(16.0), 24);
        assert_eq!(fmt_num(half_points_to_px(21)), "14");
        assert_eq!(fmt_num(half_points_to_px(25)), "16.67");
        assert_eq!(px_to_half_points(16.67), 25);
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(0.0), "0");
        assert_eq!(fmt_num(-1.5), "-1.5");
        assert_eq!(fmt_num(2.999), "3");
        assert_eq!(fmt_num(0.333333), "0.33");
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64(" 12.5 "), Some(12.5));
        assert_eq!(parse_f64("12px"), None);
        assert_eq!(parse_f64(""), None);
    }
}
