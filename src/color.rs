//! Color utilities: hex parsing/formatting and tolerance matching
//!
//! Supports the hex formats `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA` for
//! CLI-facing color text, and the per-channel distance test used when
//! replacing colors in a surface.

use image::Rgba;
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Input string doesn't start with '#'
    #[error("color must start with '#'")]
    MissingHash,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// Parse a hex color string into an RGBA color.
///
/// # Supported Formats
///
/// - `#RGB` - 3-digit hex, each digit is doubled (e.g., `#F00` -> red)
/// - `#RGBA` - 4-digit hex, each digit is doubled
/// - `#RRGGBB` - 6-digit hex, alpha defaults to 255 (opaque)
/// - `#RRGGBBAA` - 8-digit hex, explicit alpha channel
///
/// # Errors
///
/// Returns `ColorError` if the input is invalid or unparseable.
pub fn parse_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    if !s.starts_with('#') {
        return Err(ColorError::MissingHash);
    }

    let hex = &s[1..];
    let len = hex.len();

    // Validate all characters are hex before slicing into pairs; this also
    // guarantees the byte length equals the digit count.
    for c in hex.chars() {
        if !c.is_ascii_hexdigit() {
            return Err(ColorError::InvalidHex(c));
        }
    }

    match len {
        3 => {
            let mut chars = hex.chars();
            let r = parse_hex_digit(chars.next().unwrap())? * 17;
            let g = parse_hex_digit(chars.next().unwrap())? * 17;
            let b = parse_hex_digit(chars.next().unwrap())? * 17;
            Ok(Rgba([r, g, b, 255]))
        }
        4 => {
            let mut chars = hex.chars();
            let r = parse_hex_digit(chars.next().unwrap())? * 17;
            let g = parse_hex_digit(chars.next().unwrap())? * 17;
            let b = parse_hex_digit(chars.next().unwrap())? * 17;
            let a = parse_hex_digit(chars.next().unwrap())? * 17;
            Ok(Rgba([r, g, b, a]))
        }
        6 => {
            let r = parse_hex_pair(&hex[0..2])?;
            let g = parse_hex_pair(&hex[2..4])?;
            let b = parse_hex_pair(&hex[4..6])?;
            Ok(Rgba([r, g, b, 255]))
        }
        8 => {
            let r = parse_hex_pair(&hex[0..2])?;
            let g = parse_hex_pair(&hex[2..4])?;
            let b = parse_hex_pair(&hex[4..6])?;
            let a = parse_hex_pair(&hex[6..8])?;
            Ok(Rgba([r, g, b, a]))
        }
        _ => Err(ColorError::InvalidLength(len)),
    }
}

/// Format an RGBA color as `#RRGGBB` or `#RRGGBBAA` (alpha omitted when opaque).
pub fn format_color(c: Rgba<u8>) -> String {
    let [r, g, b, a] = c.0;
    if a == 255 {
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    } else {
        format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
    }
}

/// Test whether two colors match within a tolerance.
///
/// A pixel matches when every channel (including alpha) differs by at most
/// `tolerance`. Tolerance 0 is an exact match.
pub fn within_tolerance(a: Rgba<u8>, b: Rgba<u8>, tolerance: u8) -> bool {
    a.0.iter()
        .zip(b.0.iter())
        .all(|(&x, &y)| x.abs_diff(y) <= tolerance)
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c)),
    }
}

/// Parse a two-character hex string to u8 (0-255)
fn parse_hex_pair(s: &str) -> Result<u8, ColorError> {
    let mut chars = s.chars();
    let high = parse_hex_digit(chars.next().unwrap())?;
    let low = parse_hex_digit(chars.next().unwrap())?;
    Ok(high * 16 + low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_color("#F00").unwrap(), Rgba([255, 0, 0, 255]));
        assert_eq!(parse_color("#F00F").unwrap(), Rgba([255, 0, 0, 255]));
        assert_eq!(parse_color("#00FF00").unwrap(), Rgba([0, 255, 0, 255]));
        assert_eq!(parse_color("#00FF0080").unwrap(), Rgba([0, 255, 0, 128]));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(parse_color(""), Err(ColorError::Empty));
        assert_eq!(parse_color("red"), Err(ColorError::MissingHash));
        assert_eq!(parse_color("#FF"), Err(ColorError::InvalidLength(2)));
        assert_eq!(parse_color("#GG0000"), Err(ColorError::InvalidHex('G')));
    }

    #[test]
    fn test_parse_rejects_non_ascii_hex() {
        // Multibyte characters must fail cleanly, not break pair slicing
        assert_eq!(parse_color("#a\u{e9}a\u{e9}"), Err(ColorError::InvalidHex('\u{e9}')));
        assert_eq!(parse_color("#ff00\u{ff10}\u{ff10}"), Err(ColorError::InvalidHex('\u{ff10}')));
    }

    #[test]
    fn test_format_color() {
        assert_eq!(format_color(Rgba([255, 0, 0, 255])), "#FF0000");
        assert_eq!(format_color(Rgba([0, 16, 32, 128])), "#00102080");
    }

    #[test]
    fn test_within_tolerance() {
        let a = Rgba([100, 100, 100, 255]);
        assert!(within_tolerance(a, Rgba([100, 100, 100, 255]), 0));
        assert!(within_tolerance(a, Rgba([105, 95, 100, 255]), 5));
        assert!(!within_tolerance(a, Rgba([106, 100, 100, 255]), 5));
        // Alpha participates in the match
        assert!(!within_tolerance(a, Rgba([100, 100, 100, 200]), 5));
    }
}
