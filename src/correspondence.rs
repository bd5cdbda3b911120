//! Column correspondence between two palettes of possibly different widths
//!
//! When the source and destination reference strips differ in width, the
//! plan iterates over the columns of the narrower strip and maps each column
//! to the nearest column of the wider strip. Iterating the narrower side
//! bounds the number of replacement operations by the smaller row length,
//! which matters because each replacement is a whole-document scan.
//!
//! The mapping depends only on the two widths, never on row content, so it
//! is computed once per swap operation.

/// A positional mapping between the columns of two reference palettes.
///
/// `len()` columns are iterated (the narrower width); `from_column(i)` and
/// `to_column(i)` give the sampled column on each side. The mapping to the
/// wider side is `round(i * wider / narrower)`, clamped to the wider strip's
/// valid range, and is monotonic non-decreasing in `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    from_width: u32,
    to_width: u32,
}

impl ColumnMap {
    /// Build the correspondence for a pair of palette widths.
    ///
    /// Widths must be at least 1 (a reference palette invariant upheld by
    /// the loader).
    pub fn new(from_width: u32, to_width: u32) -> Self {
        debug_assert!(from_width >= 1 && to_width >= 1);
        Self { from_width, to_width }
    }

    /// Number of columns iterated: the narrower of the two widths.
    pub fn len(&self) -> u32 {
        self.from_width.min(self.to_width)
    }

    /// True when both strips are zero-width (never for loaded palettes).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column sampled from the source palette for iteration index `i`.
    pub fn from_column(&self, i: u32) -> u32 {
        if self.from_width <= self.to_width {
            i
        } else {
            scale_column(i, self.to_width, self.from_width)
        }
    }

    /// Column sampled from the destination palette for iteration index `i`.
    pub fn to_column(&self, i: u32) -> u32 {
        if self.to_width <= self.from_width {
            i
        } else {
            scale_column(i, self.from_width, self.to_width)
        }
    }
}

/// Map a column of the narrower strip to the nearest column of the wider
/// strip: `round(i * wide / narrow)`, clamped to `wide - 1`.
///
/// The clamp only matters when the widths are not exact multiples; rounding
/// the last narrow column can otherwise land one past the end.
fn scale_column(i: u32, narrow: u32, wide: u32) -> u32 {
    let scaled = (i as f64 * wide as f64 / narrow as f64).round() as u32;
    scaled.min(wide - 1)
}
