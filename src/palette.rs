//! Reference palette loading and per-pixel color lookup
//!
//! A reference palette is an image used purely as a lookup table of colors,
//! indexed by (row, column). Palettes resolve by identifier: either a PNG
//! file named `{identifier}.png` under the palette directory, or the
//! reserved `<<color channel>>` identifier, which resolves to a built-in
//! channel-ramp reference generated in code.

use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reserved identifier: the built-in channel-ramp reference.
pub const COLOR_CHANNEL: &str = "<<color channel>>";

/// Reserved identifier, destination side only: reuse the source identifier.
pub const MATCH_FROM: &str = "<<match From Palette>>";

/// Width of the built-in channel reference (one column per channel value).
const CHANNEL_WIDTH: u32 = 256;

/// Error type for palette resolution failures
#[derive(Debug, Error)]
pub enum PaletteError {
    /// No palette image exists for the identifier
    #[error("palette '{identifier}' not found under {dir}")]
    NotFound { identifier: String, dir: PathBuf },
    /// The palette file exists but could not be decoded
    #[error("palette '{identifier}' could not be decoded: {source}")]
    Decode {
        identifier: String,
        #[source]
        source: image::ImageError,
    },
}

/// An in-memory reference palette, read-only for the duration of one swap.
#[derive(Debug, Clone)]
pub struct ReferencePalette {
    image: RgbaImage,
}

impl ReferencePalette {
    /// Wrap a decoded image. The image must be at least 1x1.
    pub fn new(image: RgbaImage) -> Self {
        debug_assert!(image.width() >= 1 && image.height() >= 1);
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Direct pixel fetch. Callers range-check rows against `height()`
    /// first; columns come from a `ColumnMap` and are in range by
    /// construction.
    pub fn color_at(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }
}

/// A palette resolved by identifier, with the channel-mode marker.
///
/// Channel mode is per-resolution state, not a process flag: the swap plan
/// ORs the markers of its two resolutions and reads the result later in the
/// same call.
#[derive(Debug)]
pub struct ResolvedPalette {
    pub palette: ReferencePalette,
    /// True when the identifier was the `<<color channel>>` sentinel.
    pub channel: bool,
}

/// Seam between the swap plan and palette I/O.
///
/// The plan never touches the filesystem directly; tests substitute spy
/// loaders to verify load counts and resolution order.
pub trait PaletteLoader {
    /// Resolve an identifier to a reference palette.
    ///
    /// The `<<color channel>>` sentinel resolves to the built-in channel
    /// reference regardless of `palette_dir`.
    fn resolve(&mut self, identifier: &str, palette_dir: &Path)
        -> Result<ResolvedPalette, PaletteError>;
}

/// Production loader: resolves identifiers to PNG files on disk.
#[derive(Debug, Default)]
pub struct FilePaletteLoader;

impl PaletteLoader for FilePaletteLoader {
    fn resolve(
        &mut self,
        identifier: &str,
        palette_dir: &Path,
    ) -> Result<ResolvedPalette, PaletteError> {
        if identifier == COLOR_CHANNEL {
            return Ok(ResolvedPalette {
                palette: ReferencePalette::new(channel_reference()),
                channel: true,
            });
        }

        let path = palette_dir.join(format!("{}.png", identifier));
        if !path.exists() {
            return Err(PaletteError::NotFound {
                identifier: identifier.to_string(),
                dir: palette_dir.to_path_buf(),
            });
        }

        let image = image::open(&path)
            .map_err(|source| PaletteError::Decode {
                identifier: identifier.to_string(),
                source,
            })?
            .to_rgba8();

        Ok(ResolvedPalette {
            palette: ReferencePalette::new(image),
            channel: false,
        })
    }
}

/// Build the built-in channel reference: a 256-wide strip with one row per
/// channel ramp (red, green, blue, gray), opaque.
///
/// Its width intentionally differs from typical user palettes, which is why
/// channel mode suppresses the width-mismatch confirmation.
pub fn channel_reference() -> RgbaImage {
    RgbaImage::from_fn(CHANNEL_WIDTH, 4, |x, y| {
        let v = x as u8;
        match y {
            0 => Rgba([v, 0, 0, 255]),
            1 => Rgba([0, v, 0, 255]),
            2 => Rgba([0, 0, v, 255]),
            _ => Rgba([v, v, v, 255]),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_channel_reference_shape() {
        let img = channel_reference();
        assert_eq!(img.dimensions(), (256, 4));
        assert_eq!(*img.get_pixel(255, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*img.get_pixel(128, 1), Rgba([0, 128, 0, 255]));
        assert_eq!(*img.get_pixel(64, 2), Rgba([0, 0, 64, 255]));
        assert_eq!(*img.get_pixel(10, 3), Rgba([10, 10, 10, 255]));
    }

    #[test]
    fn test_resolve_channel_sentinel_marks_channel_mode() {
        let dir = tempdir().unwrap();
        let mut loader = FilePaletteLoader;
        let resolved = loader.resolve(COLOR_CHANNEL, dir.path()).unwrap();
        assert!(resolved.channel);
        assert_eq!(resolved.palette.width(), 256);
    }

    #[test]
    fn test_resolve_file_palette() {
        let dir = tempdir().unwrap();
        let img = RgbaImage::from_pixel(4, 2, Rgba([1, 2, 3, 255]));
        img.save(dir.path().join("skin.png")).unwrap();

        let mut loader = FilePaletteLoader;
        let resolved = loader.resolve("skin", dir.path()).unwrap();
        assert!(!resolved.channel);
        assert_eq!(resolved.palette.width(), 4);
        assert_eq!(resolved.palette.height(), 2);
        assert_eq!(resolved.palette.color_at(3, 1), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_resolve_missing_palette() {
        let dir = tempdir().unwrap();
        let mut loader = FilePaletteLoader;
        let err = loader.resolve("nope", dir.path()).unwrap_err();
        assert!(matches!(err, PaletteError::NotFound { .. }));
        assert!(err.to_string().contains("nope"));
    }
}
