//! Document abstraction: drawable surfaces and the replace-color primitive
//!
//! The swap plan drives mutation through this seam. A document exposes an
//! ordered stack of drawable surfaces (one per layer/frame), a settable
//! current-surface cursor, and a replace-color primitive that applies to
//! whichever surface is currently selected. `RasterDocument` is the
//! in-memory implementation used by the CLI and tests; a host application
//! can supply its own.

use crate::color::within_tolerance;
use image::{Rgba, RgbaImage};
use thiserror::Error;

/// Error type for document mutation failures
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Surface index past the end of the surface stack
    #[error("surface index {index} out of range (document has {count} surfaces)")]
    SurfaceOutOfRange { index: usize, count: usize },
}

/// A mutable stack of drawable surfaces with a current-surface cursor.
pub trait Document {
    /// Number of drawable surfaces (layer/frame combinations).
    fn surface_count(&self) -> usize;

    /// The currently selected surface index.
    fn current_surface(&self) -> usize;

    /// Select a surface. Subsequent `replace_color` calls apply to it.
    fn set_current_surface(&mut self, index: usize) -> Result<(), DocumentError>;

    /// Replace every pixel of the current surface matching `from` within
    /// `tolerance` with `to`. Returns the number of pixels changed.
    fn replace_color(
        &mut self,
        from: Rgba<u8>,
        to: Rgba<u8>,
        tolerance: u8,
    ) -> Result<u64, DocumentError>;
}

/// In-memory document: an ordered stack of RGBA layers.
#[derive(Debug, Clone)]
pub struct RasterDocument {
    layers: Vec<RgbaImage>,
    current: usize,
}

impl RasterDocument {
    /// Build a document from an ordered stack of layers. The cursor starts
    /// at surface 0.
    pub fn new(layers: Vec<RgbaImage>) -> Self {
        Self { layers, current: 0 }
    }

    /// Borrow the layer stack, e.g. to write results back to disk.
    pub fn layers(&self) -> &[RgbaImage] {
        &self.layers
    }

    /// Consume the document, yielding the layer stack.
    pub fn into_layers(self) -> Vec<RgbaImage> {
        self.layers
    }
}

impl Document for RasterDocument {
    fn surface_count(&self) -> usize {
        self.layers.len()
    }

    fn current_surface(&self) -> usize {
        self.current
    }

    fn set_current_surface(&mut self, index: usize) -> Result<(), DocumentError> {
        if index >= self.layers.len() {
            return Err(DocumentError::SurfaceOutOfRange {
                index,
                count: self.layers.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    fn replace_color(
        &mut self,
        from: Rgba<u8>,
        to: Rgba<u8>,
        tolerance: u8,
    ) -> Result<u64, DocumentError> {
        let layer = &mut self.layers[self.current];
        let mut changed = 0u64;
        for pixel in layer.pixels_mut() {
            if within_tolerance(*pixel, from, tolerance) {
                *pixel = to;
                changed += 1;
            }
        }
        Ok(changed)
    }
}
