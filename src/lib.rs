//! palswap - Palette-row color remapping for pixel art
//!
//! This library provides functionality to:
//! - Resolve reference palettes (PNG strips, or the built-in channel ramp)
//! - Pair source and destination palette rows and validate the pairing
//! - Compute the column correspondence between palettes of different widths
//! - Drive color replacement across every drawable surface of a document

pub mod cli;
pub mod color;
pub mod config;
pub mod correspondence;
pub mod document;
pub mod listing;
pub mod palette;
pub mod plan;
pub mod rows;
