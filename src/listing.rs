//! Palette identifier listing
//!
//! Turns the contents of a palette directory into an ordered list of
//! identifiers: the `.png` file stems, sorted, with the reserved sentinels
//! prepended. The destination side additionally offers the match-from
//! sentinel. Pure directory-to-list; no selection state lives here.

use crate::palette::{COLOR_CHANNEL, MATCH_FROM};
use glob::glob;
use std::path::Path;

/// Which side of the swap a list is offered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Destination,
}

/// List the `.png` stems under `palette_dir`, sorted case-sensitively.
///
/// Unreadable directories and non-UTF-8 names are skipped rather than
/// reported; a missing directory simply lists nothing.
pub fn palette_files(palette_dir: &Path) -> Vec<String> {
    let pattern = format!("{}/*.png", palette_dir.display());
    let mut stems: Vec<String> = match glob(&pattern) {
        Ok(paths) => paths
            .filter_map(Result::ok)
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect(),
        Err(_) => Vec::new(),
    };
    stems.sort();
    stems
}

/// Full identifier list for one side: reserved sentinels, then file stems.
pub fn identifiers(palette_dir: &Path, side: Side) -> Vec<String> {
    let mut out = Vec::new();
    if side == Side::Destination {
        out.push(MATCH_FROM.to_string());
    }
    out.push(COLOR_CHANNEL.to_string());
    out.extend(palette_files(palette_dir));
    out
}
