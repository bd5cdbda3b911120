//! Swap plan: validation, column correspondence, and replacement driving
//!
//! `SwapPlan::prepare` validates a request, loads both reference palettes,
//! and fixes the column correspondence. `execute` wraps that with the
//! width-mismatch confirmation and drives the replacement pairs across
//! every drawable surface of a document.
//!
//! Validation aggregates every applicable message before failing, so a
//! caller can report all problems at once instead of one per attempt.

use crate::correspondence::ColumnMap;
use crate::document::{Document, DocumentError};
use crate::palette::{PaletteError, PaletteLoader, ReferencePalette, MATCH_FROM};
use crate::rows::{out_of_range, parse_rows};
use image::Rgba;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for swap failures
#[derive(Debug, Error)]
pub enum SwapError {
    /// One or more validation messages; surfaced verbatim to the user
    #[error("invalid swap request:\n{}", messages.join("\n"))]
    Validation { messages: Vec<String> },
    /// A palette identifier could not be resolved
    #[error(transparent)]
    Palette(#[from] PaletteError),
    /// The document rejected a mutation mid-application; earlier pairs may
    /// already have been applied (no rollback)
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Everything one swap operation needs from the caller.
#[derive(Debug, Clone)]
pub struct SwapRequest {
    /// Directory holding the palette PNG files
    pub palette_dir: PathBuf,
    /// Source palette identifier (must not be the match-from sentinel)
    pub from_identifier: String,
    /// Source rows, as free text (whitespace-separated indices)
    pub from_rows_text: String,
    /// Destination palette identifier, or `<<match From Palette>>`
    pub to_identifier: String,
    /// Destination rows, as free text
    pub to_rows_text: String,
    /// Per-channel match tolerance, 0-255
    pub tolerance: u8,
    /// Ask for confirmation when the two palettes differ in width
    pub check_widths: bool,
}

/// One replacement instruction, applied across the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplacementPair {
    pub from: Rgba<u8>,
    pub to: Rgba<u8>,
    pub tolerance: u8,
}

/// Summary of a completed swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapResult {
    /// Number of surfaces the replacements were applied to
    pub surfaces_modified: usize,
    /// Number of replacement pairs emitted
    pub pairs_applied: usize,
    /// Total pixels changed across all surfaces
    pub pixels_changed: u64,
}

/// Terminal state of an `execute` call that did not fail.
///
/// Declining the width-mismatch confirmation is a normal early exit, not an
/// error, so it lives here rather than in `SwapError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    Applied(SwapResult),
    Cancelled,
}

/// Yes/no confirmation seam for the width-mismatch check.
pub trait WidthPrompt {
    /// Return true to proceed with mismatched palette widths.
    fn confirm_width_mismatch(&mut self, from_width: u32, to_width: u32) -> bool;
}

/// Prompt that accepts every width mismatch (non-interactive callers).
#[derive(Debug, Default)]
pub struct AcceptAllWidths;

impl WidthPrompt for AcceptAllWidths {
    fn confirm_width_mismatch(&mut self, _from_width: u32, _to_width: u32) -> bool {
        true
    }
}

/// A validated, loaded swap: palettes, row pairing, and column map.
#[derive(Debug)]
pub struct SwapPlan {
    from_palette: ReferencePalette,
    to_palette: ReferencePalette,
    from_rows: Vec<u32>,
    to_rows: Vec<u32>,
    /// True when either side resolved the `<<color channel>>` sentinel
    channel: bool,
    map: ColumnMap,
    tolerance: u8,
}

impl SwapPlan {
    /// Validate a request and load both palettes.
    ///
    /// Collects every validation message before failing; palettes are only
    /// loaded once the textual checks all pass. Row indices are then
    /// range-checked against the loaded palette heights, again aggregating
    /// all offending indices per side.
    pub fn prepare(
        request: &SwapRequest,
        loader: &mut dyn PaletteLoader,
    ) -> Result<Self, SwapError> {
        let mut messages = Vec::new();

        // The match-from sentinel is only meaningful on the destination side.
        if request.from_identifier == MATCH_FROM {
            messages.push(format!(
                "'{}' is not a valid source palette",
                MATCH_FROM
            ));
        }

        let from_rows = match parse_rows(&request.from_rows_text) {
            Ok(rows) => Some(rows),
            Err(e) => {
                messages.push(format!("From rows: {}", e));
                None
            }
        };
        let to_rows = match parse_rows(&request.to_rows_text) {
            Ok(rows) => Some(rows),
            Err(e) => {
                messages.push(format!("To rows: {}", e));
                None
            }
        };

        // Rows pair positionally, so the counts must line up.
        if let (Some(f), Some(t)) = (&from_rows, &to_rows) {
            if f.len() != t.len() {
                messages.push(format!(
                    "row count mismatch: {} from row(s) vs {} to row(s)",
                    f.len(),
                    t.len()
                ));
            }
        }

        if !messages.is_empty() {
            return Err(SwapError::Validation { messages });
        }
        let from_rows = from_rows.unwrap_or_default();
        let to_rows = to_rows.unwrap_or_default();

        // Resolve the sentinel to a concrete identifier, then load both
        // sides through the loader seam.
        let to_identifier = if request.to_identifier == MATCH_FROM {
            request.from_identifier.as_str()
        } else {
            request.to_identifier.as_str()
        };

        let from = loader.resolve(&request.from_identifier, &request.palette_dir)?;
        let to = loader.resolve(to_identifier, &request.palette_dir)?;
        let channel = from.channel || to.channel;

        let bad_from = out_of_range(&from_rows, from.palette.height());
        if !bad_from.is_empty() {
            messages.push(range_message(
                &request.from_identifier,
                from.palette.height(),
                &bad_from,
            ));
        }
        let bad_to = out_of_range(&to_rows, to.palette.height());
        if !bad_to.is_empty() {
            messages.push(range_message(to_identifier, to.palette.height(), &bad_to));
        }
        if !messages.is_empty() {
            return Err(SwapError::Validation { messages });
        }

        let map = ColumnMap::new(from.palette.width(), to.palette.width());

        Ok(Self {
            from_palette: from.palette,
            to_palette: to.palette,
            from_rows,
            to_rows,
            channel,
            map,
            tolerance: request.tolerance,
        })
    }

    /// The mismatched widths, if the two palettes differ.
    pub fn width_mismatch(&self) -> Option<(u32, u32)> {
        let (fw, tw) = (self.from_palette.width(), self.to_palette.width());
        (fw != tw).then_some((fw, tw))
    }

    /// True when either palette resolved the channel sentinel. Channel
    /// references are expected to differ in width from user palettes, so
    /// the width-mismatch confirmation is suppressed.
    pub fn channel_mode(&self) -> bool {
        self.channel
    }

    /// Materialize the replacement pairs in application order: row pairs in
    /// request order, columns ascending over the narrower palette's width.
    pub fn replacement_pairs(&self) -> Vec<ReplacementPair> {
        let mut pairs =
            Vec::with_capacity(self.from_rows.len() * self.map.len() as usize);
        for (&from_row, &to_row) in self.from_rows.iter().zip(&self.to_rows) {
            for i in 0..self.map.len() {
                pairs.push(ReplacementPair {
                    from: self
                        .from_palette
                        .color_at(self.map.from_column(i), from_row),
                    to: self.to_palette.color_at(self.map.to_column(i), to_row),
                    tolerance: self.tolerance,
                });
            }
        }
        pairs
    }

    /// Apply every replacement pair to every surface of the document.
    ///
    /// The current-surface cursor is restored afterward, including when a
    /// mutation fails partway. A mid-application failure leaves earlier
    /// replacements in place; there is no rollback.
    pub fn apply(&self, document: &mut dyn Document) -> Result<SwapResult, SwapError> {
        let saved_surface = document.current_surface();
        let applied = self.apply_inner(document);
        // Nothing to restore on an empty document; the cursor was never moved
        let restored = if document.surface_count() == 0 {
            Ok(())
        } else {
            document.set_current_surface(saved_surface)
        };
        let (pairs_applied, pixels_changed) = applied?;
        restored?;

        Ok(SwapResult {
            surfaces_modified: document.surface_count(),
            pairs_applied,
            pixels_changed,
        })
    }

    fn apply_inner(
        &self,
        document: &mut dyn Document,
    ) -> Result<(usize, u64), SwapError> {
        let mut pairs_applied = 0usize;
        let mut pixels_changed = 0u64;
        for pair in self.replacement_pairs() {
            for surface in 0..document.surface_count() {
                document.set_current_surface(surface)?;
                pixels_changed +=
                    document.replace_color(pair.from, pair.to, pair.tolerance)?;
            }
            pairs_applied += 1;
        }
        Ok((pairs_applied, pixels_changed))
    }
}

/// Validate, load, confirm widths if needed, and apply.
///
/// This is the one-call entry point: the request/response shape of the
/// whole operation. Declining the width confirmation returns
/// `SwapOutcome::Cancelled` with no surface mutated.
pub fn execute(
    request: &SwapRequest,
    loader: &mut dyn PaletteLoader,
    prompt: &mut dyn WidthPrompt,
    document: &mut dyn Document,
) -> Result<SwapOutcome, SwapError> {
    let plan = SwapPlan::prepare(request, loader)?;

    if let Some((fw, tw)) = plan.width_mismatch() {
        if !plan.channel_mode()
            && request.check_widths
            && !prompt.confirm_width_mismatch(fw, tw)
        {
            return Ok(SwapOutcome::Cancelled);
        }
    }

    let result = plan.apply(document)?;
    Ok(SwapOutcome::Applied(result))
}

fn range_message(identifier: &str, height: u32, bad: &[u32]) -> String {
    let list: Vec<String> = bad.iter().map(|r| r.to_string()).collect();
    format!(
        "rows out of range for '{}' (height {}): {}",
        identifier,
        height,
        list.join(" ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RasterDocument;
    use crate::palette::{ResolvedPalette, COLOR_CHANNEL};
    use image::{Rgba, RgbaImage};
    use std::collections::HashMap;
    use std::path::Path;

    /// Loader backed by in-memory images, recording every resolve call.
    struct SpyLoader {
        palettes: HashMap<String, RgbaImage>,
        resolved: Vec<String>,
    }

    impl SpyLoader {
        fn new(palettes: &[(&str, RgbaImage)]) -> Self {
            Self {
                palettes: palettes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                resolved: Vec::new(),
            }
        }
    }

    impl PaletteLoader for SpyLoader {
        fn resolve(
            &mut self,
            identifier: &str,
            palette_dir: &Path,
        ) -> Result<ResolvedPalette, PaletteError> {
            self.resolved.push(identifier.to_string());
            if identifier == COLOR_CHANNEL {
                return Ok(ResolvedPalette {
                    palette: ReferencePalette::new(crate::palette::channel_reference()),
                    channel: true,
                });
            }
            match self.palettes.get(identifier) {
                Some(img) => Ok(ResolvedPalette {
                    palette: ReferencePalette::new(img.clone()),
                    channel: false,
                }),
                None => Err(PaletteError::NotFound {
                    identifier: identifier.to_string(),
                    dir: palette_dir.to_path_buf(),
                }),
            }
        }
    }

    /// Prompt that records whether it was asked, answering a fixed way.
    struct SpyPrompt {
        answer: bool,
        asked: bool,
    }

    impl SpyPrompt {
        fn answering(answer: bool) -> Self {
            Self { answer, asked: false }
        }
    }

    impl WidthPrompt for SpyPrompt {
        fn confirm_width_mismatch(&mut self, _: u32, _: u32) -> bool {
            self.asked = true;
            self.answer
        }
    }

    /// A palette strip where row y, column x holds a distinct color.
    fn strip(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(10 * x + 1) as u8, (10 * y + 1) as u8, 7, 255])
        })
    }

    fn request(from: &str, from_rows: &str, to: &str, to_rows: &str) -> SwapRequest {
        SwapRequest {
            palette_dir: PathBuf::from("unused"),
            from_identifier: from.to_string(),
            from_rows_text: from_rows.to_string(),
            to_identifier: to.to_string(),
            to_rows_text: to_rows.to_string(),
            tolerance: 0,
            check_widths: true,
        }
    }

    fn validation_messages(err: SwapError) -> Vec<String> {
        match err {
            SwapError::Validation { messages } => messages,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_well_formed_request_passes_validation() {
        let mut loader = SpyLoader::new(&[("a", strip(4, 8)), ("b", strip(4, 8))]);
        let plan = SwapPlan::prepare(&request("a", "1 2", "b", "3 4"), &mut loader);
        assert!(plan.is_ok());
    }

    #[test]
    fn test_match_sentinel_invalid_as_source() {
        let mut loader = SpyLoader::new(&[]);
        let err = SwapPlan::prepare(&request(MATCH_FROM, "1", "b", "1"), &mut loader)
            .unwrap_err();
        let messages = validation_messages(err);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains(MATCH_FROM));
        assert!(loader.resolved.is_empty());
    }

    #[test]
    fn test_validation_aggregates_all_messages() {
        let mut loader = SpyLoader::new(&[]);
        // Bad source sentinel plus two unparseable row fields
        let err = SwapPlan::prepare(&request(MATCH_FROM, "", "b", "1 x"), &mut loader)
            .unwrap_err();
        let messages = validation_messages(err);
        assert_eq!(messages.len(), 3);
        assert!(messages[1].starts_with("From rows:"));
        assert!(messages[2].starts_with("To rows:"));
    }

    #[test]
    fn test_length_mismatch_loads_no_palette() {
        let mut loader = SpyLoader::new(&[("a", strip(4, 8)), ("b", strip(4, 8))]);
        let err = SwapPlan::prepare(&request("a", "1 2", "b", "3"), &mut loader)
            .unwrap_err();
        let messages = validation_messages(err);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("2 from row(s) vs 1 to row(s)"));
        // Nothing may be loaded when textual validation fails
        assert!(loader.resolved.is_empty());
    }

    #[test]
    fn test_match_sentinel_resolves_to_source_before_loading() {
        let mut loader = SpyLoader::new(&[("a", strip(4, 8))]);
        SwapPlan::prepare(&request("a", "1", MATCH_FROM, "2"), &mut loader).unwrap();
        assert_eq!(loader.resolved, vec!["a".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_row_equal_to_height_reported_out_of_range() {
        let mut loader = SpyLoader::new(&[("a", strip(4, 8)), ("b", strip(4, 6))]);
        let err = SwapPlan::prepare(&request("a", "8", "b", "6"), &mut loader)
            .unwrap_err();
        let messages = validation_messages(err);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("'a'"));
        assert!(messages[0].contains("height 8"));
        assert!(messages[0].ends_with("8"));
        assert!(messages[1].contains("'b'"));
        assert!(messages[1].contains("height 6"));
    }

    #[test]
    fn test_missing_palette_is_not_found() {
        let mut loader = SpyLoader::new(&[("a", strip(4, 8))]);
        let err =
            SwapPlan::prepare(&request("a", "1", "ghost", "1"), &mut loader).unwrap_err();
        assert!(matches!(err, SwapError::Palette(PaletteError::NotFound { .. })));
    }

    #[test]
    fn test_replacement_pairs_scaled_widths() {
        // from width 4, to width 8: 4 pairs, destination columns {0,2,4,6}
        let mut loader = SpyLoader::new(&[("a", strip(4, 8)), ("b", strip(8, 8))]);
        let mut req = request("a", "1", "b", "3");
        req.tolerance = 10;
        req.check_widths = false;
        let plan = SwapPlan::prepare(&req, &mut loader).unwrap();

        let pairs = plan.replacement_pairs();
        assert_eq!(pairs.len(), 4);
        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(pair.tolerance, 10);
            // Source column i of row 1, destination column 2i of row 3
            assert_eq!(pair.from, Rgba([(10 * i + 1) as u8, 11, 7, 255]));
            assert_eq!(pair.to, Rgba([(20 * i + 1) as u8, 31, 7, 255]));
        }
    }

    #[test]
    fn test_channel_mode_suppresses_width_prompt() {
        let mut loader = SpyLoader::new(&[("a", strip(4, 8))]);
        let mut prompt = SpyPrompt::answering(false);
        let mut doc = RasterDocument::new(vec![RgbaImage::new(2, 2)]);

        // Channel reference is 256 wide, palette 'a' is 4 wide; the
        // mismatch must not reach the prompt even with check_widths on.
        let outcome = execute(
            &request("a", "1", COLOR_CHANNEL, "0"),
            &mut loader,
            &mut prompt,
            &mut doc,
        )
        .unwrap();
        assert!(!prompt.asked);
        assert!(matches!(outcome, SwapOutcome::Applied(_)));
    }

    #[test]
    fn test_declined_width_prompt_cancels_without_mutation() {
        let mut loader = SpyLoader::new(&[("a", strip(4, 8)), ("b", strip(8, 8))]);
        let mut prompt = SpyPrompt::answering(false);
        let pixel = Rgba([1, 11, 7, 255]);
        let mut doc = RasterDocument::new(vec![RgbaImage::from_pixel(2, 2, pixel)]);

        let outcome = execute(
            &request("a", "1", "b", "3"),
            &mut loader,
            &mut prompt,
            &mut doc,
        )
        .unwrap();
        assert!(prompt.asked);
        assert_eq!(outcome, SwapOutcome::Cancelled);
        assert_eq!(*doc.layers()[0].get_pixel(0, 0), pixel);
    }

    #[test]
    fn test_accepted_width_prompt_applies() {
        let mut loader = SpyLoader::new(&[("a", strip(4, 8)), ("b", strip(8, 8))]);
        let mut prompt = SpyPrompt::answering(true);
        let pixel = Rgba([1, 11, 7, 255]); // column 0 of row 1 in 'a'
        let mut doc = RasterDocument::new(vec![RgbaImage::from_pixel(2, 2, pixel)]);

        let outcome = execute(
            &request("a", "1", "b", "3"),
            &mut loader,
            &mut prompt,
            &mut doc,
        )
        .unwrap();
        assert!(prompt.asked);
        let result = match outcome {
            SwapOutcome::Applied(r) => r,
            other => panic!("expected applied, got {:?}", other),
        };
        assert_eq!(result.pairs_applied, 4);
        assert_eq!(result.pixels_changed, 4);
        // Column 0 of row 3 in 'b'
        assert_eq!(*doc.layers()[0].get_pixel(0, 0), Rgba([1, 31, 7, 255]));
    }

    #[test]
    fn test_apply_to_empty_document_is_a_no_op() {
        let mut loader = SpyLoader::new(&[("a", strip(4, 8)), ("b", strip(4, 8))]);
        let mut doc = RasterDocument::new(vec![]);

        let plan = SwapPlan::prepare(&request("a", "1", "b", "3"), &mut loader).unwrap();
        let result = plan.apply(&mut doc).unwrap();

        assert_eq!(result.surfaces_modified, 0);
        assert_eq!(result.pixels_changed, 0);
    }

    #[test]
    fn test_apply_covers_every_surface_and_restores_cursor() {
        let mut loader = SpyLoader::new(&[("a", strip(4, 8)), ("b", strip(4, 8))]);
        let pixel = Rgba([21, 11, 7, 255]); // column 2 of row 1 in 'a'
        let mut doc = RasterDocument::new(vec![
            RgbaImage::from_pixel(1, 1, pixel),
            RgbaImage::from_pixel(1, 1, pixel),
            RgbaImage::from_pixel(1, 1, pixel),
        ]);
        doc.set_current_surface(2).unwrap();

        let plan = SwapPlan::prepare(&request("a", "1", "b", "3"), &mut loader).unwrap();
        let result = plan.apply(&mut doc).unwrap();

        assert_eq!(result.surfaces_modified, 3);
        assert_eq!(result.pixels_changed, 3);
        let expected = Rgba([21, 31, 7, 255]); // column 2 of row 3 in 'b'
        for layer in doc.layers() {
            assert_eq!(*layer.get_pixel(0, 0), expected);
        }
        // Cursor is back where the caller left it
        assert_eq!(doc.current_surface(), 2);
    }
}
