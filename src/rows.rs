//! Row selection parsing and range checking
//!
//! Row selections are free-text fields: a whitespace-separated list of
//! non-negative integer row indices into a reference palette. Parsing is
//! all-or-nothing: one bad token invalidates the whole field, and an empty
//! field is invalid rather than "no rows".

use thiserror::Error;

/// Error type for row-field parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowsError {
    /// The field was empty or whitespace-only
    #[error("row list is empty")]
    Empty,
    /// A token was not a non-negative integer
    #[error("invalid row token '{0}', expected a non-negative integer")]
    BadToken(String),
}

/// Parse a row-selection field into an ordered list of row indices.
///
/// The field is a whitespace-separated list of non-negative integers, e.g.
/// `"0 2 5"`. Order is preserved; duplicates are allowed (a row may be
/// remapped more than once).
pub fn parse_rows(text: &str) -> Result<Vec<u32>, RowsError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(RowsError::Empty);
    }

    let mut rows = Vec::with_capacity(tokens.len());
    for token in tokens {
        // Digits only: u32::parse alone would also accept a '+' sign
        if !token.chars().all(|c| c.is_ascii_digit()) {
            return Err(RowsError::BadToken(token.to_string()));
        }
        let row = token
            .parse::<u32>()
            .map_err(|_| RowsError::BadToken(token.to_string()))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Collect every row index that falls outside `[0, height)`, in input order.
///
/// Height is only known after the palette is loaded, so this runs as a
/// separate pass from parsing.
pub fn out_of_range(rows: &[u32], height: u32) -> Vec<u32> {
    rows.iter().copied().filter(|&r| r >= height).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_basic() {
        assert_eq!(parse_rows("0 2 5").unwrap(), vec![0, 2, 5]);
        assert_eq!(parse_rows("  7 ").unwrap(), vec![7]);
        // Duplicates and arbitrary whitespace are fine
        assert_eq!(parse_rows("1\t1  3").unwrap(), vec![1, 1, 3]);
    }

    #[test]
    fn test_parse_rows_empty_is_invalid() {
        assert_eq!(parse_rows(""), Err(RowsError::Empty));
        assert_eq!(parse_rows("   "), Err(RowsError::Empty));
    }

    #[test]
    fn test_parse_rows_one_bad_token_fails_whole_field() {
        assert_eq!(
            parse_rows("1 2 x"),
            Err(RowsError::BadToken("x".to_string()))
        );
        assert_eq!(
            parse_rows("-1 2"),
            Err(RowsError::BadToken("-1".to_string()))
        );
        // Signed forms are not part of the grammar even when u32 parses them
        assert_eq!(
            parse_rows("+3"),
            Err(RowsError::BadToken("+3".to_string()))
        );
    }

    #[test]
    fn test_out_of_range_off_by_one() {
        // Row index equal to height is out of range
        assert_eq!(out_of_range(&[0, 7, 8, 9], 8), vec![8, 9]);
        assert_eq!(out_of_range(&[0, 1, 2], 8), Vec::<u32>::new());
    }
}
