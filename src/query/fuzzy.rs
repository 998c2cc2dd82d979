//! Fuzzy query implementation for approximate string matching.

use std::cmp::min;

use serde::Serialize;

use crate::schema::FieldId;

/// Default maximum edit distance.
pub const DEFAULT_DISTANCE: u8 = 1;

/// Matches documents containing any term within an edit distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzyQuery {
    /// Field to search in.
    pub field: FieldId,
    /// Term to search for.
    pub term: String,
    /// Maximum edit distance.
    pub distance: u8,
    /// Whether an adjacent swap counts as one edit.
    pub transposition: bool,
}

impl FuzzyQuery {
    /// Create a fuzzy query with distance 1 and transpositions enabled.
    pub fn new<T: Into<String>>(field: FieldId, term: T) -> Self {
        FuzzyQuery {
            field,
            term: term.into(),
            distance: DEFAULT_DISTANCE,
            transposition: true,
        }
    }

    /// Set the maximum edit distance.
    pub fn distance(mut self, distance: u8) -> Self {
        self.distance = distance;
        self
    }

    /// Set whether transpositions count as single edits.
    pub fn transposition(mut self, transposition: bool) -> Self {
        self.transposition = transposition;
        self
    }

    /// Edit distance to `candidate`, if within bounds.
    pub fn matches(&self, candidate: &str) -> Option<usize> {
        edit_distance_within(
            &self.term,
            candidate,
            usize::from(self.distance),
            self.transposition,
        )
    }
}

/// Levenshtein distance between two strings, or `None` when it exceeds
/// `threshold`.
///
/// With `transposition` an adjacent swap costs one edit (optimal string
/// alignment distance).
#[allow(clippy::needless_range_loop)]
pub fn edit_distance_within(
    s1: &str,
    s2: &str,
    threshold: usize,
    transposition: bool,
) -> Option<usize> {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1.abs_diff(len2) > threshold {
        return None;
    }
    if len1 == 0 || len2 == 0 {
        let distance = len1.max(len2);
        return (distance <= threshold).then_some(distance);
    }

    // Three rows: the transposition step looks two rows back.
    let mut prev_prev_row = vec![0; len2 + 1];
    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row = vec![0; len2 + 1];

    for i in 1..=len1 {
        curr_row[0] = i;
        let mut min_in_row = i;

        for j in 1..=len2 {
            let cost = usize::from(s1_chars[i - 1] != s2_chars[j - 1]);

            curr_row[j] = min(
                min(
                    prev_row[j] + 1,     // deletion
                    curr_row[j - 1] + 1, // insertion
                ),
                prev_row[j - 1] + cost, // substitution
            );

            if transposition
                && i > 1
                && j > 1
                && s1_chars[i - 1] == s2_chars[j - 2]
                && s1_chars[i - 2] == s2_chars[j - 1]
            {
                curr_row[j] = min(curr_row[j], prev_prev_row[j - 2] + 1);
            }

            min_in_row = min(min_in_row, curr_row[j]);
        }

        if min_in_row > threshold && !transposition {
            return None;
        }

        std::mem::swap(&mut prev_prev_row, &mut prev_row);
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    let distance = prev_row[len2];
    (distance <= threshold).then_some(distance)
}
