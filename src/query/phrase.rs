//! Phrase query.

use serde::Serialize;

use crate::schema::FieldId;

/// Matches documents where the terms appear at the given relative positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhraseQuery {
    /// Field to search in.
    pub field: FieldId,
    /// `(offset, term)` pairs; offsets are relative to the first term.
    pub terms: Vec<(u32, String)>,
}

impl PhraseQuery {
    /// Create a phrase of consecutive terms.
    pub fn new<I, S>(field: FieldId, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PhraseQuery {
            field,
            terms: terms
                .into_iter()
                .enumerate()
                .map(|(offset, term)| (offset as u32, term.into()))
                .collect(),
        }
    }

    /// Create a phrase with explicit offsets, e.g. gaps left by stop words.
    pub fn with_offsets(field: FieldId, terms: Vec<(u32, String)>) -> Self {
        PhraseQuery { field, terms }
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if the phrase has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Count the positions where the whole phrase occurs.
    ///
    /// `positions[i]` holds the ascending positions of `terms[i]` in one document.
    pub fn phrase_freq(&self, positions: &[&[u32]]) -> u32 {
        let Some((first, rest)) = positions.split_first() else {
            return 0;
        };
        let first_offset = self.terms.first().map(|(offset, _)| *offset).unwrap_or(0);

        first
            .iter()
            .filter(|&&start| {
                rest.iter().zip(self.terms.iter().skip(1)).all(|(list, (offset, _))| {
                    let wanted = start + offset - first_offset;
                    list.binary_search(&wanted).is_ok()
                })
            })
            .count() as u32
    }
}
