//! Occurrence store: the ordered candidate list and its review cursor.
//!
//! Insertion order is document order. The cursor lives in the finder
//! metadata (`current_name`) so that saving the collection also saves the
//! operator's position.

use thiserror::Error;

use crate::domain::{Annotation, FinderOutput, Occurrence};

/// Errors raised when a collection cannot back a curation session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("No occurrences to curate")]
    Empty,

    #[error("Cursor {index} is outside a collection of {total} occurrences")]
    CursorOutOfRange { index: usize, total: usize },

    #[error("Occurrence {index} ('{name}') spans {start}..{end}, outside a text of {text_len} characters")]
    SpanOutOfBounds {
        index: usize,
        name: String,
        start: usize,
        end: usize,
        text_len: usize,
    },
}

/// Ordered occurrences plus the cursor and the review edge
#[derive(Debug, Clone)]
pub struct OccurrenceCollection {
    output: FinderOutput,

    /// Furthest cursor position reached in this session
    last_reviewed: usize,
}

impl OccurrenceCollection {
    /// Wrap finder output, resuming at its stored cursor
    ///
    /// The review edge starts at the restored cursor: everything before it
    /// was reviewed in an earlier session.
    pub fn new(mut output: FinderOutput) -> Result<Self, StoreError> {
        let total = output.names.len();
        if total == 0 {
            return Err(StoreError::Empty);
        }
        let index = output.meta.current_name;
        if index >= total {
            return Err(StoreError::CursorOutOfRange { index, total });
        }
        output.meta.total_names = total;

        Ok(Self {
            output,
            last_reviewed: index,
        })
    }

    /// Check every span against the length of the text in characters
    pub fn validate_spans(&self, text_len: usize) -> Result<(), StoreError> {
        for (index, occ) in self.output.names.iter().enumerate() {
            if !occ.span_fits(text_len) {
                return Err(StoreError::SpanOutOfBounds {
                    index,
                    name: occ.name.clone(),
                    start: occ.offset_start,
                    end: occ.offset_end,
                    text_len,
                });
            }
        }
        Ok(())
    }

    /// Number of occurrences (never zero)
    pub fn len(&self) -> usize {
        self.output.names.len()
    }

    /// Always false; an empty collection cannot be constructed
    pub fn is_empty(&self) -> bool {
        self.output.names.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.output.meta.current_name
    }

    /// The review edge (`lastReviewedIndex`)
    pub fn last_reviewed_index(&self) -> usize {
        self.last_reviewed
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.output.names
    }

    pub fn get(&self, index: usize) -> Option<&Occurrence> {
        self.output.names.get(index)
    }

    /// The occurrence under the cursor
    pub fn current(&self) -> &Occurrence {
        &self.output.names[self.output.meta.current_name]
    }

    /// Move the cursor one step forward; false at the last occurrence
    pub fn advance(&mut self) -> bool {
        let index = self.output.meta.current_name;
        if index + 1 >= self.len() {
            return false;
        }
        self.output.meta.current_name = index + 1;
        self.last_reviewed = self.last_reviewed.max(index + 1);
        true
    }

    /// Move the cursor one step back; false at the first occurrence
    pub fn retreat(&mut self) -> bool {
        let index = self.output.meta.current_name;
        if index == 0 {
            return false;
        }
        self.output.meta.current_name = index - 1;
        true
    }

    /// Place the cursor at `index` without touching the review edge
    pub fn seek(&mut self, index: usize) -> Result<(), StoreError> {
        if index >= self.len() {
            return Err(StoreError::CursorOutOfRange {
                index,
                total: self.len(),
            });
        }
        self.output.meta.current_name = index;
        Ok(())
    }

    /// Indices of occurrences after `index` whose name equals `name`
    pub fn duplicate_indices_after(&self, index: usize, name: &str) -> Vec<usize> {
        self.output
            .names
            .iter()
            .enumerate()
            .skip(index + 1)
            .filter(|(_, occ)| occ.name == name)
            .map(|(i, _)| i)
            .collect()
    }

    /// Occurrences after `index` whose name equals `name`
    pub fn find_duplicates_after(&self, index: usize, name: &str) -> Vec<&Occurrence> {
        self.duplicate_indices_after(index, name)
            .into_iter()
            .map(|i| &self.output.names[i])
            .collect()
    }

    pub(crate) fn set_annotation_at(&mut self, index: usize, annotation: Annotation) {
        self.output.names[index].annotation = annotation;
    }

    /// The finder document with the current cursor, ready to persist
    pub fn as_output(&self) -> &FinderOutput {
        &self.output
    }
}
