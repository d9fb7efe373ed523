//! Viewport synchronizer for the list pane and the text pane.
//!
//! Both panes are driven from one `center_offset`: the list pane puts the
//! current entry's name line on row `center_offset + 1`, and the text pane
//! pads and trims the text so the highlighted span lands on the same row.

use crate::domain::{Annotation, Occurrence};

use super::store::OccurrenceCollection;

/// Lines rendered per occurrence in the list pane
pub const ENTRY_LINES: usize = 4;

/// Blank line above the first rendered entry
pub const TOP_MARGIN: usize = 1;

/// Line of an entry block that carries the name
pub const NAME_LINE: usize = 2;

/// The processed text, indexed by character
#[derive(Debug, Clone, Default)]
pub struct Document {
    chars: Vec<char>,
}

impl Document {
    pub fn from_text(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Characters in `[start, end)`, clamped to the document
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        self.chars[start..end].iter().collect()
    }

    fn char_at(&self, index: usize) -> char {
        self.chars[index]
    }
}

/// Slice of the occurrence list to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListWindow {
    /// Entries that fit above (and below) the centered one
    pub half_window: usize,

    /// Row budget shared with the text pane
    pub center_offset: usize,

    /// First index to draw
    pub start: usize,

    /// One past the last index to draw
    pub end: usize,

    /// Blank lines before the first entry
    pub leading_blank_lines: usize,
}

impl ListWindow {
    pub fn compute(pane_height: usize, current: usize, total: usize) -> Self {
        let half_window = pane_height.saturating_sub(2) / ENTRY_LINES / 2;
        let center_offset = (half_window + 1) * ENTRY_LINES - 2;
        let start = current.saturating_sub(half_window);
        let end = (current + half_window + 1).min(total);
        let leading_blank_lines = TOP_MARGIN + ENTRY_LINES * half_window.saturating_sub(current);

        Self {
            half_window,
            center_offset,
            start,
            end,
            leading_blank_lines,
        }
    }

    /// Row of the first line of the entry at `index`
    pub fn entry_row(&self, index: usize) -> usize {
        self.leading_blank_lines + ENTRY_LINES * index.saturating_sub(self.start)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Character window of the text around the current occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWindow {
    pub leading_blank_lines: usize,

    /// Text from the window start up to the span
    pub before: String,

    /// The occurrence's own span, to be highlighted
    pub span: String,

    /// Text after the span up to the window end
    pub after: String,

    pub trailing_blank_lines: usize,

    /// Annotation of the occurrence at render time
    pub annotation: Annotation,
}

impl TextWindow {
    pub fn compute(doc: &Document, occ: &Occurrence, center_offset: usize, pane_height: usize) -> Self {
        let start = occ.offset_start.min(doc.len());
        let end = occ.offset_end.min(doc.len()).max(start);

        let mut begin = start;
        let mut newlines_before = 0;
        while begin > 0 && newlines_before <= center_offset {
            begin -= 1;
            if doc.char_at(begin) == '\n' {
                newlines_before += 1;
            }
        }

        let limit = (pane_height / 2).saturating_sub(1);
        let mut finish = end;
        let mut newlines_after = 0;
        while finish < doc.len() && newlines_after < limit {
            if doc.char_at(finish) == '\n' {
                newlines_after += 1;
            }
            finish += 1;
        }

        Self {
            leading_blank_lines: (center_offset + 1).saturating_sub(newlines_before),
            before: doc.slice(begin, start),
            span: doc.slice(start, end),
            after: doc.slice(end, finish),
            trailing_blank_lines: center_offset.saturating_sub(newlines_after),
            annotation: occ.annotation,
        }
    }

    /// Whether the highlight should signal rejection
    pub fn is_rejected(&self) -> bool {
        self.annotation == Annotation::NotName
    }

    /// Row on which the highlighted span starts
    pub fn span_row(&self) -> usize {
        self.leading_blank_lines + self.before.matches('\n').count()
    }
}

/// Both pane windows for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    pub pane_height: usize,
    pub list: ListWindow,
    pub text: TextWindow,
}

impl Viewport {
    pub fn compute(coll: &OccurrenceCollection, doc: &Document, pane_height: usize) -> Self {
        let list = ListWindow::compute(pane_height, coll.current_index(), coll.len());
        let text = TextWindow::compute(doc, coll.current(), list.center_offset, pane_height);
        Self {
            pane_height,
            list,
            text,
        }
    }

    /// Row of the current entry's name line in the list pane
    pub fn list_name_row(&self, current: usize) -> usize {
        self.list.entry_row(current) + NAME_LINE
    }
}
