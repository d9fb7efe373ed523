//! Terminal rendering of engine outputs.
//!
//! Produces plain lines with optional ANSI colour codes. The list pane and
//! the text pane are laid out side by side so that their rows line up the
//! way the viewport computed them.

use unicode_width::UnicodeWidthChar;

use crate::domain::{Annotation, Occurrence};
use crate::engine::{CurationSession, ListWindow, Stats, TextWindow, ENTRY_LINES};

/// Width of the list pane in columns
pub const LIST_PANE_WIDTH: usize = 35;

const RESET: &str = "\x1b[0m";
const SEPARATOR: &str = "│";

/// Layout and colour settings for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub pane_height: usize,
    pub width: usize,
    pub color: bool,
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("\x1b[{}m{}{}", code, text, RESET)
    } else {
        text.to_string()
    }
}

/// The four lines describing one occurrence in the list pane
pub fn entry_lines(occ: &Occurrence, index: usize, total: usize, current: bool, color: bool) -> [String; ENTRY_LINES] {
    let position = format!("    {}/{}", index + 1, total);
    let detail = if occ.is_scored() {
        format!("Log Odds: {:.2}", occ.score.log10())
    } else {
        format!("Type: {}", occ.kind)
    };
    let name = if current {
        let marked = if color { occ.name.clone() } else { format!("> {}", occ.name) };
        format!("Name: {}", paint(&marked, "43;30;1", color))
    } else {
        format!("Name: {}", occ.name)
    };
    let annot = paint(
        &format!("Annot: {}", occ.annotation.label()),
        &format!("{};40;2", occ.annotation.color()),
        color,
    );
    [position, detail, name, annot]
}

/// Lines of the list pane for a computed window
pub fn list_pane(session: &CurationSession, window: &ListWindow, color: bool) -> Vec<String> {
    let coll = session.collection();
    let current = coll.current_index();
    let mut lines = vec![String::new(); window.leading_blank_lines];
    for index in window.start..window.end {
        if let Some(occ) = coll.get(index) {
            lines.extend(entry_lines(occ, index, coll.len(), index == current, color));
        }
    }
    lines
}

/// Lines of the text pane, with the span highlighted
pub fn text_pane(window: &TextWindow, color: bool) -> Vec<String> {
    let code = if window.is_rejected() {
        format!("40;{};1", Annotation::NotName.color())
    } else {
        format!("40;{};1", window.annotation.color())
    };
    let span = if color {
        paint(&window.span, &code, true)
    } else {
        format!("[{}]", window.span)
    };
    let body = format!("{}{}{}", window.before, span, window.after);

    let mut lines = vec![String::new(); window.leading_blank_lines];
    lines.extend(body.split('\n').map(str::to_string));
    lines.extend(std::iter::repeat(String::new()).take(window.trailing_blank_lines));
    lines
}

/// The stats line: precision, recall, and the four buckets
pub fn stats_line(stats: &Stats, color: bool) -> String {
    let ratio = |value: Option<f64>| match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    };
    let pct = stats.percentages();
    let bucket = |label: &str, value: Option<u32>, annotation: Annotation| {
        let text = match value {
            Some(v) => format!("{} {:>3}%", label, v),
            None => format!("{} n/a", label),
        };
        paint(&text, &format!("{};1", annotation.color()), color)
    };

    format!(
        "Precision: {}, Recall: {} | {} {} {} {}",
        ratio(stats.precision()),
        ratio(stats.recall()),
        bucket("Acc.", pct.map(|p| p.accepted), Annotation::Accepted),
        bucket("Rej.", pct.map(|p| p.rejected), Annotation::NotName),
        bucket("Mod.", pct.map(|p| p.modified), Annotation::Species),
        bucket("Add.", pct.map(|p| p.added), Annotation::Doubtful),
    )
}

/// Terminal columns taken by one char; control chars take none
fn column_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Column count of a string, ignoring ANSI escape sequences
pub fn visible_len(s: &str) -> usize {
    let mut len = 0;
    let mut in_escape = false;
    for c in s.chars() {
        match (in_escape, c) {
            (false, '\x1b') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => len += column_width(c),
        }
    }
    len
}

/// Cut a string to `width` visible columns, keeping escape sequences.
///
/// A wide glyph that would straddle the limit is dropped whole.
pub fn truncate_visible(s: &str, width: usize) -> String {
    let mut out = String::with_capacity(s.len());
    let mut len = 0;
    let mut in_escape = false;
    let mut cut = false;
    for c in s.chars() {
        if in_escape {
            out.push(c);
            in_escape = c != 'm';
            continue;
        }
        if c == '\x1b' {
            out.push(c);
            in_escape = true;
            continue;
        }
        let w = column_width(c);
        if cut || len + w > width {
            cut = true;
            continue;
        }
        out.push(c);
        len += w;
    }
    if cut && out.contains('\x1b') {
        out.push_str(RESET);
    }
    out
}

fn pad_visible(s: &str, width: usize) -> String {
    let cut = truncate_visible(s, width);
    let pad = width.saturating_sub(visible_len(&cut));
    format!("{}{}", cut, " ".repeat(pad))
}

/// A complete frame: stats line, rule, and both panes side by side
pub fn frame(session: &CurationSession, options: &RenderOptions) -> String {
    let view = session.viewport(options.pane_height);
    let list = list_pane(session, &view.list, options.color);
    let text = text_pane(&view.text, options.color);
    let text_width = options.width.saturating_sub(LIST_PANE_WIDTH + 1);

    let mode = if session.is_express() { " [express]" } else { "" };
    let mut out = format!("{}{}\n", stats_line(&session.stats(), options.color), mode);
    out.push_str(&"─".repeat(options.width));
    out.push('\n');

    for row in 0..options.pane_height {
        let left = list.get(row).map(String::as_str).unwrap_or("");
        let right = text.get(row).map(String::as_str).unwrap_or("");
        out.push_str(&pad_visible(left, LIST_PANE_WIDTH));
        out.push_str(SEPARATOR);
        out.push_str(truncate_visible(right, text_width).trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FinderOutput;
    use crate::engine::{CurationPolicy, Document, OccurrenceCollection};

    fn session() -> CurationSession {
        let text = "Shells of Venus and\nof Octopus too\n";
        let occs = vec![
            Occurrence::new("Venus", "Uninomial", 16.35, 10, 15),
            Occurrence::new("Octopus", "Uninomial", 0.0, 23, 30),
        ];
        let coll = OccurrenceCollection::new(FinderOutput::from_occurrences(occs)).unwrap();
        CurationSession::new(coll, Document::from_text(text), CurationPolicy::default())
    }

    #[test]
    fn test_entry_lines_plain() {
        let occ = Occurrence::new("Octopus", "Uninomial", 0.0, 0, 7);
        let lines = entry_lines(&occ, 4, 12, true, false);
        assert_eq!(lines[0], "    5/12");
        assert_eq!(lines[1], "Type: Uninomial");
        assert_eq!(lines[2], "Name: > Octopus");
        assert_eq!(lines[3], "Annot: NotAssigned");
    }

    #[test]
    fn test_entry_lines_scored() {
        let occ = Occurrence::new("Venus", "Uninomial", 100.0, 0, 5);
        let lines = entry_lines(&occ, 0, 1, false, false);
        assert_eq!(lines[1], "Log Odds: 2.00");
    }

    #[test]
    fn test_annotation_colour_code() {
        let occ = Occurrence::new("Venus", "Uninomial", 0.0, 0, 5).with_annotation(Annotation::Doubtful);
        let lines = entry_lines(&occ, 0, 1, false, true);
        assert_eq!(lines[3], "\x1b[34;40;2mAnnot: Doubtful\x1b[0m");
    }

    #[test]
    fn test_stats_line_without_data() {
        let line = stats_line(&Stats::default(), false);
        assert_eq!(
            line,
            "Precision: n/a, Recall: n/a | Acc. n/a Rej. n/a Mod. n/a Add. n/a"
        );
    }

    #[test]
    fn test_stats_line_with_data() {
        let stats = Stats {
            accepted: 2,
            rejected: 1,
            modified: 0,
            added: 0,
            total: 3,
        };
        let line = stats_line(&stats, false);
        assert_eq!(
            line,
            "Precision: 0.67, Recall: 1.00 | Acc.  67% Rej.  33% Mod.   0% Add.   0%"
        );
    }

    #[test]
    fn test_visible_helpers() {
        let s = "\x1b[32mabc\x1b[0mdef";
        assert_eq!(visible_len(s), 6);
        assert_eq!(visible_len(&truncate_visible(s, 2)), 2);
        assert!(truncate_visible(s, 2).ends_with(RESET));
    }

    #[test]
    fn test_wide_glyphs_take_two_columns() {
        let s = "\x1b[1m漢字\x1b[0mab";
        assert_eq!(visible_len(s), 6);
        assert_eq!(visible_len(&truncate_visible(s, 3)), 2);
        assert_eq!(visible_len(&pad_visible("Name: 蛸", 10)), 10);
        assert_eq!(pad_visible("Name: 蛸", 10), "Name: 蛸  ");
    }

    #[test]
    fn test_frame_separator_aligns_with_wide_names() {
        let text = "タコ Octopus\n";
        let occs = vec![Occurrence::new("タコ", "Uninomial", 0.0, 0, 2)];
        let coll = OccurrenceCollection::new(FinderOutput::from_occurrences(occs)).unwrap();
        let s = CurationSession::new(coll, Document::from_text(text), CurationPolicy::default());
        let options = RenderOptions {
            pane_height: 20,
            width: 80,
            color: false,
        };

        for row in frame(&s, &options).lines().skip(2) {
            let left = row.split(SEPARATOR).next().unwrap();
            assert_eq!(visible_len(left), LIST_PANE_WIDTH, "{:?}", row);
        }
    }

    #[test]
    fn test_panes_align_on_name_row() {
        let s = session();
        let view = s.viewport(20);
        let list = list_pane(&s, &view.list, false);
        let text = text_pane(&view.text, false);

        let row = view.list_name_row(s.collection().current_index());
        assert!(list[row].contains("Venus"));
        assert!(text[row].contains("[Venus]"));
    }

    #[test]
    fn test_frame_has_pane_rows() {
        let s = session();
        let options = RenderOptions {
            pane_height: 20,
            width: 80,
            color: false,
        };
        let out = frame(&s, &options);
        assert_eq!(out.lines().count(), 22);
        assert!(out.starts_with("Precision:"));
    }
}
