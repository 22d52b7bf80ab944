use chrono::NaiveDateTime;

use super::line::{LineKind, TodoLine};
use crate::markdown::{MarkdownParser, MarkdownWriter};

/// Result of toggling a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// An open item was checked off. Hosts may celebrate.
    Completed,
    Reopened,
    Unchanged,
}

impl ToggleOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    pub fn should_celebrate(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A line prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub index: usize,
    pub kind: LineKind,
    pub text: String,
    pub checked: bool,
}

/// In-memory view of one daily note. The file remains the source of truth;
/// every change is written back as a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDocument {
    lines: Vec<TodoLine>,
}

impl Default for NoteDocument {
    fn default() -> Self {
        Self::parse("")
    }
}

impl NoteDocument {
    pub fn parse(content: &str) -> Self {
        Self {
            lines: MarkdownParser::parse(content),
        }
    }

    pub fn lines(&self) -> &[TodoLine] {
        &self.lines
    }

    pub fn to_text(&self) -> String {
        MarkdownWriter::write_document(&self.lines)
    }

    pub fn toggle(&mut self, index: usize, now: NaiveDateTime) -> ToggleOutcome {
        let Some(line) = self.lines.get_mut(index) else {
            return ToggleOutcome::Unchanged;
        };
        match line.toggled(now) {
            Some(next) => {
                let outcome = if next.is_checked() {
                    ToggleOutcome::Completed
                } else {
                    ToggleOutcome::Reopened
                };
                *line = next;
                outcome
            }
            None => ToggleOutcome::Unchanged,
        }
    }

    /// Append an open todo item. Blank input is ignored.
    pub fn add_task(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        // A task is always a single line.
        let text = text.replace(['\r', '\n'], " ");
        self.lines.push(TodoLine::task(text));
        true
    }

    pub fn render(&self) -> Vec<RenderedLine> {
        self.lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let kind = line.kind();
                RenderedLine {
                    index,
                    kind,
                    text: match kind {
                        LineKind::Todo => MarkdownWriter::write_body(line),
                        LineKind::Spacer => String::new(),
                        LineKind::Markdown => line.text().to_string(),
                    },
                    checked: line.is_checked(),
                }
            })
            .collect()
    }

    /// (done, total) over todo items.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.lines.iter().filter(|l| l.is_todo()).count();
        let done = self.lines.iter().filter(|l| l.is_checked()).count();
        (done, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn nine_am() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn toggle_stamps_completion() {
        let mut doc = NoteDocument::parse("- [ ] buy milk");
        assert_eq!(doc.toggle(0, nine_am()), ToggleOutcome::Completed);
        assert_eq!(doc.to_text(), "- [x] buy milk (Completed: 2024-01-01 09:00)");
    }

    #[test]
    fn toggle_twice_restores_text() {
        let original = "# 2024-01-01\n\n- [ ] call the bank\n- [ ] water plants\n";
        let mut doc = NoteDocument::parse(original);
        assert_eq!(doc.toggle(3, nine_am()), ToggleOutcome::Completed);
        assert_ne!(doc.to_text(), original);
        assert_eq!(doc.toggle(3, nine_am()), ToggleOutcome::Reopened);
        assert_eq!(doc.to_text(), original);
    }

    #[test]
    fn reopening_hand_edited_item_keeps_annotation() {
        let mut doc = NoteDocument::parse("- [x] ship it (Completed: last week)");
        assert_eq!(doc.toggle(0, nine_am()), ToggleOutcome::Reopened);
        assert_eq!(doc.to_text(), "- [ ] ship it (Completed: last week)");
    }

    #[test]
    fn toggle_ignores_other_lines_and_bad_index() {
        let original = "# heading\n\nplain text";
        let mut doc = NoteDocument::parse(original);
        for index in [0, 1, 2, 3, 99] {
            assert_eq!(doc.toggle(index, nine_am()), ToggleOutcome::Unchanged);
        }
        assert_eq!(doc.to_text(), original);
    }

    #[test]
    fn add_task_appends_line() {
        let mut doc = NoteDocument::parse("# 2024-06-15\n\n");
        assert!(doc.add_task("write report"));
        assert_eq!(doc.to_text(), "# 2024-06-15\n\n\n- [ ] write report");
    }

    #[test]
    fn add_blank_task_is_noop() {
        let mut doc = NoteDocument::parse("# 2024-06-15\n\n");
        let before = doc.clone();
        assert!(!doc.add_task("   "));
        assert!(!doc.add_task(""));
        assert!(!doc.add_task("\t\n"));
        assert_eq!(doc, before);
    }

    #[test]
    fn add_task_flattens_newlines() {
        let mut doc = NoteDocument::parse("");
        assert!(doc.add_task("one\ntwo"));
        assert_eq!(doc.lines().last(), Some(&TodoLine::task("one two")));
    }

    #[test]
    fn render_classifies_lines() {
        let doc = NoteDocument::parse(
            "# 2024-01-01\n\n- [ ] open\n- [x] done (Completed: 2024-01-01 09:00)",
        );
        let rendered = doc.render();
        let kinds: Vec<LineKind> = rendered.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![LineKind::Markdown, LineKind::Spacer, LineKind::Todo, LineKind::Todo]
        );
        assert_eq!(rendered[2].text, "open");
        assert!(!rendered[2].checked);
        assert_eq!(rendered[3].text, "done (Completed: 2024-01-01 09:00)");
        assert!(rendered[3].checked);
        assert_eq!(doc.progress(), (1, 2));
    }
}
