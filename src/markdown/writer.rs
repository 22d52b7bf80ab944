use chrono::NaiveDate;

use crate::core::line::TodoLine;

use super::parser::{CHECKED_PREFIX, COMPLETED_FORMAT, UNCHECKED_PREFIX};

pub const DEFAULT_HEADER_TEMPLATE: &str = "# {date}";

/// Writes note lines back to markdown.
pub struct MarkdownWriter;

impl MarkdownWriter {
    /// Join lines with `\n`, the inverse of `MarkdownParser::parse`.
    pub fn write_document(lines: &[TodoLine]) -> String {
        lines
            .iter()
            .map(Self::write_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn write_line(line: &TodoLine) -> String {
        match line {
            TodoLine::Unchecked(_) => format!("{UNCHECKED_PREFIX}{}", Self::write_body(line)),
            TodoLine::Checked { .. } => format!("{CHECKED_PREFIX}{}", Self::write_body(line)),
            TodoLine::Other(text) => text.clone(),
        }
    }

    /// The visible text of a line: everything after the checkbox, including
    /// the completion annotation.
    pub fn write_body(line: &TodoLine) -> String {
        match line {
            TodoLine::Checked {
                text,
                completed: Some(stamp),
            } => format!("{} (Completed: {})", text, stamp.format(COMPLETED_FORMAT)),
            TodoLine::Unchecked(text) | TodoLine::Checked { text, .. } | TodoLine::Other(text) => {
                text.clone()
            }
        }
    }

    /// Initial content of a fresh daily note: a header line and a blank line.
    /// `{date}` in the template is replaced with `YYYY-MM-DD`.
    pub fn daily_header(template: &str, date: NaiveDate) -> String {
        let header = template.replace("{date}", &date.format("%Y-%m-%d").to_string());
        format!("{}\n\n", header)
    }
}
