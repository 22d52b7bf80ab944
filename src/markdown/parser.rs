use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

use crate::core::line::TodoLine;

pub const UNCHECKED_PREFIX: &str = "- [ ] ";
pub const CHECKED_PREFIX: &str = "- [x] ";
pub const COMPLETED_FORMAT: &str = "%Y-%m-%d %H:%M";

// Only the exact annotation the editor writes counts as a completion stamp.
static COMPLETED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<text>.*) \(Completed: (?P<stamp>\d{4}-\d{2}-\d{2} \d{2}:\d{2})\)$").unwrap()
});

pub struct MarkdownParser;

impl MarkdownParser {
    /// Split a note into lines on `\n` so that joining them back restores
    /// the input byte for byte.
    pub fn parse(input: &str) -> Vec<TodoLine> {
        input.split('\n').map(Self::parse_line).collect()
    }

    pub fn parse_line(line: &str) -> TodoLine {
        if let Some(text) = line.strip_prefix(UNCHECKED_PREFIX) {
            return TodoLine::Unchecked(text.to_string());
        }

        if let Some(rest) = line.strip_prefix(CHECKED_PREFIX) {
            let stamped = COMPLETED_RE.captures(rest).and_then(|caps| {
                NaiveDateTime::parse_from_str(&caps["stamp"], COMPLETED_FORMAT)
                    .ok()
                    .map(|stamp| (caps["text"].to_string(), stamp))
            });
            return match stamped {
                Some((text, stamp)) => TodoLine::Checked {
                    text,
                    completed: Some(stamp),
                },
                None => TodoLine::Checked {
                    text: rest.to_string(),
                    completed: None,
                },
            };
        }

        TodoLine::Other(line.to_string())
    }
}
