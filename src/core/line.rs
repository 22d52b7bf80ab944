use chrono::{NaiveDateTime, Timelike};

/// One line of a daily note.
///
/// Todo lines carry their text without the checkbox prefix. A checked line
/// keeps its completion stamp separately only when it was written in the
/// exact generated format; anything else stays part of `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoLine {
    Unchecked(String),
    Checked {
        text: String,
        completed: Option<NaiveDateTime>,
    },
    Other(String),
}

/// How a line is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Todo,
    Spacer,
    Markdown,
}

impl TodoLine {
    pub fn task(text: impl Into<String>) -> Self {
        Self::Unchecked(text.into())
    }

    pub fn kind(&self) -> LineKind {
        match self {
            Self::Unchecked(_) | Self::Checked { .. } => LineKind::Todo,
            Self::Other(text) if text.trim().is_empty() => LineKind::Spacer,
            Self::Other(_) => LineKind::Markdown,
        }
    }

    pub fn is_todo(&self) -> bool {
        self.kind() == LineKind::Todo
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, Self::Checked { .. })
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Unchecked(text) | Self::Checked { text, .. } | Self::Other(text) => text,
        }
    }

    /// The line after a checkbox toggle, or `None` for non-todo lines.
    ///
    /// Checking stamps `now` at minute precision; unchecking drops the stamp.
    pub fn toggled(&self, now: NaiveDateTime) -> Option<Self> {
        match self {
            Self::Unchecked(text) => Some(Self::Checked {
                text: text.clone(),
                completed: Some(truncate_to_minute(now)),
            }),
            Self::Checked { text, .. } => Some(Self::Unchecked(text.clone())),
            Self::Other(_) => None,
        }
    }
}

fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn check_stamps_minute_precision() {
        let line = TodoLine::task("buy milk");
        let checked = line.toggled(at(9, 0, 42)).unwrap();
        assert_eq!(
            checked,
            TodoLine::Checked {
                text: "buy milk".into(),
                completed: Some(at(9, 0, 0)),
            }
        );
    }

    #[test]
    fn uncheck_drops_stamp() {
        let line = TodoLine::Checked {
            text: "buy milk".into(),
            completed: Some(at(9, 0, 0)),
        };
        assert_eq!(line.toggled(at(10, 0, 0)), Some(TodoLine::task("buy milk")));
    }

    #[test]
    fn other_lines_never_toggle() {
        assert_eq!(TodoLine::Other("# 2024-01-01".into()).toggled(at(9, 0, 0)), None);
        assert_eq!(TodoLine::Other(String::new()).toggled(at(9, 0, 0)), None);
    }

    #[test]
    fn kinds() {
        assert_eq!(TodoLine::task("a").kind(), LineKind::Todo);
        assert_eq!(TodoLine::Other("   ".into()).kind(), LineKind::Spacer);
        assert_eq!(TodoLine::Other("## notes".into()).kind(), LineKind::Markdown);
    }
}
