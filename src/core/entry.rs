use chrono::NaiveDate;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static DAILY_FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<date>\d{4}-\d{2}-\d{2})\.md$").unwrap());

pub const DAILY_EXTENSION: &str = ".md";

/// A daily note file named `YYYY-MM-DD.md`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileEntry {
    name: String,
    date: NaiveDate,
}

impl FileEntry {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            name: format!("{}{}", date.format("%Y-%m-%d"), DAILY_EXTENSION),
            date,
        }
    }

    /// Parse a filename. Returns `None` unless it is exactly `YYYY-MM-DD.md`
    /// with a real calendar date.
    pub fn parse(name: &str) -> Option<Self> {
        let captures = DAILY_FILENAME_RE.captures(name)?;
        let date = NaiveDate::parse_from_str(&captures["date"], "%Y-%m-%d").ok()?;
        Some(Self {
            name: name.to_string(),
            date,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Filename without the extension, as shown in the history list.
    pub fn label(&self) -> &str {
        self.name
            .strip_suffix(DAILY_EXTENSION)
            .unwrap_or(&self.name)
    }
}

impl fmt::Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Daily notes known to exist in a folder, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    entries: Vec<FileEntry>,
}

impl DirectoryListing {
    pub fn from_entries(entries: impl IntoIterator<Item = FileEntry>) -> Self {
        let mut entries: Vec<FileEntry> = entries.into_iter().collect();
        // Filenames sort chronologically, so descending name = newest first.
        entries.sort_by(|a, b| b.name.cmp(&a.name));
        entries.dedup();
        Self { entries }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn latest(&self) -> Option<&FileEntry> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
