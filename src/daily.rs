//! Daily note controller: picks today's note, keeps it loaded, and writes
//! every edit straight back to the folder.

use chrono::NaiveDate;

use crate::core::clock::Clock;
use crate::core::document::{NoteDocument, ToggleOutcome};
use crate::core::entry::{DirectoryListing, FileEntry};
use crate::markdown::MarkdownWriter;
use crate::store::capability::{FolderHandle, FolderPicker, PermissionState};
use crate::store::context::FolderContext;
use crate::store::permission::PermissionStore;

/// Make sure the note for `today` exists, creating it from `header_template`
/// if it does not. Calling it again on the same day changes nothing.
pub async fn ensure_today<H: FolderHandle>(
    ctx: &mut FolderContext<H>,
    today: NaiveDate,
    header_template: &str,
) -> Option<FileEntry> {
    let entry = FileEntry::for_date(today);
    if ctx.listing().contains(entry.name()) {
        return Some(entry);
    }

    // The listing may be stale; never clobber a note that is already there.
    match ctx.load(entry.name()).await {
        Ok(Some(_)) => {
            log::debug!("{} exists but was not listed", entry);
            ctx.refresh().await;
            return Some(entry);
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("Cannot tell whether {} exists: {}", entry, e);
            return None;
        }
    }

    let content = MarkdownWriter::daily_header(header_template, today);
    if ctx.write(entry.name(), &content).await {
        log::info!("Created daily note {}", entry);
        Some(entry)
    } else {
        None
    }
}

/// The note being viewed and edited.
#[derive(Debug, Clone)]
pub struct ActiveNote {
    pub entry: FileEntry,
    pub document: NoteDocument,
    /// False when the file could not be loaded; saving would replace content
    /// that was never shown.
    pub writable: bool,
}

/// Session state for one host: the granted folder, if any, and the active note.
pub struct DailyNotes<H: FolderHandle, C: Clock> {
    permissions: PermissionStore,
    clock: C,
    header_template: String,
    context: Option<FolderContext<H>>,
    active: Option<ActiveNote>,
}

impl<H: FolderHandle, C: Clock> DailyNotes<H, C> {
    pub fn new(permissions: PermissionStore, clock: C, header_template: impl Into<String>) -> Self {
        Self {
            permissions,
            clock,
            header_template: header_template.into(),
            context: None,
            active: None,
        }
    }

    /// Restore the remembered folder and open today's note.
    ///
    /// Returns `false` when no folder is selected, or when the folder is
    /// selected but today's note could not be created; check
    /// [`has_folder`](Self::has_folder) to tell the two apart.
    pub async fn startup(&mut self) -> bool {
        match self.permissions.restore::<H>().await {
            Some(handle) => self.attach(handle).await,
            None => {
                self.detach();
                false
            }
        }
    }

    /// Ask the host for a folder, remember it, and open today's note.
    ///
    /// A folder that cannot be remembered is not used. The return value
    /// follows [`startup`](Self::startup).
    pub async fn select_folder<P>(&mut self, picker: &P) -> bool
    where
        P: FolderPicker<Handle = H>,
    {
        let Some(handle) = picker.pick().await else {
            log::info!("Folder selection cancelled");
            return false;
        };
        if self.permissions.verify(&handle, true).await != PermissionState::Granted {
            log::warn!("Access to {} was denied", handle.name());
            return false;
        }
        if !self.permissions.persist(&handle).await {
            log::warn!("Not using {}: it could not be remembered", handle.name());
            return false;
        }
        self.attach(handle).await
    }

    /// Forget the folder and drop all state tied to it.
    pub async fn close_folder(&mut self) {
        self.permissions.forget().await;
        self.detach();
    }

    pub fn has_folder(&self) -> bool {
        self.context.is_some()
    }

    pub fn folder(&self) -> Option<&H> {
        self.context.as_ref().map(|ctx| ctx.handle())
    }

    pub fn listing(&self) -> Option<&DirectoryListing> {
        self.context.as_ref().map(|ctx| ctx.listing())
    }

    pub fn active(&self) -> Option<&ActiveNote> {
        self.active.as_ref()
    }

    /// Ensure today's note exists and make it the active note.
    pub async fn ensure_today(&mut self) -> Option<FileEntry> {
        let today = self.clock.today();
        let ctx = self.context.as_mut()?;
        let entry = ensure_today(ctx, today, &self.header_template).await?;
        self.open(&entry).await;
        Some(entry)
    }

    /// Load `entry` as the active note. Missing content opens as empty.
    ///
    /// A note that fails to load opens empty and read-only, so the next
    /// edit cannot overwrite it.
    pub async fn open(&mut self, entry: &FileEntry) -> bool {
        let Some(ctx) = self.context.as_ref() else {
            return false;
        };
        let (content, writable) = match ctx.load(entry.name()).await {
            Ok(content) => (content.unwrap_or_default(), true),
            Err(e) => {
                log::error!("Failed to read {}, opening read-only: {}", entry, e);
                (String::new(), false)
            }
        };
        self.active = Some(ActiveNote {
            entry: entry.clone(),
            document: NoteDocument::parse(&content),
            writable,
        });
        true
    }

    /// Open a listed note by its date.
    pub async fn open_date(&mut self, date: NaiveDate) -> bool {
        let entry = FileEntry::for_date(date);
        let listed = self
            .listing()
            .is_some_and(|listing| listing.contains(entry.name()));
        if !listed {
            log::info!("No note for {}", entry.label());
            return false;
        }
        self.open(&entry).await
    }

    /// Toggle the checkbox on line `index` of the active note and save.
    pub async fn toggle(&mut self, index: usize) -> ToggleOutcome {
        let now = self.clock.now();
        self.edit(|document| {
            let outcome = document.toggle(index, now);
            (outcome.changed(), outcome)
        })
        .await
        .unwrap_or(ToggleOutcome::Unchanged)
    }

    /// Append a task to the active note and save. Blank text is ignored.
    pub async fn add_task(&mut self, text: &str) -> bool {
        self.edit(|document| {
            let added = document.add_task(text);
            (added, added)
        })
        .await
        .unwrap_or(false)
    }

    /// Apply `change` to a copy of the active document and write it out.
    /// The in-memory note only moves forward once the write succeeded.
    async fn edit<T>(&mut self, change: impl FnOnce(&mut NoteDocument) -> (bool, T)) -> Option<T> {
        let ctx = self.context.as_mut()?;
        let active = self.active.as_mut()?;
        if !active.writable {
            log::warn!("{} was not loaded, refusing to save", active.entry);
            return None;
        }

        let mut document = active.document.clone();
        let (changed, result) = change(&mut document);
        if !changed {
            return Some(result);
        }
        if !ctx.write(active.entry.name(), &document.to_text()).await {
            return None;
        }
        active.document = document;
        Some(result)
    }

    /// Make `handle` the current folder. `false` if today's note is not open.
    async fn attach(&mut self, handle: H) -> bool {
        log::info!("Using folder {}", handle.name());
        self.context = Some(FolderContext::open(handle).await);
        self.active = None;
        self.ensure_today().await.is_some()
    }

    fn detach(&mut self) {
        self.context = None;
        self.active = None;
    }
}
