use super::capability::{EntryKind, FolderHandle};
use crate::core::entry::{DirectoryListing, FileEntry};
use crate::error::Result;

/// List the daily notes in `handle`. Enumeration failures are logged and
/// produce an empty listing.
pub async fn list<H: FolderHandle>(handle: &H) -> DirectoryListing {
    match scan(handle).await {
        Ok(listing) => {
            log::debug!("Found {} daily notes in {}", listing.len(), handle.name());
            listing
        }
        Err(e) => {
            log::error!("Failed to list {}: {}", handle.name(), e);
            DirectoryListing::default()
        }
    }
}

/// Like `list`, but surfaces the error.
pub async fn scan<H: FolderHandle>(handle: &H) -> Result<DirectoryListing> {
    let entries = handle.entries().await?;
    Ok(DirectoryListing::from_entries(
        entries
            .into_iter()
            .filter(|e| e.kind == EntryKind::File)
            .filter_map(|e| FileEntry::parse(&e.name)),
    ))
}
