use super::capability::FolderHandle;
use super::index;
use crate::core::entry::DirectoryListing;

/// The granted folder and what is known to be in it.
///
/// Created when access is granted (picked or restored) and dropped when the
/// folder is closed. Only the file store replaces the listing, and only
/// through a full re-index.
#[derive(Debug, Clone)]
pub struct FolderContext<H: FolderHandle> {
    handle: H,
    listing: DirectoryListing,
}

impl<H: FolderHandle> FolderContext<H> {
    /// Build a context and index the folder.
    pub async fn open(handle: H) -> Self {
        let listing = index::list(&handle).await;
        Self { handle, listing }
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn listing(&self) -> &DirectoryListing {
        &self.listing
    }

    pub async fn refresh(&mut self) {
        self.listing = index::list(&self.handle).await;
    }
}
