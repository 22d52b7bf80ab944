//! Whole-file reads and writes inside the granted folder.

use super::capability::FolderHandle;
use super::context::FolderContext;
use crate::error::Result;

impl<H: FolderHandle> FolderContext<H> {
    /// Text of `name`, or `None` if it is missing or unreadable.
    pub async fn read(&self, name: &str) -> Option<String> {
        match self.load(name).await {
            Ok(text) => text,
            Err(e) => {
                log::error!("Failed to read {}: {}", name, e);
                None
            }
        }
    }

    /// Like [`read`](Self::read), but keeps "missing" apart from "failed".
    pub async fn load(&self, name: &str) -> Result<Option<String>> {
        match self.handle().read_text(name).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.is_not_found() => {
                log::debug!("{} does not exist yet", name);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Replace the content of `name`, creating it if needed.
    ///
    /// A successful write of a file the listing does not know yet re-indexes
    /// the folder. On failure nothing changes.
    pub async fn write(&mut self, name: &str, text: &str) -> bool {
        if let Err(e) = self.handle().write_text(name, text).await {
            log::error!("Failed to write {}: {}", name, e);
            return false;
        }
        if !self.listing().contains(name) {
            self.refresh().await;
        }
        true
    }
}
