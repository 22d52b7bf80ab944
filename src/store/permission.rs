//! Remembers the granted folder between sessions.
//!
//! The state file holds exactly one key mapping to the folder's handle
//! token. On restore the handle is re-verified; a lapsed or refused grant
//! means "no folder selected" and the stale key is dropped.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::capability::{Access, FolderHandle, HandleToken, PermissionState};
use super::fs::atomic_write;
use crate::error::{Result, StoreError};

pub const FOLDER_HANDLE_KEY: &str = "directory-handle";

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(
        rename = "directory-handle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    directory_handle: Option<HandleToken>,
}

#[derive(Debug, Clone)]
pub struct PermissionStore {
    state_path: PathBuf,
}

impl PermissionStore {
    pub fn new(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Remember `handle` as the active folder.
    pub async fn persist<H: FolderHandle>(&self, handle: &H) -> bool {
        let Some(token) = handle.token() else {
            log::error!("Folder {} cannot be remembered", handle.name());
            return false;
        };
        match self.save(Some(token)).await {
            Ok(()) => {
                log::info!("Remembered folder {}", handle.name());
                true
            }
            Err(e) => {
                log::error!("Failed to persist folder handle: {}", e);
                false
            }
        }
    }

    /// Load the remembered folder, re-requesting access if it lapsed.
    pub async fn restore<H: FolderHandle>(&self) -> Option<H> {
        let token = match self.load().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                log::debug!("No folder remembered");
                return None;
            }
            Err(e) => {
                log::warn!("Ignoring unreadable state {}: {}", self.state_path.display(), e);
                return None;
            }
        };

        let Some(handle) = H::from_token(&token) else {
            log::warn!("Remembered folder {} is no longer available", token);
            self.forget().await;
            return None;
        };

        match self.verify(&handle, true).await {
            PermissionState::Granted => Some(handle),
            _ => {
                log::info!("Access to {} was not granted, forgetting it", handle.name());
                self.forget().await;
                None
            }
        }
    }

    /// Check access and prompt if needed. Anything short of a grant is `Denied`.
    pub async fn verify<H: FolderHandle>(&self, handle: &H, needs_write: bool) -> PermissionState {
        let access = if needs_write {
            Access::ReadWrite
        } else {
            Access::Read
        };
        if handle.query_permission(access).await.is_granted() {
            return PermissionState::Granted;
        }
        match handle.request_permission(access).await {
            PermissionState::Granted => PermissionState::Granted,
            state => {
                log::debug!("Permission for {} is {:?}", handle.name(), state);
                PermissionState::Denied
            }
        }
    }

    /// Drop the remembered folder.
    pub async fn forget(&self) -> bool {
        match self.save(None).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to clear folder handle: {}", e);
                false
            }
        }
    }

    async fn load(&self) -> Result<Option<HandleToken>> {
        let content = match tokio::fs::read_to_string(&self.state_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let state: PersistedState = serde_json::from_str(&content)?;
        Ok(state.directory_handle)
    }

    async fn save(&self, token: Option<HandleToken>) -> Result<()> {
        if let Some(parent) = self.state_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let state = PersistedState {
            directory_handle: token,
        };
        let json = serde_json::to_string_pretty(&state)?;
        atomic_write(&self.state_path, json.as_bytes()).await?;
        Ok(())
    }
}
