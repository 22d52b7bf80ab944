//! Host boundary: an opaque, permission-scoped handle to one folder.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    ReadWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionState {
    /// Not asked yet; a request may prompt the user.
    Prompt,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Serialized form of a handle, persisted between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleToken(String);

impl HandleToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// An immediate child of a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl FolderEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }
}

/// Capability over a user-granted folder.
///
/// Enumeration and file access are gated by permission: implementations
/// return `StoreError::PermissionDenied` when access has lapsed. Writes
/// create the file if needed and are all-or-nothing.
pub trait FolderHandle: Clone + Send + Sync + 'static {
    /// `None` when the handle has no lossless serialized form.
    fn token(&self) -> Option<HandleToken>;

    /// Rebuild a handle from a persisted token. Permission is not checked.
    fn from_token(token: &HandleToken) -> Option<Self>;

    /// Human readable folder name.
    fn name(&self) -> String;

    fn same_folder(&self, other: &Self) -> bool {
        match (self.token(), other.token()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn query_permission(&self, access: Access) -> impl Future<Output = PermissionState> + Send;

    /// Ask for access, prompting the user where the host can.
    fn request_permission(&self, access: Access) -> impl Future<Output = PermissionState> + Send;

    fn entries(&self) -> impl Future<Output = Result<Vec<FolderEntry>>> + Send;

    fn read_text(&self, name: &str) -> impl Future<Output = Result<String>> + Send;

    fn write_text(&self, name: &str, text: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Host prompt that lets the user choose a folder.
pub trait FolderPicker {
    type Handle: FolderHandle;

    /// `None` when the user cancels.
    fn pick(&self) -> impl Future<Output = Option<Self::Handle>> + Send;
}

/// Reject names that would escape the folder or address a nested path.
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}
