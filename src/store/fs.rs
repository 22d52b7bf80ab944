use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::capability::{
    Access, EntryKind, FolderEntry, FolderHandle, FolderPicker, HandleToken, PermissionState,
    validate_name,
};
use crate::error::{Result, StoreError};

/// A folder on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsFolder {
    root: PathBuf,
}

impl FsFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }

    async fn check_writable(&self) -> PermissionState {
        let marker = self.root.join(WRITE_CHECK_NAME);
        let created = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&marker)
            .await;
        match created {
            Ok(file) => {
                drop(file);
                if let Err(e) = tokio::fs::remove_file(&marker).await {
                    log::warn!("Failed to remove {}: {}", marker.display(), e);
                }
                PermissionState::Granted
            }
            // Left behind by an interrupted check; creating it worked once.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => PermissionState::Granted,
            Err(e) => {
                log::debug!("{} is not writable: {}", self.root.display(), e);
                PermissionState::Denied
            }
        }
    }
}

const WRITE_CHECK_NAME: &str = ".daybook-write-check.tmp";

impl FolderHandle for FsFolder {
    fn token(&self) -> Option<HandleToken> {
        self.root.to_str().map(HandleToken::new)
    }

    fn from_token(token: &HandleToken) -> Option<Self> {
        let path = token.as_str();
        if path.is_empty() {
            return None;
        }
        Some(Self::new(path))
    }

    fn same_folder(&self, other: &Self) -> bool {
        self.root == other.root
    }

    fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    async fn query_permission(&self, access: Access) -> PermissionState {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => {
                if access == Access::Read {
                    PermissionState::Granted
                } else if meta.permissions().readonly() {
                    PermissionState::Denied
                } else {
                    // The mode bits say nothing about this user; try it.
                    self.check_writable().await
                }
            }
            Ok(_) => PermissionState::Denied,
            Err(e) => {
                log::debug!("Cannot stat {}: {}", self.root.display(), e);
                PermissionState::Denied
            }
        }
    }

    async fn request_permission(&self, access: Access) -> PermissionState {
        // Nobody to prompt: what the OS lets us do is the answer.
        self.query_permission(access).await
    }

    async fn entries(&self) -> Result<Vec<FolderEntry>> {
        let mut dir = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::for_file(&self.root.display().to_string(), e))?;
        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let file_type = entry.file_type().await?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(FolderEntry { name, kind });
        }
        Ok(entries)
    }

    async fn read_text(&self, name: &str) -> Result<String> {
        let path = self.path_for(name)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| StoreError::for_file(name, e))?;
        // Notes saved by other editors may not be UTF-8; show them anyway.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn write_text(&self, name: &str, text: &str) -> Result<()> {
        let path = self.path_for(name)?;
        atomic_write(&path, text.as_bytes())
            .await
            .map_err(|e| StoreError::for_file(name, e))
    }
}

/// Write to a hidden sibling file and rename it over the target, so readers
/// see either the old content or the new content.
pub(crate) async fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let tmp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    let written: io::Result<()> = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if written.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    written
}

/// Picks a folder given on the command line.
#[derive(Debug, Clone)]
pub struct PathPicker {
    path: Option<PathBuf>,
}

impl PathPicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl FolderPicker for PathPicker {
    type Handle = FsFolder;

    async fn pick(&self) -> Option<FsFolder> {
        let path = self.path.as_ref()?;
        match tokio::fs::canonicalize(path).await {
            Ok(root) => Some(FsFolder::new(root)),
            Err(e) => {
                log::warn!("Cannot use folder {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let folder = FsFolder::new(dir.path());
        let content = "# 2024-01-01\n\n- [ ] buy milk\n";
        folder.write_text("2024-01-01.md", content).await.unwrap();
        assert_eq!(folder.read_text("2024-01-01.md").await.unwrap(), content);
    }

    #[tokio::test]
    async fn write_replaces_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let folder = FsFolder::new(dir.path());
        folder.write_text("2024-01-01.md", "first").await.unwrap();
        folder.write_text("2024-01-01.md", "second").await.unwrap();
        assert_eq!(folder.read_text("2024-01-01.md").await.unwrap(), "second");

        let names: Vec<String> = folder
            .entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["2024-01-01.md".to_string()]);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let folder = FsFolder::new(dir.path());
        let err = folder.read_text("2024-01-01.md").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let folder = FsFolder::new(dir.path().join("inner"));
        let err = folder.write_text("../escape.md", "x").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidName(_)));
    }

    #[tokio::test]
    async fn entries_report_kinds() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("2024-01-02.md")).unwrap();
        std::fs::write(dir.path().join("2024-01-01.md"), "").unwrap();
        let folder = FsFolder::new(dir.path());

        let mut entries = folder.entries().await.unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(
            entries,
            vec![
                FolderEntry::file("2024-01-01.md"),
                FolderEntry::directory("2024-01-02.md"),
            ]
        );
    }

    #[tokio::test]
    async fn missing_folder_is_denied() {
        let dir = tempfile::tempdir().unwrap();
        let folder = FsFolder::new(dir.path().join("gone"));
        assert_eq!(
            folder.query_permission(Access::Read).await,
            PermissionState::Denied
        );
        assert_eq!(
            folder.request_permission(Access::ReadWrite).await,
            PermissionState::Denied
        );
    }

    #[tokio::test]
    async fn existing_folder_is_granted() {
        let dir = tempfile::tempdir().unwrap();
        let folder = FsFolder::new(dir.path());
        assert_eq!(
            folder.query_permission(Access::ReadWrite).await,
            PermissionState::Granted
        );
    }

    #[tokio::test]
    async fn writable_check_leaves_folder_clean() {
        let dir = tempfile::tempdir().unwrap();
        let folder = FsFolder::new(dir.path());
        assert_eq!(
            folder.request_permission(Access::ReadWrite).await,
            PermissionState::Granted
        );
        assert!(folder.entries().await.unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unwritable_folder_is_denied_for_writes() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();
        let folder = FsFolder::new(&locked);

        // Root ignores mode bits, so only assert when the OS refuses a write.
        let refused = std::fs::write(locked.join("x"), "").is_err();
        if refused {
            assert_eq!(
                folder.query_permission(Access::ReadWrite).await,
                PermissionState::Denied
            );
        }
        assert_eq!(
            folder.query_permission(Access::Read).await,
            PermissionState::Granted
        );
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn token_keeps_surrounding_whitespace() {
        let folder = FsFolder::new("/srv/notes ");
        let token = folder.token().unwrap();
        assert_eq!(token.as_str(), "/srv/notes ");
        let restored = FsFolder::from_token(&token).unwrap();
        assert_eq!(restored.root(), Path::new("/srv/notes "));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_path_has_no_token() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let folder = FsFolder::new(OsStr::from_bytes(b"/srv/notes\xff"));
        assert!(folder.token().is_none());
        assert!(!folder.same_folder(&FsFolder::new("/srv/notes\u{fffd}")));
        assert!(folder.same_folder(&folder.clone()));
    }

    #[tokio::test]
    async fn non_utf8_note_is_read_lossily() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("2024-06-15.md"),
            b"- [ ] caf\xe9\n- [ ] important thing\n",
        )
        .unwrap();
        let folder = FsFolder::new(dir.path());
        let text = folder.read_text("2024-06-15.md").await.unwrap();
        assert_eq!(text, "- [ ] caf\u{fffd}\n- [ ] important thing\n");
    }

    #[tokio::test]
    async fn token_round_trips() {
        let folder = FsFolder::new("/srv/notes");
        let restored = FsFolder::from_token(&folder.token().unwrap()).unwrap();
        assert!(folder.same_folder(&restored));
        assert_eq!(folder.name(), "notes");
        assert!(FsFolder::from_token(&HandleToken::new("")).is_none());
    }

    #[tokio::test]
    async fn picker_canonicalizes_and_handles_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let picked = PathPicker::new(Some(dir.path().to_path_buf())).pick().await.unwrap();
        assert_eq!(picked.root(), dir.path().canonicalize().unwrap());
        assert!(PathPicker::new(None).pick().await.is_none());
        assert!(
            PathPicker::new(Some(dir.path().join("missing")))
                .pick()
                .await
                .is_none()
        );
    }
}
