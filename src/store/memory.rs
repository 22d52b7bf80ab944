use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, Weak};

use super::capability::{
    Access, FolderEntry, FolderHandle, HandleToken, PermissionState, validate_name,
};
use crate::error::{Result, StoreError};

/// Volumes addressable by token, so a persisted handle can be restored while
/// any handle to it is alive.
static VOLUMES: LazyLock<Mutex<HashMap<String, Weak<Mutex<Volume>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

#[derive(Debug)]
struct Volume {
    files: BTreeMap<String, String>,
    dirs: BTreeSet<String>,
    permission: PermissionState,
    prompt_answer: PermissionState,
    fail_listing: bool,
    fail_reads: bool,
    fail_writes: bool,
}

/// An in-memory folder with scriptable permission behaviour.
///
/// Clones share the same volume. Creating a new `MemoryFolder` with an
/// existing name replaces that volume. The volume is freed with its last
/// handle.
#[derive(Debug, Clone)]
pub struct MemoryFolder {
    name: String,
    volume: Arc<Mutex<Volume>>,
}

impl MemoryFolder {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let volume = Arc::new(Mutex::new(Volume {
            files: BTreeMap::new(),
            dirs: BTreeSet::new(),
            permission: PermissionState::Granted,
            prompt_answer: PermissionState::Granted,
            fail_listing: false,
            fail_reads: false,
            fail_writes: false,
        }));
        let mut volumes = registry();
        volumes.retain(|_, live| live.strong_count() > 0);
        volumes.insert(name.clone(), Arc::downgrade(&volume));
        drop(volumes);
        Self { name, volume }
    }

    pub fn with_file(self, name: &str, text: &str) -> Self {
        self.volume().files.insert(name.to_string(), text.to_string());
        self
    }

    pub fn with_dir(self, name: &str) -> Self {
        self.volume().dirs.insert(name.to_string());
        self
    }

    /// Current permission, as the host would report it without prompting.
    pub fn set_permission(&self, state: PermissionState) {
        self.volume().permission = state;
    }

    /// What the user answers when prompted.
    pub fn set_prompt_answer(&self, state: PermissionState) {
        self.volume().prompt_answer = state;
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.volume().fail_listing = fail;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.volume().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.volume().fail_writes = fail;
    }

    pub fn file(&self, name: &str) -> Option<String> {
        self.volume().files.get(name).cloned()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.volume().files.keys().cloned().collect()
    }

    fn volume(&self) -> MutexGuard<'_, Volume> {
        self.volume.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_granted(&self) -> Result<()> {
        if self.volume().permission.is_granted() {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied)
        }
    }
}

fn registry() -> MutexGuard<'static, HashMap<String, Weak<Mutex<Volume>>>> {
    VOLUMES.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FolderHandle for MemoryFolder {
    fn token(&self) -> Option<HandleToken> {
        Some(HandleToken::new(self.name.clone()))
    }

    fn from_token(token: &HandleToken) -> Option<Self> {
        let volume = registry().get(token.as_str())?.upgrade()?;
        Some(Self {
            name: token.as_str().to_string(),
            volume,
        })
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    async fn query_permission(&self, _access: Access) -> PermissionState {
        self.volume().permission
    }

    async fn request_permission(&self, _access: Access) -> PermissionState {
        let mut volume = self.volume();
        match volume.permission {
            PermissionState::Prompt => {
                volume.permission = volume.prompt_answer;
                volume.permission
            }
            state => state,
        }
    }

    async fn entries(&self) -> Result<Vec<FolderEntry>> {
        self.check_granted()?;
        let volume = self.volume();
        if volume.fail_listing {
            return Err(io::Error::other("listing failed").into());
        }
        let dirs = volume.dirs.iter().map(FolderEntry::directory);
        let files = volume.files.keys().map(FolderEntry::file);
        Ok(dirs.chain(files).collect())
    }

    async fn read_text(&self, name: &str) -> Result<String> {
        self.check_granted()?;
        validate_name(name)?;
        let volume = self.volume();
        if volume.fail_reads {
            return Err(io::Error::other("read failed").into());
        }
        volume
            .files
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn write_text(&self, name: &str, text: &str) -> Result<()> {
        self.check_granted()?;
        validate_name(name)?;
        let mut volume = self.volume();
        if volume.fail_writes {
            return Err(io::Error::other("write failed").into());
        }
        volume.files.insert(name.to_string(), text.to_string());
        Ok(())
    }
}
