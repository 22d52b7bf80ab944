pub mod capability;
pub mod context;
pub mod file;
pub mod fs;
pub mod index;
pub mod memory;
pub mod permission;

pub use capability::{Access, FolderHandle, FolderPicker, HandleToken, PermissionState};
pub use context::FolderContext;
pub use fs::{FsFolder, PathPicker};
pub use memory::MemoryFolder;
pub use permission::PermissionStore;
