//! Backing storage of an asset database: the "disk" that holds asset files,
//! folders and sidecars, addressed by [`AssetPath`].

mod dir_storage;
mod entry;
mod map_storage;

pub use dir_storage::DirStorage;
pub use entry::Entry;
pub use map_storage::MapStorage;

use anyhow::Result;

use crate::AssetPath;

pub trait Storage {
    fn exists(&self, path: &AssetPath) -> bool;
    fn is_dir(&self, path: &AssetPath) -> Result<bool>;
    /// Creates the directory and all its missing parents.
    fn mkdir(&mut self, path: &AssetPath) -> Result<()>;
    fn read(&self, path: &AssetPath) -> Result<Vec<u8>>;
    /// Creates or truncates the file, creating missing parent directories.
    fn write(&mut self, path: &AssetPath, content: &[u8]) -> Result<()>;
    /// Removes a file or a directory with all its contents.
    fn rm(&mut self, path: &AssetPath) -> Result<()>;
    /// Moves a file or directory into the trash under `bucket`.
    fn move_to_trash(&mut self, path: &AssetPath, bucket: &str) -> Result<()>;
}
