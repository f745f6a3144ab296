mod error;
mod types;
pub(crate) mod utils;

pub use error::AssetError;
pub use types::{
    AssetObject, AssetType, Folder, Guid, Object, RawAsset, downcast, object, same_object, type_of,
};

use crate::{AssetPath, Project};

pub type Result<T> = std::result::Result<T, AssetError>;

/// Capabilities of an asset database, the external collaborator that owns the
/// on-disk files and the registry of imported assets.
///
/// "On disk" refers to the backing storage, "exists" to the registry.
/// A file can exist on disk without being imported.
pub trait Database {
    /// The project whose `Assets` and `Packages` roots this database manages.
    fn project(&self) -> &Project;

    /// Returns `true` if the registry has an entry at `path`.
    fn exists(&self, path: &AssetPath) -> bool;

    /// Returns `true` if a file or folder exists at `path` in the backing storage.
    fn exists_on_disk(&self, path: &AssetPath) -> bool;

    /// Returns `true` if the entry at `path` is a folder.
    fn is_folder(&self, path: &AssetPath) -> bool;

    /// Returns `true` if `obj` is the main object or a sub object of any entry.
    fn contains(&self, obj: &Object) -> bool;

    fn main_type_of(&self, path: &AssetPath) -> Option<AssetType>;

    /// Returns the main object of the entry at `path` and marks it as loaded.
    fn load_main(&self, path: &AssetPath) -> Option<Object>;

    /// Returns the main object followed by all sub objects of the entry at `path`.
    fn load_all(&self, path: &AssetPath) -> Vec<Object>;

    /// Returns the path of the entry that holds `obj`.
    fn path_of(&self, obj: &Object) -> Option<AssetPath>;

    fn guid_for(&self, path: &AssetPath) -> Option<Guid>;

    fn path_for(&self, guid: Guid) -> Option<AssetPath>;

    /// Returns `path` if nothing occupies it, otherwise the same path with the
    /// smallest unused number `n >= 1` appended to the file stem (`"name n.ext"`).
    /// An existing number is not parsed: a taken `"x 1.asset"` becomes `"x 1 1.asset"`.
    fn uniquify_path(&self, path: &AssetPath) -> AssetPath;

    /// Registers a file or folder that exists on disk but not in the registry.
    fn import(&mut self, path: &AssetPath) -> Result<()>;

    /// Writes `obj` to `path` and registers it as a native asset.
    /// With `overwrite`, an existing entry at `path` is replaced.
    fn import_new_object(&mut self, obj: Object, path: &AssetPath, overwrite: bool) -> Result<()>;

    /// Attaches `obj` as a sub object of the entry at `path`.
    fn add_object_to_asset(&mut self, obj: Object, path: &AssetPath) -> Result<()>;

    /// Persists the in-memory state of `obj`, which must belong to the entry at `path`.
    fn save(&mut self, path: &AssetPath, obj: &Object) -> Result<()>;

    /// Creates all missing folders of `path`. Returns the guid of the deepest folder.
    fn create_folders(&mut self, path: &AssetPath) -> Result<Guid>;

    /// Permanently removes the entry at `path` and everything below it.
    /// Returns `false` if there was no such entry.
    fn delete(&mut self, path: &AssetPath) -> Result<bool>;

    /// Moves the entry at `path` to the project trash.
    /// Returns `false` if there was no such entry.
    fn trash(&mut self, path: &AssetPath) -> Result<bool>;

    fn is_main(&self, obj: &Object) -> bool;

    fn is_sub(&self, obj: &Object) -> bool;

    /// Returns `true` for entries imported from files the database does not serialize itself.
    fn is_foreign(&self, obj: &Object) -> bool;

    /// Returns `true` for entries serialized by the database.
    fn is_native(&self, obj: &Object) -> bool;

    fn is_loaded(&self, path: &AssetPath) -> bool;

    fn is_scene(&self, obj: &Object) -> bool;
}
