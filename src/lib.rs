//! Managed assets over a project-relative virtual file system.
//!
//! ### Overview
//!
//! `assetdb-kit` gives asset tooling two things: a path type that turns whatever
//! path string a user supplies into one canonical project-relative form, and an
//! asset handle that creates, loads, saves and deletes entries of an asset
//! database exactly once.
//!
//! **Key ideas**:
//! - **Canonical paths**: [`AssetPath`] accepts forward or backward slashes,
//!   leading and trailing separators and absolute host paths inside the
//!   project, and always stores `Assets/...` or `Packages/...`.
//! - **Abstraction**: the asset database is a trait, [`Database`]. The crate ships
//!   [`AssetDatabase`] over pluggable [`Storage`]: in memory ([`MapDatabase`]) or
//!   on the host ([`DirDatabase`]).
//! - **Safety**: paths never leave the project's two roots.
//! - **Lifecycle**: an [`Asset`] is bound to exactly one entry until it is
//!   deleted; after that every operation fails.
//! - **Testability**: [`MapDatabase`] simulates storage without touching the disk.

mod asset;
mod core;
mod db;
mod path;
mod project;
mod storage;

pub use crate::asset::{Asset, status};
pub use crate::core::{
    AssetError, AssetObject, AssetType, Database, Folder, Guid, Object, RawAsset, Result,
    downcast, object, same_object, type_of,
};
pub use crate::db::{AssetDatabase, DirDatabase, MapDatabase, Origin};
pub use crate::path::{AssetPath, Root};
pub use crate::project::{DeleteMode, Project, ProjectConfig};
pub use crate::storage::{DirStorage, Entry, MapStorage, Storage};
