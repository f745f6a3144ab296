//! Managed assets: a handle that owns one database entry from creation or
//! loading until it is deleted.
//!
//! ### States
//! - **Bound**: the handle holds the entry's path and its main object.
//! - **Deleted**: terminal. Every further operation fails with
//!   [`AssetError::InvalidOperation`].
//!
//! The path and main object live together in the `Bound` state, so a handle
//! can never hold one without the other.

pub mod status;

use std::any::Any;
use std::rc::Rc;

use tracing::debug;

use crate::core::{
    AssetError, AssetType, Database, Guid, Object, Result, downcast, object, type_of,
};
use crate::project::DeleteMode;
use crate::{AssetObject, AssetPath};

#[derive(Debug)]
struct Bound {
    path: AssetPath,
    main: Object,
    objects: Option<Vec<Object>>, // main + sub objects, loaded on demand
}

#[derive(Debug)]
enum State {
    Bound(Bound),
    Deleted,
}

/// Handle to an asset entry of a [`Database`].
///
/// The handle does not keep a reference to the database; every operation
/// takes it as an argument.
///
/// ### Example:
/// ```
/// use assetdb_kit::{Asset, AssetPath, MapDatabase, Project, object};
///
/// #[derive(Debug)]
/// struct Material {
///     shininess: f32,
/// }
///
/// let mut db = MapDatabase::new(Project::new("/work/game").unwrap()).unwrap();
/// let path = AssetPath::new("Assets/materials/red.asset").unwrap();
///
/// let mut asset = Asset::create(&mut db, object(Material { shininess: 0.5 }), &path, false).unwrap();
/// assert_eq!(asset.path(), Some(&path));
///
/// let material = asset.load::<Material, _>(&db).unwrap();
/// assert_eq!(material.shininess, 0.5);
///
/// asset.delete(&mut db).unwrap();
/// assert!(asset.is_deleted());
/// assert!(asset.save(&mut db).is_err());
/// ```
#[derive(Debug)]
pub struct Asset {
    state: State,
}

// construction

impl Asset {
    fn bind(path: AssetPath, main: Object) -> Self {
        Self {
            state: State::Bound(Bound {
                path,
                main,
                objects: None,
            }),
        }
    }

    /// Binds to the entry at `path`.
    ///
    /// Fails with `NotFound` if nothing exists at `path` in storage and with
    /// `NotImported` if the database has no entry for it.
    pub fn from_path<D: Database + ?Sized>(db: &D, path: &AssetPath) -> Result<Self> {
        let main = load_checked(db, path, None)?;
        Ok(Self::bind(path.clone(), main))
    }

    /// Like [`Asset::from_path`], additionally requiring the main object to be a `T`.
    pub fn from_path_as<T: Any, D: Database + ?Sized>(db: &D, path: &AssetPath) -> Result<Self> {
        let main = load_checked(db, path, Some(AssetType::of::<T>()))?;
        Ok(Self::bind(path.clone(), main))
    }

    /// Normalizes `raw` against the database's project and binds to the entry there.
    pub fn open<D: Database + ?Sized>(db: &D, raw: &str) -> Result<Self> {
        let path = db.project().path(raw)?;
        Self::from_path(db, &path)
    }

    /// Binds to the entry that holds `obj`, which may be a main or a sub object.
    pub fn from_object<D: Database + ?Sized>(db: &D, obj: &Object) -> Result<Self> {
        let path = db
            .path_of(obj)
            .ok_or_else(|| AssetError::NotAnAsset(format!("{obj:?}")))?;
        Self::from_path(db, &path)
    }

    /// Binds to the entry with the given guid.
    pub fn from_guid<D: Database + ?Sized>(db: &D, guid: Guid) -> Result<Self> {
        if guid.is_nil() {
            return Err(AssetError::ArgumentNull("guid"));
        }
        let path = db
            .path_for(guid)
            .ok_or_else(|| AssetError::NotAnAsset(format!("guid {guid}")))?;
        Self::from_path(db, &path)
    }

    /// Registers a file that exists in storage but not in the database, then binds to it.
    pub fn import<D: Database + ?Sized>(db: &mut D, path: &AssetPath) -> Result<Self> {
        db.import(path)?;
        Self::from_path(db, path)
    }

    /// Creates a new asset from `obj` at `path`.
    ///
    /// Missing folders are created. If a file already exists at `path` and
    /// `overwrite` is false, the asset is created at the next free numbered
    /// path instead (`"x.asset"` becomes `"x 1.asset"`), leaving the existing
    /// file untouched. With `overwrite`, the entry at `path` is replaced.
    pub fn create<D: Database + ?Sized>(
        db: &mut D,
        obj: Object,
        path: &AssetPath,
        overwrite: bool,
    ) -> Result<Self> {
        if let Some(existing) = db.path_of(&obj) {
            return Err(AssetError::AlreadyAnAsset(existing.to_string()));
        }

        let target = if !overwrite && db.exists_on_disk(path) {
            db.uniquify_path(path)
        } else {
            path.clone()
        };
        if let Some(folder) = target.parent() {
            db.create_folders(&folder)?;
        }
        db.import_new_object(Rc::clone(&obj), &target, overwrite)?;

        debug!(path = %target, overwrite, "created asset");
        Ok(Self::bind(target, obj))
    }

    /// Loads the `T` at `path` if an entry exists there, otherwise creates one
    /// from the value returned by `make`.
    pub fn load_or_create<T, D, F>(db: &mut D, path: &AssetPath, make: F) -> Result<Self>
    where
        T: AssetObject,
        D: Database + ?Sized,
        F: FnOnce() -> T,
    {
        if db.exists(path) {
            return Self::from_path_as::<T, D>(db, path);
        }
        Self::create(db, object(make()), path, false)
    }

    /// Deletes the entry at `path`. Does nothing for `None`.
    pub fn delete_at<D: Database + ?Sized>(db: &mut D, path: Option<&AssetPath>) -> Result<bool> {
        match path {
            Some(path) => db.delete(path),
            None => Ok(false),
        }
    }

    /// Deletes the entry holding `obj`. Does nothing for `None` or unregistered objects.
    pub fn delete_object<D: Database + ?Sized>(db: &mut D, obj: Option<&Object>) -> Result<bool> {
        let path = obj.and_then(|o| db.path_of(o));
        Self::delete_at(db, path.as_ref())
    }
}

// queries

impl Asset {
    /// The entry's path, `None` once deleted.
    pub fn path(&self) -> Option<&AssetPath> {
        match &self.state {
            State::Bound(bound) => Some(&bound.path),
            State::Deleted => None,
        }
    }

    /// The entry's main object, `None` once deleted.
    pub fn main_object(&self) -> Option<&Object> {
        match &self.state {
            State::Bound(bound) => Some(&bound.main),
            State::Deleted => None,
        }
    }

    pub fn main_type(&self) -> Option<AssetType> {
        self.main_object().map(type_of)
    }

    /// The main object as a `T`, `None` if deleted or of another type.
    pub fn main_as<T: Any>(&self) -> Option<Rc<T>> {
        self.main_object().and_then(downcast::<T>)
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self.state, State::Deleted)
    }

    pub fn guid<D: Database + ?Sized>(&self, db: &D) -> Result<Guid> {
        self.bound()?.path.guid(db)
    }

    pub fn is_foreign<D: Database + ?Sized>(&self, db: &D) -> bool {
        status::is_foreign(db, self.main_object())
    }

    pub fn is_native<D: Database + ?Sized>(&self, db: &D) -> bool {
        status::is_native(db, self.main_object())
    }

    pub fn is_main<D: Database + ?Sized>(&self, db: &D) -> bool {
        status::is_main(db, self.main_object())
    }

    pub fn is_sub<D: Database + ?Sized>(&self, db: &D) -> bool {
        status::is_sub(db, self.main_object())
    }

    pub fn is_loaded<D: Database + ?Sized>(&self, db: &D) -> bool {
        status::is_loaded_at(db, self.path())
    }

    pub fn is_scene<D: Database + ?Sized>(&self, db: &D) -> bool {
        status::is_scene(db, self.main_object())
    }

    fn bound(&self) -> Result<&Bound> {
        match &self.state {
            State::Bound(bound) => Ok(bound),
            State::Deleted => Err(deleted()),
        }
    }

    fn bound_mut(&mut self) -> Result<&mut Bound> {
        match &mut self.state {
            State::Bound(bound) => Ok(bound),
            State::Deleted => Err(deleted()),
        }
    }
}

// mutation

impl Asset {
    /// Reads the main object again and returns it as a `T`.
    pub fn load<T: Any, D: Database + ?Sized>(&mut self, db: &D) -> Result<Rc<T>> {
        let bound = self.bound_mut()?;
        let requested = AssetType::of::<T>();
        let main = load_checked(db, &bound.path, Some(requested))?;
        let typed = downcast::<T>(&main).ok_or_else(|| AssetError::TypeMismatch {
            path: bound.path.to_string(),
            requested: requested.name(),
            stored: type_of(&main).name(),
        })?;

        bound.main = main;
        bound.objects = None;
        Ok(typed)
    }

    /// The main object followed by all sub objects, read from the database on first use.
    pub fn all_objects<D: Database + ?Sized>(&mut self, db: &D) -> Result<&[Object]> {
        let bound = self.bound_mut()?;
        let objects = bound.objects.get_or_insert_with(|| db.load_all(&bound.path));
        Ok(objects.as_slice())
    }

    /// Attaches `obj` to this asset as a sub object.
    pub fn add_object<D: Database + ?Sized>(&mut self, db: &mut D, obj: Object) -> Result<()> {
        let bound = self.bound_mut()?;
        db.add_object_to_asset(obj, &bound.path)?;
        bound.objects = None;
        Ok(())
    }

    /// Writes the in-memory state of the main object through the database.
    pub fn save<D: Database + ?Sized>(&mut self, db: &mut D) -> Result<()> {
        let bound = self.bound()?;
        if !db.exists(&bound.path) {
            return Err(AssetError::NotFound(bound.path.to_string()));
        }
        db.save(&bound.path, &bound.main)?;
        debug!(path = %bound.path, "saved asset");
        Ok(())
    }

    /// Permanently removes the entry and invalidates the handle.
    /// Returns the detached main object.
    pub fn delete<D: Database + ?Sized>(&mut self, db: &mut D) -> Result<Object> {
        self.remove_with(db, DeleteMode::Delete)
    }

    /// Moves the entry to the project trash and invalidates the handle.
    /// Returns the detached main object.
    pub fn trash<D: Database + ?Sized>(&mut self, db: &mut D) -> Result<Object> {
        self.remove_with(db, DeleteMode::Trash)
    }

    /// Deletes or trashes the entry, as configured by the project's `delete_mode`.
    pub fn remove<D: Database + ?Sized>(&mut self, db: &mut D) -> Result<Object> {
        let mode = db.project().config().delete_mode;
        self.remove_with(db, mode)
    }

    fn remove_with<D: Database + ?Sized>(&mut self, db: &mut D, mode: DeleteMode) -> Result<Object> {
        let path = self.bound()?.path.clone();
        let removed = match mode {
            DeleteMode::Delete => db.delete(&path)?,
            DeleteMode::Trash => db.trash(&path)?,
        };
        if !removed {
            // another handle got there first; the handle stays bound
            return Err(AssetError::NotFound(path.to_string()));
        }

        match std::mem::replace(&mut self.state, State::Deleted) {
            State::Bound(bound) => {
                debug!(path = %path, ?mode, "asset removed");
                Ok(bound.main)
            }
            State::Deleted => Err(deleted()),
        }
    }
}

fn deleted() -> AssetError {
    AssetError::InvalidOperation("the asset has been deleted".to_string())
}

/// Loads the main object at `path`, checking storage, registration and type in that order.
fn load_checked<D: Database + ?Sized>(
    db: &D,
    path: &AssetPath,
    requested: Option<AssetType>,
) -> Result<Object> {
    if !db.exists_on_disk(path) {
        return Err(AssetError::NotFound(path.to_string()));
    }
    let stored = db
        .main_type_of(path)
        .ok_or_else(|| AssetError::NotImported(path.to_string()))?;
    if let Some(requested) = requested {
        if requested != stored {
            return Err(AssetError::TypeMismatch {
                path: path.to_string(),
                requested: requested.name(),
                stored: stored.name(),
            });
        }
    }
    db.load_main(path)
        .ok_or_else(|| AssetError::NotImported(path.to_string()))
}
