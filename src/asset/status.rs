//! Status predicates for objects and paths.
//!
//! Every predicate answers `false` for `None` instead of failing, so callers
//! can pass the main object of a deleted [`Asset`](crate::Asset) as is.

use crate::AssetPath;
use crate::core::{Database, Object};

/// Returns `true` if the object is registered in the database.
pub fn is_imported<D: Database + ?Sized>(db: &D, obj: Option<&Object>) -> bool {
    obj.is_some_and(|o| db.contains(o))
}

/// Returns `true` if the object is the main object of its entry.
pub fn is_main<D: Database + ?Sized>(db: &D, obj: Option<&Object>) -> bool {
    obj.is_some_and(|o| db.is_main(o))
}

/// Returns `true` if the object is a sub object of a composite entry.
pub fn is_sub<D: Database + ?Sized>(db: &D, obj: Option<&Object>) -> bool {
    obj.is_some_and(|o| db.is_sub(o))
}

/// Returns `true` for objects of entries whose files are in a format the
/// database only imports, such as images or audio. The database keeps a
/// derived representation of them.
pub fn is_foreign<D: Database + ?Sized>(db: &D, obj: Option<&Object>) -> bool {
    obj.is_some_and(|o| db.is_foreign(o))
}

/// Returns `true` for objects of entries the database serializes itself.
pub fn is_native<D: Database + ?Sized>(db: &D, obj: Option<&Object>) -> bool {
    obj.is_some_and(|o| db.is_native(o))
}

/// Returns `true` if the main object of the entry holding `obj` is loaded.
pub fn is_loaded<D: Database + ?Sized>(db: &D, obj: Option<&Object>) -> bool {
    obj.and_then(|o| db.path_of(o))
        .is_some_and(|path| db.is_loaded(&path))
}

/// Returns `true` if the main object of the entry at `path` is loaded.
pub fn is_loaded_at<D: Database + ?Sized>(db: &D, path: Option<&AssetPath>) -> bool {
    path.is_some_and(|p| db.is_loaded(p))
}

pub fn is_scene<D: Database + ?Sized>(db: &D, obj: Option<&Object>) -> bool {
    obj.is_some_and(|o| db.is_scene(o))
}
