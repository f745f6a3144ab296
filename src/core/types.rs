//! Runtime object plumbing: objects managed by a database, their types and identifiers.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An object that can be stored as (part of) an asset.
///
/// Implemented for every `'static` type that implements `Debug`.
pub trait AssetObject: Any + fmt::Debug {
    fn asset_type(&self) -> AssetType;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any + fmt::Debug> AssetObject for T {
    fn asset_type(&self) -> AssetType {
        AssetType::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// Shared handle to an object. Identity is the allocation, not the value.
pub type Object = Rc<dyn AssetObject>;

/// Wraps a value into an [`Object`].
pub fn object<T: AssetObject>(value: T) -> Object {
    Rc::new(value)
}

/// Returns the runtime type of the object behind the handle.
pub fn type_of(obj: &Object) -> AssetType {
    <dyn AssetObject>::asset_type(&**obj)
}

/// Returns a typed handle to the same allocation if the object is a `T`.
pub fn downcast<T: Any>(obj: &Object) -> Option<Rc<T>> {
    <dyn AssetObject>::into_any(Rc::clone(obj)).downcast::<T>().ok()
}

/// Returns `true` if both handles point to the same object.
pub fn same_object(a: &Object, b: &Object) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Runtime type of an asset object.
#[derive(Clone, Copy)]
pub struct AssetType {
    id: TypeId,
    name: &'static str,
}

impl AssetType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for AssetType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AssetType {}

impl fmt::Debug for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Stable identifier of a database entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(Uuid);

impl Guid {
    /// Generates a new random guid.
    pub fn new() -> Self {
        Guid(Uuid::new_v4())
    }

    /// The null guid. Never assigned to an entry.
    pub const fn nil() -> Self {
        Guid(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::nil()
    }
}

impl From<Uuid> for Guid {
    fn from(uuid: Uuid) -> Self {
        Guid(uuid)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Main object of a folder entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub name: String,
}

/// Main object of a file that the database does not serialize itself.
/// Holds the bytes read at import time.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAsset {
    pub bytes: Vec<u8>,
}
