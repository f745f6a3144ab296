//! The asset database: a registry of imported entries on top of a [`Storage`].
//!
//! Every registered entry has a guid, a main object and optional sub objects.
//! Non-root entries get a `.meta` sidecar in storage holding their guid, so an
//! entry keeps its guid when a file is imported again. Native assets are
//! written as small TOML documents; foreign files are read as [`RawAsset`]s.

mod meta;

pub use meta::Origin;

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, anyhow};
use tracing::{debug, trace};

use crate::core::{
    AssetError, AssetType, Database, Folder, Guid, Object, RawAsset, Result, object, same_object,
    type_of,
};
use crate::storage::{DirStorage, MapStorage, Storage};
use crate::{AssetPath, Project};
use meta::{META_SUFFIX, MetaFile, NativeDocument, SubObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Folder,
    File,
}

#[derive(Debug)]
struct Record {
    guid: Guid,
    kind: Kind,
    origin: Origin,
    main: Object,
    subs: Vec<Object>,
    loaded: Cell<bool>,
}

impl Record {
    fn folder(guid: Guid, path: &AssetPath) -> Self {
        let name = path.file_name().unwrap_or(path.root()).to_string();
        Self {
            guid,
            kind: Kind::Folder,
            origin: Origin::Native,
            main: object(Folder { name }),
            subs: Vec::new(),
            loaded: Cell::new(false),
        }
    }

    fn file(guid: Guid, origin: Origin, main: Object, loaded: bool) -> Self {
        Self {
            guid,
            kind: Kind::File,
            origin,
            main,
            subs: Vec::new(),
            loaded: Cell::new(loaded),
        }
    }

    fn holds(&self, obj: &Object) -> bool {
        same_object(&self.main, obj) || self.subs.iter().any(|s| same_object(s, obj))
    }

    fn is_file_from(&self, origin: Origin) -> bool {
        self.kind == Kind::File && self.origin == origin
    }

    /// Native files whose main object was created in memory. A native file
    /// read back by `import` holds its bytes as a [`RawAsset`] and is never
    /// rewritten from it.
    fn writes_document(&self) -> bool {
        self.is_file_from(Origin::Native) && !type_of(&self.main).is::<RawAsset>()
    }
}

/// Asset database over any [`Storage`].
pub struct AssetDatabase<S: Storage> {
    project: Project,
    storage: S,
    records: BTreeMap<AssetPath, Record>,
    guids: HashMap<Guid, AssetPath>,
}

/// Asset database kept in memory.
pub type MapDatabase = AssetDatabase<MapStorage>;

/// Asset database over the project directory on the host.
pub type DirDatabase = AssetDatabase<DirStorage>;

impl MapDatabase {
    pub fn new(project: Project) -> Result<Self> {
        Self::with_storage(project, MapStorage::new())
    }
}

impl DirDatabase {
    /// Opens the project directory. `Assets` and `Packages` are created if missing.
    pub fn open(project: Project) -> Result<Self> {
        let storage = DirStorage::new(project.clone())?;
        Self::with_storage(project, storage)
    }

    /// See [`DirStorage::set_auto_clean`].
    pub fn set_auto_clean(&mut self, clean: bool) {
        self.storage.set_auto_clean(clean);
    }
}

impl<S: Storage> AssetDatabase<S> {
    /// Creates a database with the two root folders registered.
    pub fn with_storage(project: Project, mut storage: S) -> Result<Self> {
        let mut records = BTreeMap::new();
        let mut guids = HashMap::new();
        for root in [AssetPath::default(), AssetPath::new("Packages")?] {
            if !storage.exists(&root) {
                storage.mkdir(&root)?;
            }
            let guid = Guid::new();
            guids.insert(guid, root.clone());
            records.insert(root.clone(), Record::folder(guid, &root));
        }

        Ok(Self {
            project,
            storage,
            records,
            guids,
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Writes a file to storage without registering it, the way an external
    /// tool would. Use [`Database::import`] to register it afterwards.
    pub fn write_file(&mut self, path: &AssetPath, content: &[u8]) -> Result<()> {
        self.storage.write(path, content)?;
        Ok(())
    }

    /// Registered paths at or below `path`.
    pub fn tree<'a>(&'a self, path: &'a AssetPath) -> impl Iterator<Item = &'a AssetPath> + 'a {
        self.records.keys().filter(move |p| p.is_within(path))
    }

    /// Number of registered entries, roots included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record_of(&self, obj: &Object) -> Option<(&AssetPath, &Record)> {
        self.records.iter().find(|(_, record)| record.holds(obj))
    }

    fn register(&mut self, path: &AssetPath, record: Record) {
        trace!(path = %path, guid = %record.guid, "register");
        self.guids.insert(record.guid, path.clone());
        self.records.insert(path.clone(), record);
    }

    fn unregister_tree(&mut self, path: &AssetPath) {
        let removed: Vec<AssetPath> = self.tree(path).cloned().collect();
        for p in removed {
            if let Some(record) = self.records.remove(&p) {
                trace!(path = %p, guid = %record.guid, "unregister");
                self.guids.remove(&record.guid);
            }
        }
    }

    fn is_meta(path: &AssetPath) -> bool {
        path.as_str().ends_with(META_SUFFIX)
    }

    /// Returns the guid stored in the sidecar of `path`, unless another entry already uses it.
    fn read_meta(&self, path: &AssetPath) -> Option<MetaFile> {
        let sidecar = path.sidecar(META_SUFFIX);
        if path.is_root() || !self.storage.exists(&sidecar) {
            return None;
        }
        let bytes = self.storage.read(&sidecar).ok()?;
        let meta: MetaFile = toml::from_str(std::str::from_utf8(&bytes).ok()?).ok()?;
        if meta.guid.is_nil() || self.guids.contains_key(&meta.guid) {
            return None;
        }
        Some(meta)
    }

    fn write_meta(&mut self, path: &AssetPath, guid: Guid, origin: Origin) -> Result<()> {
        if path.is_root() {
            return Ok(());
        }
        let text = toml::to_string(&MetaFile { guid, origin })
            .with_context(|| format!("failed to serialize meta of {path}"))?;
        self.storage.write(&path.sidecar(META_SUFFIX), text.as_bytes())?;
        Ok(())
    }

    fn write_document(storage: &mut S, path: &AssetPath, record: &Record) -> Result<()> {
        let document = NativeDocument {
            type_name: type_of(&record.main).name().to_string(),
            guid: record.guid,
            data: format!("{:#?}", record.main),
            sub_objects: record
                .subs
                .iter()
                .map(|sub| SubObject {
                    type_name: type_of(sub).name().to_string(),
                    data: format!("{sub:#?}"),
                })
                .collect(),
        };
        let text = toml::to_string(&document)
            .with_context(|| format!("failed to serialize {path}"))?;
        storage.write(path, text.as_bytes())?;
        Ok(())
    }

    fn remove(&mut self, path: &AssetPath, to_trash: bool) -> Result<bool> {
        if path.is_root() {
            return Err(AssetError::InvalidOperation(format!(
                "the root folder {path} cannot be removed"
            )));
        }
        let Some(guid) = self.records.get(path).map(|r| r.guid) else {
            return Ok(false);
        };

        let bucket = guid.to_string();
        let sidecar = path.sidecar(META_SUFFIX);
        for p in [path, &sidecar] {
            if !self.storage.exists(p) {
                continue;
            }
            if to_trash {
                self.storage.move_to_trash(p, &bucket)?;
            } else {
                self.storage.rm(p)?;
            }
        }

        self.unregister_tree(path);
        debug!(path = %path, guid = %guid, trash = to_trash, "removed entry");
        Ok(true)
    }
}

impl<S: Storage> Database for AssetDatabase<S> {
    fn project(&self) -> &Project {
        &self.project
    }

    fn exists(&self, path: &AssetPath) -> bool {
        self.records.contains_key(path)
    }

    fn exists_on_disk(&self, path: &AssetPath) -> bool {
        self.storage.exists(path)
    }

    fn is_folder(&self, path: &AssetPath) -> bool {
        self.records
            .get(path)
            .is_some_and(|r| r.kind == Kind::Folder)
    }

    fn contains(&self, obj: &Object) -> bool {
        self.record_of(obj).is_some()
    }

    fn main_type_of(&self, path: &AssetPath) -> Option<AssetType> {
        self.records.get(path).map(|r| type_of(&r.main))
    }

    fn load_main(&self, path: &AssetPath) -> Option<Object> {
        let record = self.records.get(path)?;
        record.loaded.set(true);
        Some(record.main.clone())
    }

    fn load_all(&self, path: &AssetPath) -> Vec<Object> {
        self.records
            .get(path)
            .map(|r| {
                r.loaded.set(true);
                std::iter::once(&r.main).chain(&r.subs).cloned().collect()
            })
            .unwrap_or_default()
    }

    fn path_of(&self, obj: &Object) -> Option<AssetPath> {
        self.record_of(obj).map(|(path, _)| path.clone())
    }

    fn guid_for(&self, path: &AssetPath) -> Option<Guid> {
        self.records.get(path).map(|r| r.guid)
    }

    fn path_for(&self, guid: Guid) -> Option<AssetPath> {
        self.guids.get(&guid).cloned()
    }

    fn uniquify_path(&self, path: &AssetPath) -> AssetPath {
        let taken = |p: &AssetPath| self.exists(p) || self.exists_on_disk(p);
        if path.is_root() || !taken(path) {
            return path.clone();
        }
        (1..)
            .map(|n| path.numbered(n))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| path.clone())
    }

    fn import(&mut self, path: &AssetPath) -> Result<()> {
        if Self::is_meta(path) {
            return Err(AssetError::invalid_path(path.as_str(), "meta files are not assets"));
        }
        if self.records.contains_key(path) {
            trace!(path = %path, "already imported");
            return Ok(());
        }
        if !self.storage.exists(path) {
            return Err(AssetError::NotFound(path.to_string()));
        }
        if self.storage.is_dir(path)? {
            self.create_folders(path)?;
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            self.create_folders(&parent)?;
        }

        let bytes = self.storage.read(path)?;
        let (guid, origin) = match self.read_meta(path) {
            Some(meta) => (meta.guid, meta.origin),
            None => {
                let guid = Guid::new();
                self.write_meta(path, guid, Origin::Foreign)?;
                (guid, Origin::Foreign)
            }
        };

        let record = Record::file(guid, origin, object(RawAsset { bytes }), false);
        self.register(path, record);
        debug!(path = %path, guid = %guid, "imported");
        Ok(())
    }

    fn import_new_object(&mut self, obj: Object, path: &AssetPath, overwrite: bool) -> Result<()> {
        if Self::is_meta(path) || path.is_root() {
            return Err(AssetError::invalid_path(path.as_str(), "not a valid asset file path"));
        }
        if let Some(existing) = self.path_of(&obj) {
            return Err(AssetError::AlreadyAnAsset(existing.to_string()));
        }
        let existing_guid = match self.records.get(path) {
            Some(record) if record.kind == Kind::Folder => {
                return Err(anyhow!("{path} is a folder").into());
            }
            Some(record) => Some(record.guid),
            None => None,
        };
        if !overwrite && self.storage.exists(path) {
            return Err(anyhow!("{path} already exists").into());
        }
        if let Some(parent) = path.parent() {
            self.create_folders(&parent)?;
        }

        let guid = existing_guid.unwrap_or_else(Guid::new);
        let record = Record::file(guid, Origin::Native, obj, true);
        Self::write_document(&mut self.storage, path, &record)?;
        self.write_meta(path, guid, Origin::Native)?;
        self.register(path, record);
        debug!(path = %path, guid = %guid, overwrite, "created native asset");
        Ok(())
    }

    fn add_object_to_asset(&mut self, obj: Object, path: &AssetPath) -> Result<()> {
        if let Some(existing) = self.path_of(&obj) {
            return Err(AssetError::AlreadyAnAsset(existing.to_string()));
        }
        let record = self
            .records
            .get_mut(path)
            .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
        if record.kind == Kind::Folder {
            return Err(AssetError::InvalidOperation(format!(
                "cannot add objects to the folder {path}"
            )));
        }
        record.subs.push(obj);
        if record.writes_document() {
            if let Err(e) = Self::write_document(&mut self.storage, path, record) {
                record.subs.pop();
                return Err(e);
            }
        }
        trace!(path = %path, "added sub object");
        Ok(())
    }

    fn save(&mut self, path: &AssetPath, obj: &Object) -> Result<()> {
        let record = self
            .records
            .get(path)
            .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
        if !record.holds(obj) {
            return Err(AssetError::NotAnAsset(format!(
                "{obj:?} does not belong to {path}"
            )));
        }

        if record.writes_document() {
            Self::write_document(&mut self.storage, path, record)?;
        } else {
            trace!(path = %path, "nothing to write for imported file or folder");
        }
        debug!(path = %path, "saved");
        Ok(())
    }

    fn create_folders(&mut self, path: &AssetPath) -> Result<Guid> {
        let mut current = AssetPath::new(path.root())?;
        let mut guid = self
            .guid_for(&current)
            .ok_or_else(|| AssetError::NotFound(current.to_string()))?;

        for segment in path.segments().skip(1) {
            current = current.join(segment)?;
            match self.records.get(&current) {
                Some(record) if record.kind == Kind::Folder => {
                    guid = record.guid;
                    continue;
                }
                Some(_) => {
                    return Err(anyhow!("{current} exists but is not a folder").into());
                }
                None => {}
            }

            if !self.storage.exists(&current) {
                self.storage.mkdir(&current)?;
            } else if !self.storage.is_dir(&current)? {
                return Err(anyhow!("{current} exists but is not a folder").into());
            }

            guid = match self.read_meta(&current) {
                Some(meta) => meta.guid,
                None => {
                    let guid = Guid::new();
                    self.write_meta(&current, guid, Origin::Native)?;
                    guid
                }
            };
            self.register(&current, Record::folder(guid, &current));
            debug!(path = %current, guid = %guid, "created folder");
        }

        Ok(guid)
    }

    fn delete(&mut self, path: &AssetPath) -> Result<bool> {
        self.remove(path, false)
    }

    fn trash(&mut self, path: &AssetPath) -> Result<bool> {
        self.remove(path, true)
    }

    fn is_main(&self, obj: &Object) -> bool {
        self.records.values().any(|r| same_object(&r.main, obj))
    }

    fn is_sub(&self, obj: &Object) -> bool {
        self.records
            .values()
            .any(|r| r.subs.iter().any(|s| same_object(s, obj)))
    }

    fn is_foreign(&self, obj: &Object) -> bool {
        self.record_of(obj)
            .is_some_and(|(_, r)| r.is_file_from(Origin::Foreign))
    }

    fn is_native(&self, obj: &Object) -> bool {
        self.record_of(obj)
            .is_some_and(|(_, r)| r.is_file_from(Origin::Native))
    }

    fn is_loaded(&self, path: &AssetPath) -> bool {
        self.records.get(path).is_some_and(|r| r.loaded.get())
    }

    fn is_scene(&self, obj: &Object) -> bool {
        let scene_extension = &self.project.config().scene_extension;
        self.record_of(obj).is_some_and(|(path, r)| {
            r.kind == Kind::File
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(scene_extension))
        })
    }
}
