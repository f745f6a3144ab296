//! Canonical project-relative asset paths.
//!
//! Grammar: `Root ["/" Segment]*`, where `Root` is `Assets` or `Packages`
//! (matched case-insensitively, stored as given) and segments are non-empty
//! and free of separators.
//!
//! ### Normalization
//! 1. Empty and whitespace-only input is rejected.
//! 2. Backslashes become forward slashes.
//! 3. Absolute host paths below the project's data or packages root are
//!    rewritten onto `Assets` or `Packages` (see [`Project::path`]). Any
//!    other absolute path escapes the project and is rejected.
//! 4. Leading, trailing and repeated separators are dropped, `.` segments are
//!    skipped and `..` segments pop the previous one. A `..` never pops the
//!    root segment, so `Assets/../Packages/x` is rejected rather than moved
//!    to the other root.
//! 5. The first segment must name a root.
//!
//! Equality ignores the case of the root segment only.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::core::{AssetError, Database, Guid, Object, Result, utils};
use crate::project::Project;

/// The two logical roots of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Root {
    Assets,
    Packages,
}

impl Root {
    pub fn name(&self) -> &'static str {
        match self {
            Root::Assets => "Assets",
            Root::Packages => "Packages",
        }
    }

    /// Recognizes a root segment, ignoring case.
    pub fn from_segment(segment: &str) -> Option<Root> {
        [Root::Assets, Root::Packages]
            .into_iter()
            .find(|root| root.name().eq_ignore_ascii_case(segment))
    }
}

/// A normalized, forward-slash separated path relative to the project root.
///
/// ### Example:
/// ```
/// use assetdb_kit::AssetPath;
///
/// let path = AssetPath::new("\\Assets\\folder/").unwrap();
/// assert_eq!(path, "Assets/folder");
///
/// let file = AssetPath::combine("Assets/folder", "file name", None).unwrap();
/// assert_eq!(file, "Assets/folder/file name.asset");
/// assert_eq!(file.parent().unwrap(), path);
/// ```
#[derive(Clone)]
pub struct AssetPath {
    relative: String,
    root: Root,
    root_len: usize,
}

// construction

impl AssetPath {
    /// Extension appended by [`AssetPath::combine`] when the file name has none.
    pub const DEFAULT_EXTENSION: &'static str = "asset";

    /// Normalizes a project-relative path. A leading separator is tolerated.
    /// Absolute host paths need a [`Project`], see [`Project::path`].
    pub fn new(raw: &str) -> Result<Self> {
        Self::parse(raw, None)
    }

    /// Joins `folder` and `file_name` and applies `extension`.
    ///
    /// The extension gets a leading dot if it has none. Without an extension the
    /// file name is kept if it already has one, otherwise
    /// [`DEFAULT_EXTENSION`](Self::DEFAULT_EXTENSION) is appended.
    pub fn combine(folder: &str, file_name: &str, extension: Option<&str>) -> Result<Self> {
        Self::combine_in(None, folder, file_name, extension)
    }

    pub(crate) fn parse(raw: &str, project: Option<&Project>) -> Result<Self> {
        if raw.is_empty() {
            return Err(AssetError::invalid_argument("path", "empty"));
        }
        if utils::is_blank(raw) {
            return Err(AssetError::invalid_argument("path", "whitespace only"));
        }

        let slashed = utils::to_forward_slashes(raw);
        let relative = match project.and_then(|p| p.relativize(&slashed)) {
            Some(relative) => relative,
            None if utils::has_drive_letter(&slashed) => {
                return Err(AssetError::invalid_path(raw, "outside of the project"));
            }
            None => slashed,
        };

        let segments = utils::normalize_segments(&relative)
            .ok_or_else(|| AssetError::invalid_path(raw, "climbs above its root"))?;
        let first = segments
            .first()
            .ok_or_else(|| AssetError::invalid_path(raw, "no path segments"))?;
        let root = Root::from_segment(first).ok_or_else(|| {
            AssetError::invalid_path(raw, "does not start with 'Assets' or 'Packages'")
        })?;

        Ok(Self {
            root_len: first.len(),
            relative: segments.join("/"),
            root,
        })
    }

    pub(crate) fn combine_in(
        project: Option<&Project>,
        folder: &str,
        file_name: &str,
        extension: Option<&str>,
    ) -> Result<Self> {
        if utils::is_blank(file_name) {
            return Err(AssetError::invalid_argument("file_name", "empty or whitespace"));
        }
        if let Some(ext) = extension {
            if utils::is_blank(ext.trim_start_matches('.')) {
                return Err(AssetError::invalid_argument("extension", "empty or whitespace"));
            }
        }
        let folder = Self::parse(folder, project)?;
        if utils::has_separator(file_name) {
            return Err(AssetError::invalid_path(
                file_name,
                "file name must not contain path separators",
            ));
        }
        if let Some(ext) = extension.filter(|ext| utils::has_separator(ext)) {
            return Err(AssetError::invalid_path(
                ext,
                "extension must not contain path separators",
            ));
        }

        let default = project.map_or(Self::DEFAULT_EXTENSION, |p| p.default_extension());
        let name = utils::with_extension(file_name, extension, default);
        Ok(folder.child(&name))
    }

    fn child(&self, name: &str) -> Self {
        Self {
            relative: format!("{}/{}", self.relative, name),
            root: self.root,
            root_len: self.root_len,
        }
    }
}

// pure queries

impl AssetPath {
    pub fn as_str(&self) -> &str {
        &self.relative
    }

    /// The root segment as given, e.g. `"assets"`.
    pub fn root(&self) -> &str {
        &self.relative[..self.root_len]
    }

    pub fn root_kind(&self) -> Root {
        self.root
    }

    /// Returns `true` if the path is just `Assets` or `Packages`.
    pub fn is_root(&self) -> bool {
        self.relative.len() == self.root_len
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.relative.split('/')
    }

    /// The last segment, `None` for a root.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.relative.rsplit('/').next()
    }

    /// The file name without its extension.
    pub fn file_stem(&self) -> Option<&str> {
        let name = self.file_name()?;
        Some(match split_extension(name) {
            Some((stem, _)) => stem,
            None => name,
        })
    }

    pub fn extension(&self) -> Option<&str> {
        split_extension(self.file_name()?).map(|(_, ext)| ext)
    }

    /// The enclosing folder, `None` for a root. Does not consult any database.
    pub fn parent(&self) -> Option<AssetPath> {
        if self.is_root() {
            return None;
        }
        let end = self.relative.rfind('/')?;
        Some(Self {
            relative: self.relative[..end].to_string(),
            root: self.root,
            root_len: self.root_len,
        })
    }

    /// Appends a relative sub path, normalizing it like [`AssetPath::new`].
    pub fn join(&self, sub_path: &str) -> Result<AssetPath> {
        Self::new(&format!("{}/{}", self.relative, utils::to_forward_slashes(sub_path)))
    }

    /// Returns `true` if `self` is `ancestor` or lies below it.
    pub fn is_within(&self, ancestor: &AssetPath) -> bool {
        if self.root != ancestor.root {
            return false;
        }
        let rest = &self.relative[self.root_len..];
        let ancestor_rest = &ancestor.relative[ancestor.root_len..];
        utils::strip_dir_prefix(rest, ancestor_rest).is_some() || ancestor_rest.is_empty()
    }

    /// The same path with ` n` appended to the file stem.
    pub(crate) fn numbered(&self, n: u32) -> AssetPath {
        let Some(parent) = self.parent() else {
            return self.clone();
        };
        let name = match (self.file_stem(), self.extension()) {
            (Some(stem), Some(ext)) => format!("{stem} {n}.{ext}"),
            _ => format!("{} {n}", self.file_name().unwrap_or_default()),
        };
        parent.child(&name)
    }

    /// The path of the sidecar file next to this entry.
    pub(crate) fn sidecar(&self, suffix: &str) -> AssetPath {
        Self {
            relative: format!("{}{}", self.relative, suffix),
            root: self.root,
            root_len: self.root_len,
        }
    }

    fn key(&self) -> (Root, &str) {
        (self.root, &self.relative[self.root_len..])
    }
}

fn split_extension(name: &str) -> Option<(&str, &str)> {
    match name.rfind('.') {
        Some(i) if i > 0 && i + 1 < name.len() => Some((&name[..i], &name[i + 1..])),
        _ => None,
    }
}

// database queries

impl AssetPath {
    /// Resolves the path of the entry with the given guid.
    pub fn from_guid<D: Database + ?Sized>(db: &D, guid: Guid) -> Result<AssetPath> {
        if guid.is_nil() {
            return Err(AssetError::ArgumentNull("guid"));
        }
        db.path_for(guid)
            .ok_or_else(|| AssetError::NotFound(format!("guid {guid}")))
    }

    /// Resolves the path of the entry that holds `obj`.
    pub fn from_object<D: Database + ?Sized>(db: &D, obj: &Object) -> Result<AssetPath> {
        db.path_of(obj)
            .ok_or_else(|| AssetError::NotAnAsset(format!("{obj:?}")))
    }

    /// Returns `true` if the database has an entry at this path.
    pub fn exists<D: Database + ?Sized>(&self, db: &D) -> bool {
        db.exists(self)
    }

    /// Returns `true` if a file or folder exists in the database's storage.
    pub fn exists_on_disk<D: Database + ?Sized>(&self, db: &D) -> bool {
        db.exists_on_disk(self)
    }

    /// The folder of the entry: the path itself for folders, the parent for files.
    pub fn folder_path<D: Database + ?Sized>(&self, db: &D) -> Result<AssetPath> {
        if !db.exists(self) {
            return Err(AssetError::NotFound(self.relative.clone()));
        }
        if db.is_folder(self) {
            return Ok(self.clone());
        }
        self.parent()
            .ok_or_else(|| AssetError::NotFound(self.relative.clone()))
    }

    pub fn guid<D: Database + ?Sized>(&self, db: &D) -> Result<Guid> {
        db.guid_for(self)
            .ok_or_else(|| AssetError::NotFound(self.relative.clone()))
    }

    pub fn uniquify<D: Database + ?Sized>(&self, db: &D) -> AssetPath {
        db.uniquify_path(self)
    }

    pub fn create_folders<D: Database + ?Sized>(&self, db: &mut D) -> Result<Guid> {
        db.create_folders(self)
    }
}

// conversions and comparisons

impl Default for AssetPath {
    /// The `Assets` root.
    fn default() -> Self {
        Self {
            relative: Root::Assets.name().to_string(),
            root: Root::Assets,
            root_len: Root::Assets.name().len(),
        }
    }
}

impl FromStr for AssetPath {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for AssetPath {
    type Error = AssetError;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for AssetPath {
    type Error = AssetError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(&s)
    }
}

impl AsRef<str> for AssetPath {
    fn as_ref(&self) -> &str {
        &self.relative
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative)
    }
}

impl fmt::Debug for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.relative)
    }
}

impl PartialEq for AssetPath {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for AssetPath {}

impl Hash for AssetPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for AssetPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AssetPath {
    fn cmp(&self, other: &Self) -> Ordering {
        let root_order = |root: Root| root as u8;
        let (root, rest) = self.key();
        let (other_root, other_rest) = other.key();
        root_order(root)
            .cmp(&root_order(other_root))
            .then_with(|| rest.cmp(other_rest))
    }
}

/// Compares the stored string exactly, root casing included.
impl PartialEq<str> for AssetPath {
    fn eq(&self, other: &str) -> bool {
        self.relative == other
    }
}

impl PartialEq<&str> for AssetPath {
    fn eq(&self, other: &&str) -> bool {
        self.relative == *other
    }
}

impl PartialEq<AssetPath> for &str {
    fn eq(&self, other: &AssetPath) -> bool {
        *self == other.relative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> AssetPath {
        AssetPath::new(raw).unwrap()
    }

    mod construction {
        use super::*;

        #[test]
        fn test_default_is_assets() {
            assert_eq!(AssetPath::default(), "Assets");
            assert_eq!(AssetPath::default().to_string(), "Assets");
        }

        #[test]
        fn test_empty_and_whitespace_rejected() {
            assert!(matches!(AssetPath::new(""), Err(AssetError::ArgumentInvalid { .. })));
            assert!(matches!(AssetPath::new(" "), Err(AssetError::ArgumentInvalid { .. })));
            assert!(matches!(AssetPath::new("\t\n"), Err(AssetError::ArgumentInvalid { .. })));
        }

        #[test]
        fn test_not_starting_with_root_rejected() {
            for raw in ["AssetsData", "SomeFolder/", "Some\\Folder\\", "/", "Assets/.."] {
                assert!(
                    matches!(AssetPath::new(raw), Err(AssetError::InvalidPath { .. })),
                    "{raw}"
                );
            }
        }

        #[test]
        fn test_relative_assets_paths() {
            let cases = [
                ("Assets", "Assets"),
                ("assets", "assets"),
                ("Assets/", "Assets"),
                ("Assets\\", "Assets"),
                ("/Assets/folder", "Assets/folder"),
                ("\\Assets\\folder", "Assets/folder"),
                ("/Assets/folder\\", "Assets/folder"),
                ("\\Assets\\folder/", "Assets/folder"),
                ("Assets//a/./b/../c", "Assets/a/c"),
            ];
            for (raw, expected) in cases {
                assert_eq!(path(raw).as_str(), expected, "{raw}");
            }
        }

        #[test]
        fn test_relative_packages_paths() {
            let raw = "Packages/com.example.assetdb/Tests/Editor/Example.Tests.asmdef";
            assert_eq!(path(raw), raw);
            assert_eq!(path(raw).root_kind(), Root::Packages);
        }

        #[test]
        fn test_separator_style_does_not_matter() {
            let forward = path("Assets/a/b/c.txt");
            assert_eq!(path("Assets\\a\\b\\c.txt").as_str(), forward.as_str());
            assert_eq!(path("Assets\\a/b\\c.txt/").as_str(), forward.as_str());
        }

        #[test]
        fn test_foreign_absolute_paths_rejected() {
            let raws = [
                "C:\\Users\\Someone\\Projects\\First Project\\Assets\\folder",
                "\\Users\\Someone\\Projects\\First Project\\Assets\\folder",
            ];
            for raw in raws {
                assert!(
                    matches!(AssetPath::new(raw), Err(AssetError::InvalidPath { .. })),
                    "{raw}"
                );
            }
        }

        #[test]
        fn test_parse_traits() {
            let parsed: AssetPath = "Assets\\x".parse().unwrap();
            assert_eq!(parsed, "Assets/x");
            assert!(AssetPath::try_from("nope").is_err());
            assert_eq!(AssetPath::try_from(String::from("Packages/")).unwrap(), "Packages");
        }
    }

    mod combine {
        use super::*;

        #[test]
        fn test_combine_path_and_file_name() {
            let cases = [
                ("Assets", "Assets/file name.asset"),
                ("assets", "assets/file name.asset"),
                ("Assets/", "Assets/file name.asset"),
                ("Assets\\", "Assets/file name.asset"),
                ("/Assets/folder", "Assets/folder/file name.asset"),
                ("\\Assets\\folder", "Assets/folder/file name.asset"),
                ("/Assets/folder\\", "Assets/folder/file name.asset"),
                ("\\Assets\\folder/", "Assets/folder/file name.asset"),
            ];
            for (folder, expected) in cases {
                let combined = AssetPath::combine(folder, "file name", None).unwrap();
                assert_eq!(combined, expected, "{folder}");
            }
        }

        #[test]
        fn test_combine_with_extension() {
            let combined = AssetPath::combine("\\Assets\\folder/", "fn", Some("text")).unwrap();
            assert_eq!(combined, "Assets/folder/fn.text");
            for ext in ["ext", ".ext"] {
                assert_eq!(AssetPath::combine("Assets", "FN", Some(ext)).unwrap(), "Assets/FN.ext");
            }
        }

        #[test]
        fn test_combine_keeps_existing_extension() {
            assert_eq!(AssetPath::combine("Assets", "image.png", None).unwrap(), "Assets/image.png");
        }

        #[test]
        fn test_combine_file_name_with_separators() {
            for name in ["/filename", "filename/", "\\filename\\", "file/name", "file\\name"] {
                assert!(
                    matches!(
                        AssetPath::combine("Assets", name, None),
                        Err(AssetError::InvalidPath { .. })
                    ),
                    "{name}"
                );
            }
        }

        #[test]
        fn test_combine_extension_with_separators() {
            for ext in ["x\\y", "x/y", "/ext", ".ext\\"] {
                assert!(
                    matches!(
                        AssetPath::combine("Assets", "fn", Some(ext)),
                        Err(AssetError::InvalidPath { .. })
                    ),
                    "{ext}"
                );
            }
        }

        #[test]
        fn test_combine_whitespace_arguments() {
            let cases = [
                (" ", "file name", Some("extension")),
                ("Assets", " ", Some("extension")),
                ("Assets", "file name", Some(" ")),
                ("Assets", "file name", Some(".")),
            ];
            for (folder, name, ext) in cases {
                assert!(
                    matches!(
                        AssetPath::combine(folder, name, ext),
                        Err(AssetError::ArgumentInvalid { .. })
                    ),
                    "{folder:?} {name:?} {ext:?}"
                );
            }
        }

        #[test]
        fn test_combine_then_parent_is_normalized_folder() {
            for folder in ["Assets", "\\Assets\\folder/", "Packages/p/q/"] {
                let combined = AssetPath::combine(folder, "n", Some("e")).unwrap();
                assert_eq!(combined.parent().unwrap(), path(folder));
            }
        }
    }

    mod queries {
        use super::*;

        #[test]
        fn test_root_only() {
            let root = path("Assets");
            assert!(root.is_root());
            assert_eq!(root, "Assets");
            assert_eq!(root.file_name(), None);
            assert_eq!(root.parent(), None);
        }

        #[test]
        fn test_root_preserves_case() {
            assert_eq!(path("assets").root(), "assets");
            assert_eq!(path("PACKAGES/x").root(), "PACKAGES");
        }

        #[test]
        fn test_equality_ignores_root_case_only() {
            assert_eq!(path("assets/x"), path("Assets/x"));
            assert_ne!(path("Assets/X"), path("Assets/x"));
            assert_ne!(path("Assets/x"), path("Packages/x"));
            assert_ne!(path("assets"), "Assets");
        }

        #[test]
        fn test_file_parts() {
            let p = path("Assets/dir/name.tar.gz");
            assert_eq!(p.file_name(), Some("name.tar.gz"));
            assert_eq!(p.file_stem(), Some("name.tar"));
            assert_eq!(p.extension(), Some("gz"));

            let folder = path("Assets/dir");
            assert_eq!(folder.file_stem(), Some("dir"));
            assert_eq!(folder.extension(), None);
        }

        #[test]
        fn test_join() {
            assert_eq!(path("Assets/a").join("b\\c.txt").unwrap(), "Assets/a/b/c.txt");
            assert!(path("Assets").join("..").is_err());
            assert!(path("Assets/a").join("../../Packages/x").is_err());
            assert!(matches!(
                AssetPath::new("Assets/../Packages/x"),
                Err(AssetError::InvalidPath { .. })
            ));
        }

        #[test]
        fn test_is_within() {
            let root = path("Assets");
            let dir = path("Assets/dir");
            assert!(dir.is_within(&root));
            assert!(dir.is_within(&dir));
            assert!(path("assets/dir/x").is_within(&dir));
            assert!(!path("Assets/directory").is_within(&dir));
            assert!(!path("Packages/dir").is_within(&root));
        }

        #[test]
        fn test_numbered() {
            assert_eq!(path("Assets/x.asset").numbered(1), "Assets/x 1.asset");
            assert_eq!(path("Assets/folder").numbered(2), "Assets/folder 2");
            assert_eq!(path("Assets").numbered(1), "Assets");
        }
    }

    mod project {
        use super::*;

        fn project() -> Project {
            Project::new("/work/game").unwrap()
        }

        #[test]
        fn test_absolute_data_path_made_relative() {
            let p = project().path("/work/game/Assets/sub/FN.test").unwrap();
            assert_eq!(p, "Assets/sub/FN.test");
            assert_eq!(p.as_str(), path("Assets/sub/FN.test").as_str());
        }

        #[test]
        fn test_absolute_packages_path_made_relative() {
            let p = project().path("/work/game/Packages/com.example/package.json").unwrap();
            assert_eq!(p, "Packages/com.example/package.json");
        }

        #[test]
        fn test_absolute_path_cannot_cross_roots() {
            assert!(matches!(
                project().path("/work/game/Assets/../Packages/x"),
                Err(AssetError::InvalidPath { .. })
            ));
        }

        #[test]
        fn test_full_path_round_trip_with_backslashes() {
            let project = project();
            let full = "/work/game/Assets/sub/FN.test";
            let p = project.path(&full.replace('/', "\\")).unwrap();
            assert_eq!(project.full_path(&p).to_string_lossy(), full);
        }

        #[test]
        fn test_combine_full_path_made_relative() {
            let p = project().combine("/work/game/Assets", "FN", Some(".test")).unwrap();
            assert_eq!(p, "Assets/FN.test");
        }

        #[test]
        fn test_other_project_rejected() {
            let result = project().path("/work/other/Assets/folder");
            assert!(matches!(result, Err(AssetError::InvalidPath { .. })));
        }

        #[test]
        fn test_default_extension_from_config() {
            let mut config = crate::ProjectConfig::new("/work/game");
            config.default_extension = "mat".into();
            let project = Project::from_config(config).unwrap();
            assert_eq!(project.combine("Assets", "red", None).unwrap(), "Assets/red.mat");
        }
    }
}
