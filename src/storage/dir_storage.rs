//! Storage that maps asset paths onto a real project directory on the host.
//!
//! `Assets/...` lives below [`Project::data_root`], `Packages/...` below
//! [`Project::packages_root`] and trashed entries below [`Project::trash_root`].
//! Every artifact created through the storage is remembered so it can be
//! removed again on drop when auto-clean is enabled.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::core::utils;
use crate::storage::Storage;
use crate::{AssetPath, Project};

/// Storage backed by the project directory on the host.
///
/// ### Usage notes:
/// - Symlinks are not followed; `rm()` removes the link, not the target.
/// - Permissions are not adjusted; the project root must be writable.
/// - Auto-clean is off by default, see [`DirStorage::set_auto_clean`].
pub struct DirStorage {
    project: Project,
    created: BTreeSet<PathBuf>,         // host paths
    created_root_parents: Vec<PathBuf>, // host paths
    is_auto_clean: bool,
}

impl DirStorage {
    /// Opens the project directory, creating the root and its `Assets` and
    /// `Packages` folders if they are missing.
    pub fn new(project: Project) -> Result<Self> {
        let root = project.root().to_path_buf();
        if root.exists() && !root.is_dir() {
            return Err(anyhow!("{:?} is not a directory", root));
        }

        let mut created_root_parents = Vec::new();
        if !std::fs::exists(&root)? {
            created_root_parents.extend(Self::mkdir_all(&root)?);
        }

        if !Self::check_permissions(&root) {
            return Err(anyhow!("Access denied: {:?}", root));
        }

        let mut created = BTreeSet::new();
        for dir in [project.data_root(), project.packages_root()] {
            created.extend(Self::mkdir_all(dir)?);
        }

        Ok(Self {
            project,
            created,
            created_root_parents,
            is_auto_clean: false,
        })
    }

    /// If auto-clean is on, all artifacts created through this storage are
    /// removed on drop.
    pub fn set_auto_clean(&mut self, clean: bool) {
        self.is_auto_clean = clean;
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Returns the host path of `path`.
    pub fn to_host(&self, path: &AssetPath) -> PathBuf {
        self.project.full_path(path)
    }

    /// Make directories recursively.
    /// * `path` is an absolute host path.
    /// Returns vector of created directories.
    fn mkdir_all<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
        let host_path = path.as_ref().to_path_buf();

        // Looking for the first existing parent
        let mut existed_part = host_path.clone();
        while let Some(parent) = existed_part.parent() {
            let parent_buf = parent.to_path_buf();
            if std::fs::exists(parent)? {
                existed_part = parent_buf;
                break;
            }
            existed_part = parent_buf;
        }

        // Create from the closest existing parent to the target path
        let need_to_create: Vec<_> = host_path
            .strip_prefix(&existed_part)?
            .components()
            .collect();

        let mut created = Vec::new();
        let mut built = existed_part;
        for component in need_to_create {
            built.push(component);
            if !std::fs::exists(&built)? {
                std::fs::create_dir(&built)
                    .with_context(|| format!("failed to create {}", built.display()))?;
                created.push(built.clone());
            } else if !built.is_dir() {
                return Err(anyhow!("{} exists but is not a directory", built.display()));
            }
        }

        Ok(created)
    }

    fn check_permissions<P: AsRef<Path>>(path: P) -> bool {
        let filename = path.as_ref().join(".access");
        if std::fs::write(&filename, b"check").is_err() {
            return false;
        }
        std::fs::remove_file(filename).is_ok()
    }

    fn forget_below(&mut self, host: &Path) {
        self.created.retain(|p| !p.starts_with(host));
    }
}

impl Storage for DirStorage {
    fn exists(&self, path: &AssetPath) -> bool {
        self.to_host(path).exists()
    }

    fn is_dir(&self, path: &AssetPath) -> Result<bool> {
        let host = self.to_host(path);
        if !host.exists() {
            return Err(anyhow!("{path} does not exist"));
        }
        Ok(host.is_dir())
    }

    fn mkdir(&mut self, path: &AssetPath) -> Result<()> {
        let created = Self::mkdir_all(self.to_host(path))?;
        self.created.extend(created);
        Ok(())
    }

    fn read(&self, path: &AssetPath) -> Result<Vec<u8>> {
        let host = self.to_host(path);
        if host.is_dir() {
            return Err(anyhow!("{path} is a directory"));
        }
        std::fs::read(&host).with_context(|| format!("failed to read {path}"))
    }

    fn write(&mut self, path: &AssetPath, content: &[u8]) -> Result<()> {
        let host = self.to_host(path);
        if host.is_dir() {
            return Err(anyhow!("{path} is a directory"));
        }
        if let Some(parent) = path.parent() {
            self.mkdir(&parent)?;
        }
        let is_new = !host.exists();
        std::fs::write(&host, content).with_context(|| format!("failed to write {path}"))?;
        if is_new {
            self.created.insert(host);
        }
        Ok(())
    }

    fn rm(&mut self, path: &AssetPath) -> Result<()> {
        if path.is_root() {
            return Err(anyhow!("invalid path: the root {path} cannot be removed"));
        }
        let host = self.to_host(path);
        if !host.exists() {
            return Err(anyhow!("{path} does not exist"));
        }
        utils::rm_on_host(&host).with_context(|| format!("failed to remove {path}"))?;
        self.forget_below(&host);
        Ok(())
    }

    fn move_to_trash(&mut self, path: &AssetPath, bucket: &str) -> Result<()> {
        if path.is_root() {
            return Err(anyhow!("invalid path: the root {path} cannot be trashed"));
        }
        let host = self.to_host(path);
        if !host.exists() {
            return Err(anyhow!("{path} does not exist"));
        }
        let file_name = host
            .file_name()
            .ok_or_else(|| anyhow!("{path} has no file name"))?
            .to_os_string();

        let bucket_dir = self.project.trash_root().join(bucket);
        self.created.extend(Self::mkdir_all(&bucket_dir)?);
        let target = bucket_dir.join(file_name);
        std::fs::rename(&host, &target)
            .with_context(|| format!("failed to move {path} to {}", target.display()))?;

        self.forget_below(&host);
        self.created.insert(target);
        Ok(())
    }
}

impl Drop for DirStorage {
    fn drop(&mut self) {
        if !self.is_auto_clean {
            return;
        }

        for host in self.created.iter().rev() {
            if host.exists() {
                if let Err(e) = utils::rm_on_host(host) {
                    tracing::warn!("Unable to remove {}: {}", host.display(), e);
                }
            }
        }
        self.created.clear();

        let errors: Vec<_> = self
            .created_root_parents
            .iter()
            .rev()
            .filter_map(|p| utils::rm_on_host(p).err())
            .collect();
        if !errors.is_empty() {
            tracing::warn!("Failed to remove parents: {:?}", errors);
        }
        self.created_root_parents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn path(raw: &str) -> AssetPath {
        AssetPath::new(raw).unwrap()
    }

    mod creations {
        use super::*;

        #[test]
        fn test_new_creates_roots() {
            let temp_dir = setup_test_env();
            let root = temp_dir.path().join("project");

            let storage = DirStorage::new(Project::new(&root).unwrap()).unwrap();

            assert!(root.join("Assets").is_dir());
            assert!(root.join("Packages").is_dir());
            assert!(!storage.created_root_parents.is_empty());
            assert!(!storage.is_auto_clean);
        }

        #[test]
        fn test_new_root_is_file() {
            let temp_dir = setup_test_env();
            let file_path = temp_dir.path().join("file.txt");
            std::fs::write(&file_path, "content").unwrap();

            let result = DirStorage::new(Project::new(&file_path).unwrap());
            assert!(result.is_err());
        }

        #[test]
        fn test_new_permission_denied() {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;

                let temp_dir = setup_test_env();
                let protected = temp_dir.path().join("protected");
                let protected_root = protected.join("root");
                std::fs::create_dir_all(&protected_root).unwrap();
                std::fs::set_permissions(&protected, PermissionsExt::from_mode(0o000)).unwrap();

                let bypassed = std::fs::read_dir(&protected).is_ok(); // running as root
                let result = DirStorage::new(Project::new(&protected_root).unwrap());
                std::fs::set_permissions(&protected, PermissionsExt::from_mode(0o755)).unwrap();

                if !bypassed {
                    assert!(result.is_err());
                }
            }
        }
    }

    mod files {
        use super::*;

        #[test]
        fn test_write_read_creates_parents() {
            let (_temp_dir, mut storage) = setup_storage();

            storage.write(&path("Assets/docs/note.txt"), b"Hello").unwrap();

            let host = storage.project().data_root().join("docs/note.txt");
            assert!(host.is_file());
            assert!(storage.is_dir(&path("Assets/docs")).unwrap());
            assert_eq!(storage.read(&path("Assets/docs/note.txt")).unwrap(), b"Hello");
        }

        #[test]
        fn test_root_case_maps_to_canonical_folder() {
            let (_temp_dir, mut storage) = setup_storage();

            storage.write(&path("assets/x.txt"), b"x").unwrap();

            assert!(storage.project().data_root().join("x.txt").is_file());
            assert!(storage.exists(&path("Assets/x.txt")));
        }

        #[test]
        fn test_read_directory_fails() {
            let (_temp_dir, storage) = setup_storage();
            assert!(storage.read(&path("Assets")).is_err());
        }

        #[test]
        fn test_rm() {
            let (_temp_dir, mut storage) = setup_storage();
            storage.write(&path("Assets/dir/a.txt"), b"a").unwrap();

            storage.rm(&path("Assets/dir")).unwrap();

            assert!(!storage.exists(&path("Assets/dir")));
            assert!(storage.rm(&path("Assets/dir")).is_err());
            assert!(storage.rm(&path("Assets")).is_err());
        }

        #[test]
        fn test_move_to_trash() {
            let (_temp_dir, mut storage) = setup_storage();
            storage.write(&path("Assets/x.asset"), b"x").unwrap();

            storage.move_to_trash(&path("Assets/x.asset"), "0001").unwrap();

            assert!(!storage.exists(&path("Assets/x.asset")));
            let trashed = storage.project().trash_root().join("0001").join("x.asset");
            assert_eq!(std::fs::read(trashed).unwrap(), b"x");
        }
    }

    mod cleanup {
        use super::*;

        #[test]
        fn test_auto_clean_removes_created() {
            let temp_dir = setup_test_env();
            let root = temp_dir.path().join("nested/project");
            {
                let mut storage = DirStorage::new(Project::new(&root).unwrap()).unwrap();
                storage.set_auto_clean(true);
                storage.write(&path("Assets/a/b.txt"), b"b").unwrap();
            }
            assert!(!root.exists());
            assert!(!temp_dir.path().join("nested").exists());
        }

        #[test]
        fn test_no_auto_clean_keeps_files() {
            let temp_dir = setup_test_env();
            let root = temp_dir.path().join("project");
            {
                let mut storage = DirStorage::new(Project::new(&root).unwrap()).unwrap();
                storage.write(&path("Assets/a.txt"), b"a").unwrap();
            }
            assert!(root.join("Assets/a.txt").is_file());
        }

        #[test]
        fn test_auto_clean_keeps_foreign_files() {
            let temp_dir = setup_test_env();
            let root = temp_dir.path().to_path_buf();
            std::fs::create_dir_all(root.join("Assets")).unwrap();
            std::fs::write(root.join("Assets/keep.txt"), b"keep").unwrap();
            {
                let mut storage = DirStorage::new(Project::new(&root).unwrap()).unwrap();
                storage.set_auto_clean(true);
                storage.write(&path("Assets/temp.txt"), b"t").unwrap();
            }
            assert!(root.join("Assets/keep.txt").is_file());
            assert!(!root.join("Assets/temp.txt").exists());
        }
    }

    fn setup_storage() -> (TempDir, DirStorage) {
        let temp_dir = setup_test_env();
        let storage = DirStorage::new(Project::new(temp_dir.path()).unwrap()).unwrap();
        (temp_dir, storage)
    }

    // Helper function: Creates a temporary directory for tests
    fn setup_test_env() -> TempDir {
        TempDir::new("dirstorage_test").unwrap()
    }
}
