//! Project roots and configuration.
//!
//! A project is a host directory with two logical roots:
//! - `Assets` maps to `<root>/Assets`, the data root;
//! - `Packages` maps to `<root>/Packages`, the packages root.
//!
//! Absolute host paths below either root are turned into project-relative
//! [`AssetPath`]s by [`Project::path`] and mapped back by [`Project::full_path`].

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AssetError, Result, utils};
use crate::path::{AssetPath, Root};

/// How the asset handle removes entries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    #[default]
    Delete,
    Trash,
}

/// Project settings, usually read from a TOML file:
///
/// ```toml
/// root = "/home/me/projects/game"
/// default_extension = "asset"
/// scene_extension = "scene"
/// delete_mode = "trash"
/// trash_folder = "Library/Trash"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub root: PathBuf,
    #[serde(default = "default_extension")]
    pub default_extension: String,
    #[serde(default = "default_scene_extension")]
    pub scene_extension: String,
    #[serde(default)]
    pub delete_mode: DeleteMode,
    #[serde(default = "default_trash_folder")]
    pub trash_folder: PathBuf,
}

fn default_extension() -> String {
    "asset".to_string()
}

fn default_scene_extension() -> String {
    "scene".to_string()
}

fn default_trash_folder() -> PathBuf {
    PathBuf::from("Library/Trash")
}

impl ProjectConfig {
    /// Default settings for the project at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            default_extension: default_extension(),
            scene_extension: default_scene_extension(),
            delete_mode: DeleteMode::default(),
            trash_folder: default_trash_folder(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config = toml::from_str(s).context("failed to parse project config")?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
    }
}

/// A project: the host root directory plus its settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    root: PathBuf,
    data_root: PathBuf,
    packages_root: PathBuf,
    data_prefix: String,
    packages_prefix: String,
    config: ProjectConfig,
}

impl Project {
    /// Creates a project rooted at the absolute host path `root` with default settings.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::from_config(ProjectConfig::new(root))
    }

    /// Creates a project rooted at the current working directory.
    pub fn current() -> Result<Self> {
        Self::new(std::env::current_dir()?)
    }

    pub fn from_config(config: ProjectConfig) -> Result<Self> {
        if config.root.as_os_str().is_empty() {
            return Err(AssetError::invalid_argument("root", "empty"));
        }
        if config.root.is_relative() {
            return Err(AssetError::invalid_argument(
                "root",
                "the project root must be absolute",
            ));
        }
        if utils::is_blank(&config.default_extension) {
            return Err(AssetError::invalid_argument(
                "default_extension",
                "empty or whitespace",
            ));
        }

        let root = utils::normalize(&config.root);
        let data_root = root.join(Root::Assets.name());
        let packages_root = root.join(Root::Packages.name());
        let data_prefix = host_prefix(&data_root);
        let packages_prefix = host_prefix(&packages_root);

        Ok(Self {
            root,
            data_root,
            packages_root,
            data_prefix,
            packages_prefix,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host directory behind the `Assets` root.
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Host directory behind the `Packages` root.
    pub fn packages_root(&self) -> &Path {
        &self.packages_root
    }

    pub fn trash_root(&self) -> PathBuf {
        utils::normalize(self.root.join(&self.config.trash_folder))
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn default_extension(&self) -> &str {
        &self.config.default_extension
    }

    /// Normalizes `raw`, which may be project-relative or an absolute host path
    /// below the data or packages root.
    pub fn path(&self, raw: &str) -> Result<AssetPath> {
        AssetPath::parse(raw, Some(self))
    }

    /// Combines `folder`, `file_name` and `extension` into a path.
    /// `folder` may be an absolute host path below one of the roots.
    pub fn combine(
        &self,
        folder: &str,
        file_name: &str,
        extension: Option<&str>,
    ) -> Result<AssetPath> {
        AssetPath::combine_in(Some(self), folder, file_name, extension)
    }

    /// Returns the absolute host path of `path`.
    pub fn full_path(&self, path: &AssetPath) -> PathBuf {
        let mut full = match path.root_kind() {
            Root::Assets => self.data_root.clone(),
            Root::Packages => self.packages_root.clone(),
        };
        for segment in path.segments().skip(1) {
            full.push(segment);
        }
        full
    }

    /// Maps an absolute, forward-slash host path onto its logical root.
    /// Returns `None` for paths outside both roots.
    pub(crate) fn relativize(&self, absolute: &str) -> Option<String> {
        if let Some(rest) = utils::strip_dir_prefix(absolute, &self.data_prefix) {
            return Some(format!("{}{}", Root::Assets.name(), rest));
        }
        if let Some(rest) = utils::strip_dir_prefix(absolute, &self.packages_prefix) {
            return Some(format!("{}{}", Root::Packages.name(), rest));
        }
        None
    }
}

fn host_prefix(path: &Path) -> String {
    utils::to_forward_slashes(&path.to_string_lossy())
}
