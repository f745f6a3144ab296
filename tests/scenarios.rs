use assetdb_kit::{
    Asset, AssetError, AssetPath, Database, DirDatabase, MapDatabase, Project, object,
};
use tempdir::TempDir;

#[derive(Debug)]
struct Material {
    shininess: f32,
}

fn path(raw: &str) -> AssetPath {
    AssetPath::new(raw).unwrap()
}

fn with_databases(test: impl Fn(&mut dyn Database)) {
    let mut map_db = MapDatabase::new(Project::new("/work/game").unwrap()).unwrap();
    test(&mut map_db);

    let temp_dir = TempDir::new("scenarios").unwrap();
    let mut dir_db = DirDatabase::open(Project::new(temp_dir.path()).unwrap()).unwrap();
    test(&mut dir_db);
}

mod paths {
    use super::*;

    #[test]
    fn test_separator_styles_agree() {
        let expected = path("Assets/folder");
        for raw in [
            "\\Assets\\folder/",
            "Assets/folder",
            "Assets\\folder",
            "Assets/folder/",
            "Assets\\folder\\",
        ] {
            assert_eq!(path(raw), expected, "{raw}");
        }
        assert_eq!(path("\\Assets\\folder/").as_str(), "Assets/folder");
    }

    #[test]
    fn test_absolute_matches_relative() {
        let project = Project::new("/work/game").unwrap();
        assert_eq!(
            project.path("/work/game/Assets/a/b.asset").unwrap(),
            project.path("Assets/a/b.asset").unwrap()
        );
        assert_eq!(
            project.path("/work/game/Packages/p/x.asset").unwrap(),
            project.path("Packages/p/x.asset").unwrap()
        );
    }

    #[test]
    fn test_root_only_path() {
        with_databases(|db| {
            let root = path("Assets");
            assert_eq!(root, "Assets");
            assert_eq!(root.to_string(), "Assets");
            assert_eq!(root.folder_path(db).unwrap(), root);
        });
    }

    #[test]
    fn test_combine_then_folder_path() {
        with_databases(|db| {
            let file = AssetPath::combine("Assets\\materials/", "red", Some("asset")).unwrap();
            assert_eq!(file, "Assets/materials/red.asset");

            Asset::create(db, object(Material { shininess: 1.0 }), &file, false).unwrap();

            assert_eq!(file.folder_path(db).unwrap(), path("Assets/materials"));
        });
    }
}

mod uniquify {
    use super::*;

    #[test]
    fn test_unique_path_unchanged() {
        with_databases(|db| {
            let p = path("Assets/fresh.asset");
            assert_eq!(p.uniquify(db), p);
        });
    }

    #[test]
    fn test_colliding_path_never_collides() {
        with_databases(|db| {
            let p = path("Assets/x.asset");
            for shininess in [1.0, 2.0, 3.0] {
                let unique = p.uniquify(db);
                assert!(!unique.exists(db) && !unique.exists_on_disk(db));
                assert_eq!(unique.uniquify(db), unique);
                Asset::create(db, object(Material { shininess }), &unique, false).unwrap();
            }
            assert!(path("Assets/x 2.asset").exists(db));
            assert_eq!(p.uniquify(db), "Assets/x 3.asset");
        });
    }
}

mod handles {
    use super::*;

    #[test]
    fn test_missing_file() {
        with_databases(|db| {
            let result = Asset::from_path(db, &path("Assets/does not.exist"));
            assert!(matches!(result, Err(AssetError::NotFound(_))));
        });
    }

    #[test]
    fn test_create_over_existing_file() {
        with_databases(|db| {
            let p = path("Assets/x.asset");
            let first = Asset::create(db, object(Material { shininess: 1.0 }), &p, false).unwrap();

            let second = Asset::create(db, object(Material { shininess: 2.0 }), &p, false).unwrap();

            assert_eq!(second.path().unwrap(), "Assets/x 1.asset");
            assert_eq!(first.path(), Some(&p));
            let original = Asset::from_path(db, &p).unwrap();
            assert_eq!(original.main_as::<Material>().unwrap().shininess, 1.0);
        });
    }

    #[test]
    fn test_delete_twice_and_save_after_delete() {
        with_databases(|db| {
            let p = path("Assets/x.asset");
            let mut asset = Asset::create(db, object(Material { shininess: 1.0 }), &p, false).unwrap();

            asset.delete(db).unwrap();

            assert!(asset.is_deleted());
            assert!(!p.exists(db));
            assert!(matches!(asset.delete(db), Err(AssetError::InvalidOperation(_))));
            assert!(matches!(asset.save(db), Err(AssetError::InvalidOperation(_))));
        });
    }

    #[test]
    fn test_guid_survives_reload() {
        with_databases(|db| {
            let p = path("Assets/sub/x.asset");
            let asset = Asset::create(db, object(Material { shininess: 1.0 }), &p, false).unwrap();
            let guid = asset.guid(db).unwrap();

            assert_eq!(AssetPath::from_guid(db, guid).unwrap(), p);
            let again = Asset::from_guid(db, guid).unwrap();
            assert_eq!(again.path(), Some(&p));
        });
    }
}

mod host {
    use super::*;

    #[test]
    fn test_import_external_file() {
        let temp_dir = TempDir::new("scenarios").unwrap();
        std::fs::create_dir_all(temp_dir.path().join("Assets/textures")).unwrap();
        std::fs::write(temp_dir.path().join("Assets/textures/stone.png"), b"png").unwrap();

        let mut db = DirDatabase::open(Project::new(temp_dir.path()).unwrap()).unwrap();
        let p = path("Assets/textures/stone.png");
        assert!(matches!(Asset::from_path(&db, &p), Err(AssetError::NotImported(_))));

        let asset = Asset::import(&mut db, &p).unwrap();

        assert!(asset.is_foreign(&db));
        assert!(temp_dir.path().join("Assets/textures/stone.png.meta").is_file());
    }

    #[test]
    fn test_auto_clean_removes_created_dirs() {
        let temp_dir = TempDir::new("scenarios").unwrap();
        let root = temp_dir.path().join("game");
        {
            let mut db = DirDatabase::open(Project::new(&root).unwrap()).unwrap();
            db.set_auto_clean(true);
            Asset::create(&mut db, object(Material { shininess: 1.0 }), &path("Assets/x.asset"), false)
                .unwrap();
            assert!(root.join("Assets/x.asset").exists());
        }
        assert!(!root.exists());
    }
}
