use assetdb_kit::{Asset, AssetPath, DirDatabase, Project, object};

#[derive(Debug)]
struct Greeting {
    text: String,
}

fn main() {
    let tmp = std::env::temp_dir();
    println!("Temp dir: {}", tmp.display());

    let root = tmp.join("my_game");

    // creates `/tmp/my_game` with its `Assets` and `Packages` folders
    let mut db = DirDatabase::open(Project::new(&root).unwrap()).unwrap();

    // remove everything created above when `db` is dropped
    db.set_auto_clean(true);

    // `Assets/texts/hello.asset`: the default extension is appended
    let path = AssetPath::combine("Assets\\texts", "hello", None).unwrap();

    // creates `/tmp/my_game/Assets/texts` and writes `hello.asset` into it,
    // each with a `.meta` file holding its guid
    let greeting = object(Greeting {
        text: "Hello".to_string(),
    });
    let mut hello = Asset::create(&mut db, greeting, &path, false).unwrap();
    println!("Created: {}", hello.path().unwrap());

    // the same name is taken now, so the next asset lands at `hello 1.asset`
    let world = object(Greeting {
        text: "World".to_string(),
    });
    let world = Asset::create(&mut db, world, hello.path().unwrap(), false).unwrap();
    println!("Created: {}", world.path().unwrap());

    // absolute host paths below the project root work too
    let host_path = root.join("Assets/texts").join(world.path().unwrap().file_name().unwrap());
    let reopened = Asset::open(&db, &host_path.to_string_lossy()).unwrap();

    println!(
        "{}, {}!",
        hello.load::<Greeting, _>(&db).unwrap().text,
        reopened.main_as::<Greeting>().unwrap().text
    );

    // the handle is invalid after delete
    hello.delete(&mut db).unwrap();
    assert!(hello.save(&mut db).is_err());
}
