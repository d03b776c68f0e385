//! Integration tests for hbnb_runtime.
//!
//! Every test drives the console through its public surface against a
//! storage file in its own temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;

use hbnb_engine::{AttrValue, KindRegistry};
use hbnb_runtime::{run_console, FileStorage, Interpreter, Outcome, StorageError};

fn open(path: &Path) -> Interpreter {
    let registry = KindRegistry::standard();
    let storage = FileStorage::open(path, &registry).expect("open storage");
    Interpreter::new(registry, storage)
}

fn temp_store() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("file.json");
    (dir, path)
}

/// Run one line and return what would be printed.
fn say(interp: &mut Interpreter, line: &str) -> String {
    match interp.handle_line(line).expect("storage failure") {
        Outcome::Continue(text) | Outcome::Exit(text) => text.unwrap_or_default(),
    }
}

// ─────────────────────────────────────────────────────────────
// City lifecycle
// ─────────────────────────────────────────────────────────────

#[test]
fn city_lifecycle_scenario() {
    let (_dir, path) = temp_store();
    let mut interp = open(&path);

    let id = say(&mut interp, "create City");
    assert_eq!(id.len(), 36);

    let shown = say(&mut interp, &format!("show City {}", id));
    assert!(shown.starts_with(&format!("[City] ({}) {{", id)), "{}", shown);
    assert!(shown.contains("'state_id': ''"), "{}", shown);
    assert!(shown.contains("'name': ''"), "{}", shown);

    assert_eq!(say(&mut interp, &format!("update City {} name \"Austin\"", id)), "");
    let shown = say(&mut interp, &format!("show City {}", id));
    assert!(shown.contains("'name': 'Austin'"), "{}", shown);

    assert_eq!(say(&mut interp, &format!("destroy City {}", id)), "");
    assert_eq!(
        say(&mut interp, &format!("show City {}", id)),
        "** no instance found **"
    );
}

#[test]
fn created_ids_are_unique_and_immediately_visible() {
    let (_dir, path) = temp_store();
    let mut interp = open(&path);

    let mut seen = std::collections::HashSet::new();
    for kind in ["BaseModel", "User", "State", "City", "Amenity", "Place", "Review"] {
        for _ in 0..5 {
            let id = say(&mut interp, &format!("create {}", kind));
            assert!(interp.storage().map().lookup(kind, &id).is_some());
            assert!(seen.insert(id));
        }
    }
    assert_eq!(seen.len(), 35);
}

// ─────────────────────────────────────────────────────────────
// Type coercion
// ─────────────────────────────────────────────────────────────

#[test]
fn update_coerces_int_float_and_text() {
    let (_dir, path) = temp_store();
    let mut interp = open(&path);
    let id = say(&mut interp, "create Place");

    say(&mut interp, &format!("update Place {} number_rooms 3", id));
    say(&mut interp, &format!("update Place {} latitude 3.5", id));
    say(&mut interp, &format!("update Place {} description abc", id));

    let record = interp.storage().map().lookup("Place", &id).unwrap();
    assert_eq!(record.get("number_rooms"), Some(&AttrValue::Int(3)));
    assert_eq!(record.get("latitude"), Some(&AttrValue::Float(3.5)));
    assert_eq!(record.get("description"), Some(&AttrValue::Text("abc".into())));

    say(&mut interp, &format!("update Place {} longitude -3", id));
    let record = interp.storage().map().lookup("Place", &id).unwrap();
    assert_eq!(record.get("longitude"), Some(&AttrValue::Float(-3.0)));

    let shown = say(&mut interp, &format!("Place.show(\"{}\")", id));
    assert!(shown.contains("'longitude': -3.0,"), "{}", shown);
    assert!(shown.contains("'number_rooms': 3,"), "{}", shown);
    assert!(shown.contains("'latitude': 3.5,"), "{}", shown);
    assert!(shown.contains("'description': 'abc',"), "{}", shown);
}

#[test]
fn update_bumps_updated_at_only() {
    let (_dir, path) = temp_store();
    let mut interp = open(&path);
    let id = say(&mut interp, "create State");
    let before = interp.storage().map().lookup("State", &id).unwrap().clone();

    say(&mut interp, &format!("update State {} name Texas", id));
    let after = interp.storage().map().lookup("State", &id).unwrap();
    assert_eq!(after.created_at(), before.created_at());
    assert!(after.updated_at() >= before.updated_at());
    assert!(after.updated_at() >= after.created_at());
}

// ─────────────────────────────────────────────────────────────
// Grammar parity
// ─────────────────────────────────────────────────────────────

#[test]
fn both_grammars_print_the_same() {
    let (_dir, path) = temp_store();
    let mut interp = open(&path);
    let id = say(&mut interp, "create City");
    say(&mut interp, "create City");
    say(&mut interp, "create User");

    let pairs = [
        (format!("show City {}", id), format!("City.show(\"{}\")", id)),
        ("all City".to_string(), "City.all()".to_string()),
        ("count City".to_string(), "City.count()".to_string()),
        ("show City".to_string(), "City.show()".to_string()),
        ("show Foo 1".to_string(), "Foo.show(\"1\")".to_string()),
        ("count Foo".to_string(), "Foo.count()".to_string()),
        ("show City nope".to_string(), "City.show(\"nope\")".to_string()),
        (format!("update City {}", id), format!("City.update(\"{}\")", id)),
        (
            format!("update City {} name", id),
            format!("City.update(\"{}\", \"name\")", id),
        ),
        (
            format!("update City {} name #1", id),
            format!("City.update(\"{}\", \"name\", \"#1\")", id),
        ),
        (
            format!(r"update City {} path C:\dir", id),
            format!(r#"City.update("{}", "path", "C:\dir")"#, id),
        ),
    ];
    for (verb_form, dotted_form) in pairs {
        assert_eq!(
            say(&mut interp, &verb_form),
            say(&mut interp, &dotted_form),
            "{} vs {}",
            verb_form,
            dotted_form
        );
    }
    assert_eq!(say(&mut interp, "City.count()"), "2");
}

#[test]
fn hash_and_backslash_values_are_stored_verbatim() {
    let (_dir, path) = temp_store();
    let mut interp = open(&path);
    let id = say(&mut interp, "create City");

    say(&mut interp, &format!("update City {} name #1", id));
    say(&mut interp, &format!(r"update City {} path C:\dir", id));
    let record = interp.storage().map().lookup("City", &id).unwrap();
    assert_eq!(record.get("name"), Some(&AttrValue::Text("#1".into())));
    assert_eq!(record.get("path"), Some(&AttrValue::Text(r"C:\dir".into())));
}

#[test]
fn dotted_update_forms_match_verb_form_effects() {
    let (_dir, path) = temp_store();
    let mut interp = open(&path);
    let a = say(&mut interp, "create User");
    let b = say(&mut interp, "create User");

    say(&mut interp, &format!("update User {} first_name Betty", a));
    say(&mut interp, &format!("User.update(\"{}\", \"first_name\", \"Betty\")", b));
    let map = interp.storage().map();
    assert_eq!(
        map.lookup("User", &a).unwrap().attributes(),
        map.lookup("User", &b).unwrap().attributes()
    );

    say(
        &mut interp,
        &format!("User.update(\"{}\", {{'first_name': 'John', 'age': 89}})", a),
    );
    let record = interp.storage().map().lookup("User", &a).unwrap();
    assert_eq!(record.get("first_name"), Some(&AttrValue::Text("John".into())));
    assert_eq!(record.get("age"), Some(&AttrValue::Int(89)));
}

// ─────────────────────────────────────────────────────────────
// Listing and counting
// ─────────────────────────────────────────────────────────────

#[test]
fn all_lists_quoted_record_strings() {
    let (_dir, path) = temp_store();
    let mut interp = open(&path);
    assert_eq!(say(&mut interp, "all"), "[]");

    let city = say(&mut interp, "create City");
    let user = say(&mut interp, "create User");

    let all = say(&mut interp, "all");
    let city_str = interp.storage().map().lookup("City", &city).unwrap().to_string();
    let user_str = interp.storage().map().lookup("User", &user).unwrap().to_string();
    assert_eq!(all, format!("[\"{}\", \"{}\"]", city_str, user_str));
    assert_eq!(say(&mut interp, "all User"), format!("[\"{}\"]", user_str));
    assert_eq!(say(&mut interp, "all Foo"), "** class doesn't exist **");
}

#[test]
fn destroy_decrements_count_by_one() {
    let (_dir, path) = temp_store();
    let mut interp = open(&path);
    let id = say(&mut interp, "create Amenity");
    say(&mut interp, "create Amenity");
    assert_eq!(say(&mut interp, "count Amenity"), "2");

    say(&mut interp, &format!("Amenity.destroy(\"{}\")", id));
    assert_eq!(say(&mut interp, "count Amenity"), "1");
    assert!(interp.storage().map().lookup("Amenity", &id).is_none());
    assert_eq!(
        say(&mut interp, &format!("destroy Amenity {}", id)),
        "** no instance found **"
    );
}

// ─────────────────────────────────────────────────────────────
// Persistence
// ─────────────────────────────────────────────────────────────

#[test]
fn unknown_kind_does_not_touch_the_file() {
    let (_dir, path) = temp_store();
    let mut interp = open(&path);
    assert_eq!(say(&mut interp, "create Foo"), "** class doesn't exist **");
    assert!(!path.exists());

    say(&mut interp, "create Review");
    let before = interp.storage().fingerprint().unwrap();
    assert_eq!(say(&mut interp, "create Foo"), "** class doesn't exist **");
    assert_eq!(say(&mut interp, "create"), "** class name missing **");
    assert_eq!(interp.storage().fingerprint().unwrap(), before);
}

#[test]
fn reload_without_artifact_is_empty() {
    let (_dir, path) = temp_store();
    let interp = open(&path);
    assert!(interp.storage().map().is_empty());
}

#[test]
fn state_survives_a_restart() {
    let (_dir, path) = temp_store();
    let (id, original) = {
        let mut interp = open(&path);
        let id = say(&mut interp, "create Place");
        say(&mut interp, &format!("update Place {} max_guest 4", id));
        say(&mut interp, &format!("update Place {} price_by_night 99.5", id));
        say(&mut interp, &format!("update Place {} name \"Cozy loft\"", id));
        let record = interp.storage().map().lookup("Place", &id).unwrap().clone();
        (id, record)
    };

    let mut interp = open(&path);
    let reloaded = interp.storage().map().lookup("Place", &id).unwrap();
    assert_eq!(reloaded, &original);
    assert_eq!(
        say(&mut interp, &format!("show Place {}", id)),
        original.to_string()
    );
}

#[test]
fn artifact_layout_is_keyed_by_kind_and_id() {
    let (_dir, path) = temp_store();
    let mut interp = open(&path);
    let id = say(&mut interp, "create City");

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let entry = &raw[format!("City.{}", id)];
    assert_eq!(entry["__class__"], "City");
    assert_eq!(entry["id"], id.as_str());
    assert_eq!(entry["state_id"], "");
    assert!(entry["created_at"].as_str().unwrap().contains('T'));
    assert_eq!(entry["created_at"], entry["updated_at"]);
}

#[test]
fn corrupt_artifact_fails_startup() {
    let (_dir, path) = temp_store();
    fs::write(&path, "{\"City.1\": ").unwrap();
    let err = FileStorage::open(&path, &KindRegistry::standard()).unwrap_err();
    assert!(matches!(err, StorageError::Deserialization(_)));
}

#[test]
fn unknown_kind_in_artifact_fails_startup() {
    let (_dir, path) = temp_store();
    fs::write(
        &path,
        r#"{"Ghost.1": {"id": "1", "created_at": "2020-01-01T00:00:00.000000",
            "updated_at": "2020-01-01T00:00:00.000000", "__class__": "Ghost"}}"#,
    )
    .unwrap();
    let err = FileStorage::open(&path, &KindRegistry::standard()).unwrap_err();
    assert!(matches!(err, StorageError::Engine { .. }));
}

// ─────────────────────────────────────────────────────────────
// Console loop
// ─────────────────────────────────────────────────────────────

#[test]
fn scripted_session_through_the_loop() {
    let (_dir, path) = temp_store();
    let mut interp = open(&path);
    let script = "\ncreate\ncreate Foo\nCity.count()\nall Foo\nbogus line\nquit\ncreate City\n";
    let mut out = Vec::new();
    run_console(&mut interp, script.as_bytes(), &mut out, None).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "** class name missing **\n\
         ** class doesn't exist **\n\
         0\n\
         ** class doesn't exist **\n\
         ** Unknown syntax: bogus line **\n"
    );
    assert!(interp.storage().map().is_empty());
}
