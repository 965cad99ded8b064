//! Tests for the reference flow stores.
mod common;
use common::*;
use kaiwa::error::StoreError;
use kaiwa::prelude::*;
use tempfile::tempdir;

fn exercise_store(store: &mut dyn FlowStore) {
    let (signup, _, _) = create_signup_graph();
    let (menu, _, _, _) = create_menu_graph();

    let signup_id = store.save(None, "Signup", &signup).unwrap();
    let menu_id = store.save(None, "Menu", &menu).unwrap();
    assert_ne!(signup_id, menu_id);

    let (name, loaded) = store.load(&signup_id).unwrap();
    assert_eq!(name, "Signup");
    assert_eq!(loaded.id(), Some(signup_id.as_str()));
    assert_eq!(loaded.nodes(), signup.nodes());
    assert_eq!(loaded.edges(), signup.edges());

    // A loaded graph compiles to the same document as the original.
    let original = Compiler::builder(&signup).build().compile().unwrap();
    let reloaded = Compiler::builder(&loaded).build().compile().unwrap();
    assert_eq!(original, reloaded);

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 2);
    let mut ids: Vec<&str> = listed.iter().map(|s| s.id.as_str()).collect();
    ids.sort();
    let mut expected = vec![signup_id.as_str(), menu_id.as_str()];
    expected.sort();
    assert_eq!(ids, expected);

    // Saving under an existing id overwrites it.
    let renamed = signup.rename("Signup v2").unwrap();
    let same_id = store.save(Some(&signup_id), "Signup v2", &renamed).unwrap();
    assert_eq!(same_id, signup_id);
    let (name, loaded) = store.load(&signup_id).unwrap();
    assert_eq!(name, "Signup v2");
    assert_eq!(loaded.name(), "Signup v2");
    assert_eq!(store.list().unwrap().len(), 2);

    assert!(matches!(
        store.save(Some("no-such-flow"), "Ghost", &signup),
        Err(StoreError::NotFound(_))
    ));

    store.delete(&menu_id).unwrap();
    assert!(matches!(store.load(&menu_id), Err(StoreError::NotFound(_))));
    assert!(matches!(store.delete(&menu_id), Err(StoreError::NotFound(_))));
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn test_memory_store() {
    let mut store = MemoryFlowStore::new();
    assert!(store.is_empty());
    exercise_store(&mut store);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_directory_store() {
    let dir = tempdir().unwrap();
    let mut store = DirectoryFlowStore::open(dir.path().join("flows")).unwrap();
    exercise_store(&mut store);

    let files: Vec<_> = std::fs::read_dir(store.root())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].extension().and_then(|e| e.to_str()), Some("json"));
}

#[test]
fn test_directory_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let (graph, _) = create_single_text_graph();
    let id = {
        let mut store = DirectoryFlowStore::open(dir.path()).unwrap();
        store.save(None, "Persistent", &graph).unwrap()
    };

    let store = DirectoryFlowStore::open(dir.path()).unwrap();
    let (name, loaded) = store.load(&id).unwrap();
    assert_eq!(name, "Persistent");
    assert_eq!(loaded.nodes(), graph.nodes());
}

#[test]
fn test_directory_store_rejects_path_like_ids() {
    let dir = tempdir().unwrap();
    let store = DirectoryFlowStore::open(dir.path()).unwrap();
    for id in ["../escape", "a/b", ""] {
        assert!(matches!(store.load(id), Err(StoreError::NotFound(_))));
    }
}

#[test]
fn test_directory_store_reports_corrupt_files() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("broken.json"), "{ not a flow").unwrap();
    let store = DirectoryFlowStore::open(dir.path()).unwrap();
    assert!(matches!(
        store.load("broken"),
        Err(StoreError::Serialization { .. })
    ));
    assert!(store.list().is_err());
}
