use chrono::{Duration, Utc};
use std::fs;
use studychef::chat::{Message, Speaker};
use studychef::constants;
use studychef::sessions::{SavedChat, SessionStore};
use tempfile::TempDir;

fn create_test_chat(id: &str, budget: &str) -> SavedChat {
    SavedChat {
        id: id.to_string(),
        title: "Vegetarian".to_string(),
        timestamp: Utc::now() - Duration::minutes(5),
        messages: vec![
            Message::greeting(),
            Message::new(Speaker::User, "Vegetarian"),
            Message::new(Speaker::Assistant, "Budget?"),
        ],
        user_budget: budget.to_string(),
        batch_cooking: false,
        equipment: String::new(),
    }
}

fn store_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("nested").join(constants::SAVED_CHATS_FILE)
}

#[test]
fn test_missing_file_is_empty_store() {
    let temp_dir = TempDir::new().unwrap();
    let store = SessionStore::open(store_path(&temp_dir));
    assert!(store.chats().is_empty());
}

#[test]
fn test_save_persists_and_reopens() {
    let temp_dir = TempDir::new().unwrap();
    let path = store_path(&temp_dir);

    let mut store = SessionStore::open(&path);
    store.save(create_test_chat("100", "Budget ($3-5/day)")).unwrap();
    assert!(path.exists());

    let reopened = SessionStore::open(&path);
    assert_eq!(reopened.chats().len(), 1);
    assert_eq!(reopened.chats()[0].user_budget, "Budget ($3-5/day)");
    assert_eq!(reopened.chats()[0].messages.len(), 3);
}

#[test]
fn test_saving_same_id_twice_replaces() {
    let temp_dir = TempDir::new().unwrap();
    let path = store_path(&temp_dir);

    let mut store = SessionStore::open(&path);
    store.save(create_test_chat("100", "")).unwrap();
    store.save(create_test_chat("200", "")).unwrap();
    store.save(create_test_chat("100", "Ultra-tight ($2/day)")).unwrap();

    let reopened = SessionStore::open(&path);
    let ids: Vec<_> = reopened.chats().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["100", "200"]);
    assert_eq!(reopened.chats()[0].user_budget, "Ultra-tight ($2/day)");
}

#[test]
fn test_never_more_than_ten_oldest_evicted() {
    let temp_dir = TempDir::new().unwrap();
    let path = store_path(&temp_dir);

    let mut store = SessionStore::open(&path);
    for i in 0..15 {
        store.save(create_test_chat(&format!("chat-{}", i), "")).unwrap();
    }

    let reopened = SessionStore::open(&path);
    assert_eq!(reopened.chats().len(), constants::MAX_SAVED_CHATS);
    assert_eq!(reopened.chats()[0].id, "chat-14");
    assert_eq!(reopened.chats()[9].id, "chat-5");
    assert!(reopened.get("chat-4").is_none());
}

#[test]
fn test_delete_rewrites_store() {
    let temp_dir = TempDir::new().unwrap();
    let path = store_path(&temp_dir);

    let mut store = SessionStore::open(&path);
    store.save(create_test_chat("100", "")).unwrap();
    store.save(create_test_chat("200", "")).unwrap();
    store.delete("100").unwrap();
    assert!(store.delete("100").is_err());

    let reopened = SessionStore::open(&path);
    assert_eq!(reopened.chats().len(), 1);
    assert_eq!(reopened.chats()[0].id, "200");
}

#[test]
fn test_corrupt_store_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    let path = store_path(&temp_dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ this is not json").unwrap();

    assert!(SessionStore::load(&path).is_err());
    let mut store = SessionStore::open(&path);
    assert!(store.chats().is_empty());

    // The next save replaces the unreadable record.
    store.save(create_test_chat("100", "")).unwrap();
    assert_eq!(SessionStore::load(&path).unwrap().len(), 1);
}
