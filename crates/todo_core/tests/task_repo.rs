use todo_core::{
    KeyValueStore, MemoryStore, PersistError, SqliteStore, Task, TaskListRepository,
    STORAGE_KEY,
};

fn sample_list() -> Vec<Task> {
    let mut done = Task::new("Buy milk").unwrap();
    done.toggle();
    let open = Task::new("Walk dog").unwrap();
    vec![open, done]
}

#[tokio::test]
async fn load_returns_none_before_first_save() {
    let repo = TaskListRepository::new(MemoryStore::new());
    assert!(repo.load().await.unwrap().is_none());
}

#[tokio::test]
async fn save_then_load_preserves_order_and_fields() {
    let repo = TaskListRepository::new(MemoryStore::new());
    let tasks = sample_list();

    repo.save(&tasks).await.unwrap();
    let loaded = repo.load().await.unwrap().unwrap();
    assert_eq!(loaded, tasks);
}

#[tokio::test]
async fn save_writes_under_versioned_key() {
    let store = MemoryStore::new();
    let repo = TaskListRepository::new(store.clone());
    repo.save(&sample_list()).await.unwrap();

    let raw = store.get(STORAGE_KEY).await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["schemaVersion"], 1);
    assert_eq!(value["tasks"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_title_in_storage_is_invalid_data() {
    let raw = r#"{"schemaVersion":1,"tasks":[
        {"id":"a","title":"  ","done":false,"createdAt":"2024-05-01T10:00:00Z"}
    ]}"#;
    let repo = TaskListRepository::new(MemoryStore::with_entry(STORAGE_KEY, raw));

    let err = repo.load().await.unwrap_err();
    assert!(matches!(err, PersistError::InvalidData(_)));
}

#[tokio::test]
async fn custom_key_isolates_lists() {
    let store = MemoryStore::new();
    let first = TaskListRepository::with_key(store.clone(), "@todos_v1_a");
    let second = TaskListRepository::with_key(store.clone(), "@todos_v1_b");

    first.save(&sample_list()).await.unwrap();
    assert!(second.load().await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn sqlite_store_round_trips_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.sqlite3");
    let tasks = sample_list();

    {
        let repo = TaskListRepository::new(SqliteStore::open(&path).unwrap());
        repo.save(&tasks).await.unwrap();
        repo.save(&tasks[..1]).await.unwrap();
    }

    let repo = TaskListRepository::new(SqliteStore::open(&path).unwrap());
    let loaded = repo.load().await.unwrap().unwrap();
    assert_eq!(loaded, tasks[..1].to_vec());
}

#[tokio::test]
async fn sqlite_store_get_missing_key_is_none() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert!(store.get("absent").await.unwrap().is_none());

    store.set("present", "v1").await.unwrap();
    store.set("present", "v2").await.unwrap();
    assert_eq!(store.get("present").await.unwrap().as_deref(), Some("v2"));
}
