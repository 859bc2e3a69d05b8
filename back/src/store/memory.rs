use std::{
    collections::HashMap,
    ffi::OsString,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use eyre::WrapErr;
use mint_api::v1::Todo;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{StoreError, StoreResult, TodoStore};

/// In-process store, optionally backed by a RON snapshot file.
#[derive(Debug, Default)]
pub struct MemoryTodoStore {
    sequence: AtomicU64,
    entries: Mutex<HashMap<Uuid, Entry>>,
    snapshot: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Entry {
    todo: Todo,
    // breaks ties between equal timestamps
    sequence: u64,
}

impl MemoryTodoStore {
    /// Loads the snapshot at `path`, starting empty if it does not exist yet.
    pub fn load(path: impl Into<PathBuf>) -> eyre::Result<Self> {
        let path = path.into();

        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self {
                    snapshot: Some(path),
                    ..Self::default()
                });
            }
            Err(err) => eyre::bail!(err),
        };

        let data: DataOwned = ron::de::from_reader(file)
            .wrap_err_with(|| format!("failed to read snapshot {}", path.display()))?;

        match data {
            DataOwned::V1 { todos } => Ok(Self::from_v1(todos, path)),
            DataOwned::V2 { entries } => Ok(Self::from_entries(entries, path)),
        }
    }

    // v1 snapshots carry no sequence, so ties fall back to the id
    fn from_v1(todos: HashMap<Uuid, Todo>, path: PathBuf) -> Self {
        let mut todos: Vec<_> = todos.into_values().collect();
        todos.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

        let entries = (todos.into_iter().enumerate())
            .map(|(i, todo)| Entry {
                todo,
                sequence: i as u64,
            })
            .collect();

        Self::from_entries(entries, path)
    }

    fn from_entries(entries: Vec<Entry>, path: PathBuf) -> Self {
        let next = (entries.iter())
            .map(|entry| entry.sequence + 1)
            .max()
            .unwrap_or(0);

        let entries = (entries.into_iter())
            .map(|entry| (entry.todo.id, entry))
            .collect();

        Self {
            sequence: AtomicU64::new(next),
            entries: Mutex::new(entries),
            snapshot: Some(path),
        }
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Todo>> {
        let entries = self.entries.lock().await;
        let mut entries: Vec<_> = entries.values().collect();
        entries.sort_unstable_by(|a, b| {
            (a.todo.created_at, a.sequence)
                .cmp(&(b.todo.created_at, b.sequence))
                .reverse()
        });

        Ok(entries.into_iter().map(|entry| entry.todo.clone()).collect())
    }

    async fn create(&self, title: &str) -> StoreResult<Todo> {
        let todo = Todo {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            completed: false,
            created_at: Utc::now(),
        };

        let entry = Entry {
            todo: todo.clone(),
            sequence: self.next_sequence(),
        };

        self.entries.lock().await.insert(todo.id, entry);

        Ok(todo)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Todo>> {
        let entries = self.entries.lock().await;
        Ok(entries.get(&id).map(|entry| entry.todo.clone()))
    }

    async fn set_completed(&self, id: Uuid, completed: bool) -> StoreResult<Todo> {
        let mut entries = self.entries.lock().await;
        let entry = entries.get_mut(&id).ok_or(StoreError::NotFound)?;
        entry.todo.completed = completed;

        Ok(entry.todo.clone())
    }

    async fn toggle_completed(&self, id: Uuid) -> StoreResult<Option<Todo>> {
        let mut entries = self.entries.lock().await;

        Ok(entries.get_mut(&id).map(|entry| {
            entry.todo.completed = !entry.todo.completed;
            entry.todo.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<()> {
        let mut entries = self.entries.lock().await;

        match entries.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn flush(&self) -> StoreResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let entries = self.entries.lock().await;
        let data = DataBorrowed::V2 {
            entries: entries.values().collect(),
        };

        write_snapshot(path, &data).map_err(StoreError::Snapshot)
    }
}

/// Writes to a sibling file and renames it over `path`, so a crash mid-write
/// leaves the previous snapshot intact.
fn write_snapshot(path: &Path, data: &DataBorrowed<'_>) -> eyre::Result<()> {
    let text = ron::ser::to_string_pretty(data, Default::default())?;

    let mut staging = OsString::from(path.as_os_str());
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    let mut file = fs::File::create(&staging)?;
    file.write_all(text.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&staging, path)
        .wrap_err_with(|| format!("failed to replace snapshot {}", path.display()))?;

    Ok(())
}

#[derive(Serialize)]
enum DataBorrowed<'a> {
    V2 { entries: Vec<&'a Entry> },
}

#[derive(Deserialize)]
enum DataOwned {
    V1 { todos: HashMap<Uuid, Todo> },
    V2 { entries: Vec<Entry> },
}
