use crate::errors::{AppError, AppResult};
use crate::models::Entry;
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

const MIRROR_SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS backup_entries (
  id TEXT PRIMARY KEY,
  entry_json TEXT NOT NULL,
  created_at TEXT NOT NULL
);";

#[derive(Debug)]
pub struct MirrorStore {
    conn: Mutex<Connection>,
}

impl MirrorStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating mirror directory {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("opening mirror database {}", path.display()))?;
        conn.execute_batch(MIRROR_SCHEMA_SQL)
            .context("creating mirror schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn replace_all(&self, entries: &[Entry]) -> anyhow::Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().context("starting mirror transaction")?;
        tx.execute("DELETE FROM backup_entries", [])
            .context("clearing mirror")?;
        {
            let mut insert = tx.prepare(
                "INSERT OR REPLACE INTO backup_entries (id, entry_json, created_at) VALUES (?1, ?2, ?3)",
            )?;
            for entry in entries {
                insert
                    .execute(params![
                        entry.id,
                        serde_json::to_string(entry)?,
                        entry.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
                    ])
                    .with_context(|| format!("mirroring entry {}", entry.id))?;
            }
        }
        tx.commit().context("committing mirror transaction")?;
        Ok(())
    }

    pub fn load_all(&self) -> anyhow::Result<Vec<Entry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT entry_json FROM backup_entries ORDER BY created_at DESC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut result = Vec::new();
        for row in rows {
            let raw = row?;
            result.push(serde_json::from_str::<Entry>(&raw).context("decoding mirrored entry")?);
        }
        Ok(result)
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM backup_entries", [])
            .context("clearing mirror")?;
        Ok(())
    }

    pub fn latest_entry_time(&self) -> anyhow::Result<Option<DateTime<Utc>>> {
        Ok(self.load_all()?.into_iter().map(|entry| entry.created_at).max())
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("mirror mutex poisoned"))
    }
}

enum MirrorCommand {
    Replace(Vec<Entry>),
    Clear,
    ReadAll(oneshot::Sender<AppResult<Vec<Entry>>>),
    LastBackupTime(oneshot::Sender<AppResult<Option<DateTime<Utc>>>>),
    Flush(oneshot::Sender<()>),
}

#[derive(Debug, Clone)]
pub struct MirrorHandle {
    sender: mpsc::UnboundedSender<MirrorCommand>,
}

impl MirrorHandle {
    pub fn spawn(path: &Path) -> AppResult<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|error| AppError::Mirror(format!("no async runtime for backup mirror: {}", error)))?;
        let store = MirrorStore::open(path).map_err(|error| AppError::Mirror(format!("{:#}", error)))?;
        let (sender, receiver) = mpsc::unbounded_channel();
        runtime.spawn(run_worker(Arc::new(store), receiver));
        tracing::info!(path = %path.display(), "backup mirror started");
        Ok(Self { sender })
    }

    pub fn replace(&self, entries: Vec<Entry>) {
        let count = entries.len();
        if self.sender.send(MirrorCommand::Replace(entries)).is_err() {
            tracing::warn!(count, "backup mirror unavailable, replace dropped");
        }
    }

    pub fn clear(&self) {
        if self.sender.send(MirrorCommand::Clear).is_err() {
            tracing::warn!("backup mirror unavailable, clear dropped");
        }
    }

    pub async fn read_all(&self) -> AppResult<Vec<Entry>> {
        let (reply, response) = oneshot::channel();
        self.request(MirrorCommand::ReadAll(reply))?;
        response
            .await
            .map_err(|_| AppError::Mirror("backup mirror stopped before replying".to_string()))?
    }

    pub async fn last_backup_time(&self) -> AppResult<Option<DateTime<Utc>>> {
        let (reply, response) = oneshot::channel();
        self.request(MirrorCommand::LastBackupTime(reply))?;
        response
            .await
            .map_err(|_| AppError::Mirror("backup mirror stopped before replying".to_string()))?
    }

    pub async fn flush(&self) {
        let (reply, response) = oneshot::channel();
        if self.request(MirrorCommand::Flush(reply)).is_ok() {
            let _ = response.await;
        }
    }

    fn request(&self, command: MirrorCommand) -> AppResult<()> {
        self.sender
            .send(command)
            .map_err(|_| AppError::Mirror("backup mirror is not running".to_string()))
    }
}

async fn run_worker(store: Arc<MirrorStore>, mut receiver: mpsc::UnboundedReceiver<MirrorCommand>) {
    while let Some(command) = receiver.recv().await {
        match command {
            MirrorCommand::Replace(entries) => {
                let count = entries.len();
                match blocking(&store, move |store| store.replace_all(&entries)).await {
                    Ok(()) => tracing::debug!(count, "backup mirror replaced"),
                    Err(error) => tracing::warn!(error = %format!("{:#}", error), count, "backup mirror replace failed"),
                }
            }
            MirrorCommand::Clear => match blocking(&store, |store| store.clear()).await {
                Ok(()) => tracing::info!("backup mirror cleared"),
                Err(error) => tracing::warn!(error = %format!("{:#}", error), "backup mirror clear failed"),
            },
            MirrorCommand::ReadAll(reply) => {
                let result = blocking(&store, |store| store.load_all())
                    .await
                    .map_err(|error| AppError::Mirror(format!("{:#}", error)));
                let _ = reply.send(result);
            }
            MirrorCommand::LastBackupTime(reply) => {
                let result = blocking(&store, |store| store.latest_entry_time())
                    .await
                    .map_err(|error| AppError::Mirror(format!("{:#}", error)));
                let _ = reply.send(result);
            }
            MirrorCommand::Flush(reply) => {
                let _ = reply.send(());
            }
        }
    }
    tracing::debug!("backup mirror worker stopped");
}

async fn blocking<T, F>(store: &Arc<MirrorStore>, operation: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce(&MirrorStore) -> anyhow::Result<T> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || operation(&store))
        .await
        .context("backup mirror task aborted")?
}
