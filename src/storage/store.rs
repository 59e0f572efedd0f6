use super::model::Recording;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;
use tracing::{error, warn};

type StoreTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum StoreCommand {
    Execute(StoreTask),
    Shutdown,
}

struct StoreInner {
    sender: mpsc::Sender<StoreCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if self.sender.send(StoreCommand::Shutdown).is_err() {
                error!("store worker already gone at shutdown");
            }
            if handle.join().is_err() {
                error!("store worker panicked");
            }
        }
    }
}

/// Recording store on a dedicated SQLite worker thread
#[derive(Clone)]
pub struct RecordingStore {
    inner: Arc<StoreInner>,
}

impl RecordingStore {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("voicelogger-store".into())
            .spawn(move || {
                let mut conn = match Connection::open(&db_path) {
                    Ok(conn) => conn,
                    Err(e) => {
                        let _ = ready_tx.send(Err(
                            anyhow::Error::new(e).context("failed to open SQLite database")
                        ));
                        return;
                    }
                };

                if let Err(e) = conn.pragma_update(None, "journal_mode", "WAL") {
                    warn!("failed to enable WAL mode: {e}");
                }

                let init = init_schema(&conn).context("failed to initialize schema");
                if ready_tx.send(init).is_err() {
                    error!("store initialization receiver dropped");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        StoreCommand::Execute(task) => task(&mut conn),
                        StoreCommand::Shutdown => break,
                    }
                }
            })
            .context("failed to spawn store worker")?;

        ready_rx
            .recv()
            .context("store worker exited before signalling ready")??;

        Ok(Self {
            inner: Arc::new(StoreInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    async fn execute<T, F>(&self, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.inner
            .sender
            .send(StoreCommand::Execute(Box::new(move |conn| {
                let _ = reply_tx.send(task(conn));
            })))
            .map_err(|_| anyhow!("store worker is gone"))?;

        reply_rx
            .await
            .context("store worker dropped the reply")?
    }

    pub async fn insert(&self, recording: &Recording) -> Result<()> {
        let recording = recording.clone();
        self.execute(move |conn| insert_one(conn, &recording)).await
    }

    pub async fn insert_many(&self, recordings: Vec<Recording>) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            for recording in &recordings {
                insert_one(&tx, recording)?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Recording>> {
        let id = id.to_string();
        self.execute(move |conn| {
            let recording = conn
                .query_row(
                    "SELECT id, title, audio_path, duration_ms, created_at, track, is_sample
                     FROM recordings WHERE id = ?1",
                    params![id],
                    row_to_recording,
                )
                .optional()?;
            Ok(recording)
        })
        .await
    }

    /// List recordings newest first, optionally filtered by a title
    /// substring.
    pub async fn list(&self, title_filter: Option<String>) -> Result<Vec<Recording>> {
        self.execute(move |conn| {
            let mut stmt;
            let mut rows = match &title_filter {
                Some(filter) => {
                    stmt = conn.prepare(
                        "SELECT id, title, audio_path, duration_ms, created_at, track, is_sample
                         FROM recordings
                         WHERE title LIKE '%' || ?1 || '%'
                         ORDER BY created_at DESC",
                    )?;
                    stmt.query(params![filter])?
                }
                None => {
                    stmt = conn.prepare(
                        "SELECT id, title, audio_path, duration_ms, created_at, track, is_sample
                         FROM recordings
                         ORDER BY created_at DESC",
                    )?;
                    stmt.query([])?
                }
            };

            let mut recordings = Vec::new();
            while let Some(row) = rows.next()? {
                recordings.push(row_to_recording(row)?);
            }
            Ok(recordings)
        })
        .await
    }

    /// Delete one recording. Removes the underlying audio file for
    /// non-sample recordings; sample rows share one bundled asset which is
    /// left in place. Returns whether a row existed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.execute(move |conn| {
            let target: Option<(String, bool)> = conn
                .query_row(
                    "SELECT audio_path, is_sample FROM recordings WHERE id = ?1",
                    params![id],
                    |row| Ok((row.get(0)?, row.get::<_, i64>(1)? != 0)),
                )
                .optional()?;

            let Some((audio_path, is_sample)) = target else {
                return Ok(false);
            };

            conn.execute("DELETE FROM recordings WHERE id = ?1", params![id])?;
            if !is_sample {
                remove_audio_file(&audio_path);
            }
            Ok(true)
        })
        .await
    }

    /// Delete every recording and the audio files of non-sample rows.
    pub async fn delete_all(&self) -> Result<usize> {
        self.execute(|conn| {
            let mut stmt =
                conn.prepare("SELECT audio_path FROM recordings WHERE is_sample = 0")?;
            let paths: Vec<String> = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<_, _>>()?;
            drop(stmt);

            let deleted = conn.execute("DELETE FROM recordings", [])?;
            for path in &paths {
                remove_audio_file(path);
            }
            Ok(deleted)
        })
        .await
    }

    /// Delete seeded sample recordings only.
    pub async fn delete_samples(&self) -> Result<usize> {
        self.execute(|conn| {
            let deleted = conn.execute("DELETE FROM recordings WHERE is_sample = 1", [])?;
            Ok(deleted)
        })
        .await
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS recordings (
             id          TEXT PRIMARY KEY,
             title       TEXT NOT NULL,
             audio_path  TEXT NOT NULL,
             duration_ms INTEGER NOT NULL,
             created_at  TEXT NOT NULL,
             track       TEXT NOT NULL,
             is_sample   INTEGER NOT NULL DEFAULT 0
         );
         CREATE INDEX IF NOT EXISTS idx_recordings_created_at
             ON recordings(created_at DESC);",
    )?;
    Ok(())
}

fn insert_one(conn: &Connection, recording: &Recording) -> Result<()> {
    let track = serde_json::to_string(&recording.track)?;
    conn.execute(
        "INSERT INTO recordings (id, title, audio_path, duration_ms, created_at, track, is_sample)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            recording.id,
            recording.title,
            recording.audio_path,
            i64::try_from(recording.duration_ms)
                .map_err(|_| anyhow!("duration exceeds SQLite INTEGER range"))?,
            recording.created_at.to_rfc3339(),
            track,
            recording.is_sample as i64,
        ],
    )?;
    Ok(())
}

fn row_to_recording(row: &Row) -> rusqlite::Result<Recording> {
    let created_at: String = row.get("created_at")?;
    let track: String = row.get("track")?;
    let duration_ms: i64 = row.get("duration_ms")?;
    let is_sample: i64 = row.get("is_sample")?;

    Ok(Recording {
        id: row.get("id")?,
        title: row.get("title")?,
        audio_path: row.get("audio_path")?,
        duration_ms: duration_ms.max(0) as u64,
        created_at: parse_datetime(&created_at)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, e.into()))?,
        track: serde_json::from_str(&track)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, e.into()))?,
        is_sample: is_sample != 0,
    })
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}

fn remove_audio_file(path: &str) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!(path, "failed to remove audio file: {e}");
    }
}
