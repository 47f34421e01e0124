use std::{
    collections::{hash_map::Entry, HashMap},
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::{error, info};
use serde::Serialize;
use tokio::sync::oneshot;

use crate::models::{CodeSnapshot, TranscriptTurn};

type LogTask = Box<dyn FnOnce(&mut LogWriter) + Send + 'static>;

enum LogCommand {
    Execute(LogTask),
    Shutdown,
}

struct EventLogInner {
    sender: mpsc::Sender<LogCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for EventLogInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(LogCommand::Shutdown) {
                error!("Failed to send shutdown to event log thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join event log thread: {join_err:?}");
            }
        }
    }
}

/// Which append-only stream an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Stream {
    Transcript,
    Code,
}

impl Stream {
    fn file_suffix(&self) -> &'static str {
        match self {
            Stream::Transcript => "transcript",
            Stream::Code => "code",
        }
    }
}

struct LogWriter {
    dir: PathBuf,
    files: HashMap<(String, Stream), File>,
}

impl LogWriter {
    fn append(&mut self, session_id: &str, stream: Stream, mut line: String) -> Result<()> {
        let file = match self.files.entry((session_id.to_string(), stream)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let path = self
                    .dir
                    .join(format!("{session_id}.{}.jsonl", stream.file_suffix()));
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("failed to open event log {}", path.display()))?;
                entry.insert(file)
            }
        };

        line.push('\n');
        file.write_all(line.as_bytes())
            .and_then(|()| file.flush())
            .with_context(|| format!("failed to append {stream:?} event for {session_id}"))?;
        Ok(())
    }
}

/// Every line carries the write timestamp alongside the event payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogLine<'a, T: Serialize> {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    event: &'a T,
}

/// Append-only line-delimited JSON logs for transcripts and code snapshots,
/// one file per session per stream. Writes go through a dedicated worker
/// thread so callers never block on disk.
#[derive(Clone)]
pub struct EventLog {
    inner: Arc<EventLogInner>,
    dir: Arc<PathBuf>,
}

impl EventLog {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create event log directory {}", dir.display()))?;

        let (command_tx, command_rx) = mpsc::channel::<LogCommand>();
        let dir_for_thread = dir.clone();

        let worker = thread::Builder::new()
            .name("intervox-log".into())
            .spawn(move || {
                let mut writer = LogWriter {
                    dir: dir_for_thread,
                    files: HashMap::new(),
                };

                while let Ok(command) = command_rx.recv() {
                    match command {
                        LogCommand::Execute(task) => task(&mut writer),
                        LogCommand::Shutdown => break,
                    }
                }

                info!("Event log thread shutting down");
            })
            .with_context(|| "failed to spawn event log worker thread")?;

        info!("Event log initialized at {}", dir.display());

        Ok(Self {
            inner: Arc::new(EventLogInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            dir: Arc::new(dir),
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.as_path()
    }

    async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut LogWriter) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = LogCommand::Execute(Box::new(move |writer| {
            let result = task(writer);
            if reply_tx.send(result).is_err() {
                error!("Event log caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to event log thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("event log thread terminated unexpectedly"))?
    }

    pub async fn append_transcript(&self, session_id: &str, turn: &TranscriptTurn) -> Result<()> {
        let line = serde_json::to_string(&LogLine {
            timestamp: Utc::now(),
            event: turn,
        })
        .context("failed to serialize transcript turn")?;
        let session_id = session_id.to_string();
        self.execute(move |writer| writer.append(&session_id, Stream::Transcript, line))
            .await
    }

    pub async fn append_code_snapshot(
        &self,
        session_id: &str,
        snapshot: &CodeSnapshot,
    ) -> Result<()> {
        let line = serde_json::to_string(&LogLine {
            timestamp: Utc::now(),
            event: snapshot,
        })
        .context("failed to serialize code snapshot")?;
        let session_id = session_id.to_string();
        self.execute(move |writer| writer.append(&session_id, Stream::Code, line))
            .await
    }
}
