//! Offline mirror: a local full-snapshot cache of actors and shows.
//!
//! Every successful online load wholly replaces the snapshot (a clear plus
//! bulk insert, never an incremental merge) and stamps each record with
//! `synced_at`. When the network is unreachable the last snapshot is served
//! instead. Attendance is deliberately never cached: the printable sheet is
//! read-only, marking happens on paper, and reconciliation goes through the
//! server's manual bulk entry once connectivity returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{ActorDto, ApiClient, ClientError, ShowDto};

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("offline with no cached snapshot: {0}")]
    Offline(#[source] ClientError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedActor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub synced_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedShow {
    pub id: i64,
    pub date: String,
    pub show_time: String,
    pub synced_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Snapshot {
    pub actors: Vec<CachedActor>,
    pub shows: Vec<CachedShow>,
}

/// Where the snapshot came from on this read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Network,
    Cache,
}

#[derive(Debug)]
pub struct MirrorView {
    pub snapshot: Snapshot,
    pub source: Source,
}

pub struct OfflineMirror {
    path: PathBuf,
}

impl OfflineMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the last stored snapshot, or `None` when nothing has synced yet.
    pub fn load(&self) -> Result<Option<Snapshot>, MirrorError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Replaces the snapshot wholesale with freshly fetched records, each
    /// stamped `synced_at = now`. The write goes through a sibling temp file
    /// and a rename, so a reader never observes a half-written snapshot.
    pub fn replace_snapshot(
        &self,
        actors: &[ActorDto],
        shows: &[ShowDto],
        now: DateTime<Utc>,
    ) -> Result<Snapshot, MirrorError> {
        let snapshot = Snapshot {
            actors: actors
                .iter()
                .map(|a| CachedActor {
                    id: a.id,
                    first_name: a.first_name.clone(),
                    last_name: a.last_name.clone(),
                    synced_at: now,
                })
                .collect(),
            shows: shows
                .iter()
                .map(|s| CachedShow {
                    id: s.id,
                    date: s.date.clone(),
                    show_time: s.show_time.clone(),
                    synced_at: now,
                })
                .collect(),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, serde_json::to_vec_pretty(&snapshot)?)?;
        fs::rename(&tmp, &self.path)?;

        Ok(snapshot)
    }

    /// Fetches the roster and show list, replacing the snapshot on success.
    /// On a network failure the last snapshot is returned instead; only when
    /// there has never been a sync does the failure surface.
    pub async fn sync(&self, client: &ApiClient) -> Result<MirrorView, MirrorError> {
        let fetched = match client.fetch_actors().await {
            Ok(actors) => match client.fetch_shows().await {
                Ok(shows) => Ok((actors, shows)),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        match fetched {
            Ok((actors, shows)) => {
                let snapshot = self.replace_snapshot(&actors, &shows, Utc::now())?;
                Ok(MirrorView {
                    snapshot,
                    source: Source::Network,
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "online load failed, falling back to snapshot");
                match self.load()? {
                    Some(snapshot) => Ok(MirrorView {
                        snapshot,
                        source: Source::Cache,
                    }),
                    None => Err(MirrorError::Offline(err)),
                }
            }
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
