//! In-memory résumé sessions.
//!
//! A session owns exactly one `ResumeRecord`. Edits replace the record under the
//! write lock; builders work on a cloned snapshot taken under the read lock.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::edit::{apply_edits, RecordEdit};
use crate::errors::AppError;
use crate::models::ResumeRecord;

const SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub record: ResumeRecord,
    /// Incremented on every accepted edit batch.
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, record: ResumeRecord) -> Session {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            record,
            revision: 0,
            created_at: now,
            updated_at: now,
        };
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        info!("Opened session {}", session.id);
        session
    }

    pub async fn get(&self, id: Uuid) -> Result<Session, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Clone of the current record, stable for the duration of one build.
    pub async fn snapshot(&self, id: Uuid) -> Result<ResumeRecord, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|session| session.record.clone())
            .ok_or_else(|| not_found(id))
    }

    /// Applies `edits` as one batch. On any rejected edit the stored record is
    /// left untouched.
    pub async fn apply_edits(&self, id: Uuid, edits: &[RecordEdit]) -> Result<Session, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;

        let record = apply_edits(&session.record, edits)?;
        session.record = record;
        session.revision += 1;
        session.updated_at = Utc::now();
        debug!(
            "Session {id} at revision {} after {} edit(s)",
            session.revision,
            edits.len()
        );
        Ok(session.clone())
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!("Closed session {id}"))
            .ok_or_else(|| not_found(id))
    }

    /// Drops sessions not updated since `cutoff`. Returns how many were dropped.
    pub async fn evict_idle(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.updated_at >= cutoff);
        before - sessions.len()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Periodically evicts sessions idle for longer than `idle_minutes`.
pub fn spawn_idle_sweeper(store: SessionStore, idle_minutes: i64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            let cutoff = Utc::now() - chrono::Duration::minutes(idle_minutes);
            let evicted = store.evict_idle(cutoff).await;
            if evicted > 0 {
                info!("Evicted {evicted} idle session(s)");
            }
        }
    })
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
