use std::{sync::Arc, time};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::service::quiz_runner::QuizRunner;

#[derive(Clone)]
pub struct SessionEntry {
    pub(crate) runner: Arc<QuizRunner>,
    pub(crate) last_active: DateTime<Utc>,
}

/// Live quiz sessions by id. Sessions idle for longer than the retention
/// window are shut down by a background sweep.
pub struct SessionRegistry {
    sessions: Arc<DashMap<Uuid, SessionEntry>>,
    retention: Duration,
    cleanup_task: Option<JoinHandle<()>>,
}

impl SessionRegistry {
    pub fn from_retention(retention_minutes: u32) -> Self {
        let mut registry = Self {
            sessions: Arc::new(DashMap::new()),
            retention: Duration::minutes(retention_minutes as i64),
            cleanup_task: None,
        };

        registry.spawn_cleanup();
        registry
    }

    pub fn insert(&self, runner: QuizRunner) -> (Uuid, Arc<QuizRunner>) {
        let id = Uuid::new_v4();
        let runner = Arc::new(runner);
        let entry = SessionEntry {
            runner: runner.clone(),
            last_active: Utc::now(),
        };

        self.sessions.insert(id, entry);
        (id, runner)
    }

    /// Looks up a session and marks it as active.
    pub fn get(&self, id: &Uuid) -> Option<Arc<QuizRunner>> {
        let mut entry = self.sessions.get_mut(id)?;
        entry.last_active = Utc::now();
        Some(entry.runner.clone())
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        let Some((_, entry)) = self.sessions.remove(id) else {
            return false;
        };

        entry.runner.shutdown().await;
        true
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Shuts down every session idle since before `now - retention`.
    #[cfg(test)]
    pub async fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        evict_idle(&self.sessions, now - self.retention).await
    }

    fn spawn_cleanup(&mut self) {
        let period = (self.retention / 2).to_std().unwrap_or(time::Duration::from_secs(60));
        let period = period.max(time::Duration::from_secs(1));
        let sessions = self.sessions.clone();
        let retention = self.retention;

        let mut ticker = tokio::time::interval(period);
        self.cleanup_task = Some(tokio::spawn(async move {
            loop {
                ticker.tick().await;
                evict_idle(&sessions, Utc::now() - retention).await;
            }
        }));
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        if let Some(task) = self.cleanup_task.take() {
            task.abort();
        }
    }
}

async fn evict_idle(sessions: &DashMap<Uuid, SessionEntry>, threshold: DateTime<Utc>) -> usize {
    let expired: Vec<Uuid> = sessions
        .iter()
        .filter(|entry| entry.last_active < threshold)
        .map(|entry| *entry.key())
        .collect();

    let runners: Vec<Arc<QuizRunner>> = expired
        .iter()
        .filter_map(|id| sessions.remove(id).map(|(_, entry)| entry.runner))
        .collect();

    join_all(runners.iter().map(|runner| runner.shutdown())).await;

    if !runners.is_empty() {
        info!("Evicted {} idle quiz sessions", runners.len());
    }

    runners.len()
}
