use crate::error::{GeocoderError, Result};
use crate::types::{GeocodedRecord, LocationRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// One reviewer's working set, from upload through export.
///
/// `original` is the table as uploaded; `geocoded` is set once the pipeline
/// has run and is replaced wholesale by reviewer edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSession {
    pub id: Option<Uuid>,
    pub source_name: String,
    pub original: Vec<LocationRecord>,
    pub geocoded: Option<Vec<GeocodedRecord>>,
    pub created_at: DateTime<Utc>,
}

impl ReviewSession {
    pub fn new(source_name: String, original: Vec<LocationRecord>) -> Self {
        Self {
            id: None,
            source_name,
            original,
            geocoded: None,
            created_at: Utc::now(),
        }
    }
}

/// Session persistence boundary. Sessions live only as long as the process;
/// the server owns one store instance and hands it to handlers explicitly.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, session: &mut ReviewSession) -> Result<()>;
    async fn get_session(&self, id: Uuid) -> Result<Option<ReviewSession>>;
    async fn update_session(&self, session: &ReviewSession) -> Result<()>;
    async fn delete_session(&self, id: Uuid) -> Result<()>;
}

/// In-memory session store
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, ReviewSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, session: &mut ReviewSession) -> Result<()> {
        let id = Uuid::new_v4();
        session.id = Some(id);

        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(id, session.clone());

        debug!(
            "Created session {} with {} records",
            id,
            session.original.len()
        );
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<ReviewSession>> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions.get(&id).cloned())
    }

    async fn update_session(&self, session: &ReviewSession) -> Result<()> {
        let id = session.id.ok_or_else(|| GeocoderError::Api {
            message: "Cannot update session without ID".to_string(),
        })?;

        let mut sessions = self.sessions.lock().unwrap();
        if !sessions.contains_key(&id) {
            return Err(GeocoderError::SessionNotFound(id));
        }
        sessions.insert(id, session.clone());

        debug!("Updated session {}", id);
        Ok(())
    }

    async fn delete_session(&self, id: Uuid) -> Result<()> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.remove(&id);
        Ok(())
    }
}
