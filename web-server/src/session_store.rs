// web-server/src/session_store.rs
use actix::Addr;
use async_trait::async_trait;
use common::models::session::SessionRecord;

use crate::error::GatewayError;
use crate::session_registry::{FetchSession, RemoveSession, SessionRegistryActor, StoreSession};

/// Server-side session storage keyed by the id carried in the session cookie.
/// Records are written wholesale at login and deleted wholesale at logout.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, GatewayError>;

    async fn set(&self, session_id: &str, record: SessionRecord) -> Result<(), GatewayError>;

    /// Returns whether a record existed
    async fn delete(&self, session_id: &str) -> Result<bool, GatewayError>;
}

/// `SessionStore` backed by the in-process registry actor
#[derive(Clone)]
pub struct ActorSessionStore {
    registry: Addr<SessionRegistryActor>,
}

impl ActorSessionStore {
    pub fn new(registry: Addr<SessionRegistryActor>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl SessionStore for ActorSessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, GatewayError> {
        let record = self
            .registry
            .send(FetchSession {
                session_id: session_id.to_string(),
            })
            .await?;
        Ok(record)
    }

    async fn set(&self, session_id: &str, record: SessionRecord) -> Result<(), GatewayError> {
        self.registry
            .send(StoreSession {
                session_id: session_id.to_string(),
                record,
            })
            .await?;
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<bool, GatewayError> {
        let removed = self
            .registry
            .send(RemoveSession {
                session_id: session_id.to_string(),
            })
            .await?;
        Ok(removed)
    }
}
