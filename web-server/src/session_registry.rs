// web-server/src/session_registry.rs
use actix::{Actor, ActorContext, AsyncContext, Context, Handler, Message, MessageResult, Running, SpawnHandle};
use common::models::session::SessionRecord;
use std::collections::HashMap;
use std::time::Duration;

// Default session TTL in seconds (24 hours)
const DEFAULT_SESSION_TTL: i64 = 86400;

/// Actor message: Store (or replace) a session record
#[derive(Message)]
#[rtype(result = "()")]
pub struct StoreSession {
    pub session_id: String,
    pub record: SessionRecord,
}

/// Actor message: Fetch a live session record
#[derive(Message)]
#[rtype(result = "Option<SessionRecord>")]
pub struct FetchSession {
    pub session_id: String,
}

/// Actor message: Remove a session record
#[derive(Message)]
#[rtype(result = "bool")]
pub struct RemoveSession {
    pub session_id: String,
}

/// Actor message: Clean up expired sessions
#[derive(Message)]
#[rtype(result = "usize")]
pub struct CleanupExpiredSessions;

/// Actor message: Stop the registry and its cleanup timer
#[derive(Message)]
#[rtype(result = "()")]
pub struct StopRegistry;

/// Owns the in-process session map; expiry is enforced on read and by a periodic sweep
pub struct SessionRegistryActor {
    sessions: HashMap<String, SessionRecord>,
    session_ttl: i64,
    cleanup_interval: u64,
    cleanup_task: Option<SpawnHandle>,
    expired_count: usize,
}

impl Default for SessionRegistryActor {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistryActor {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            session_ttl: DEFAULT_SESSION_TTL,
            cleanup_interval: 3600, // Run cleanup every hour
            cleanup_task: None,
            expired_count: 0,
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: i64) -> Self {
        self.session_ttl = ttl_seconds;
        self
    }

    pub fn with_cleanup_interval(mut self, interval_seconds: u64) -> Self {
        self.cleanup_interval = interval_seconds.max(1);
        self
    }

    fn cleanup_sessions(&mut self) -> usize {
        let ttl = self.session_ttl;
        let before = self.sessions.len();
        self.sessions.retain(|_, record| !record.is_expired(ttl));

        let removed = before - self.sessions.len();
        self.expired_count += removed;
        removed
    }
}

impl Actor for SessionRegistryActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("SessionRegistryActor started with TTL: {}s", self.session_ttl);

        // The sweep timer needs a tokio reactor; expiry on read still applies without one
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!("No runtime timer available, periodic session cleanup disabled");
            return;
        }

        let handle = ctx.run_interval(Duration::from_secs(self.cleanup_interval), |act, _ctx| {
            let expired = act.cleanup_sessions();
            if expired > 0 {
                tracing::info!("Cleaned up {} expired sessions", expired);
            }
        });
        self.cleanup_task = Some(handle);
    }

    fn stopping(&mut self, ctx: &mut Self::Context) -> Running {
        if let Some(handle) = self.cleanup_task.take() {
            ctx.cancel_future(handle);
        }
        Running::Stop
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(
            "SessionRegistryActor stopped. {} live sessions, {} expired during lifetime",
            self.sessions.len(),
            self.expired_count
        );
    }
}

impl Handler<StoreSession> for SessionRegistryActor {
    type Result = ();

    fn handle(&mut self, msg: StoreSession, _ctx: &mut Self::Context) -> Self::Result {
        tracing::debug!(user_id = %msg.record.user_id, "Stored session");
        self.sessions.insert(msg.session_id, msg.record);
    }
}

impl Handler<FetchSession> for SessionRegistryActor {
    type Result = MessageResult<FetchSession>;

    fn handle(&mut self, msg: FetchSession, _ctx: &mut Self::Context) -> Self::Result {
        match self.sessions.get(&msg.session_id) {
            Some(record) if !record.is_expired(self.session_ttl) => {
                return MessageResult(Some(record.clone()))
            }
            Some(_) => {}
            None => return MessageResult(None),
        }

        self.sessions.remove(&msg.session_id);
        self.expired_count += 1;
        tracing::debug!("Session expired on read");
        MessageResult(None)
    }
}

impl Handler<RemoveSession> for SessionRegistryActor {
    type Result = MessageResult<RemoveSession>;

    fn handle(&mut self, msg: RemoveSession, _ctx: &mut Self::Context) -> Self::Result {
        let removed = self.sessions.remove(&msg.session_id);
        if let Some(record) = &removed {
            tracing::info!(user_id = %record.user_id, "Session destroyed");
        }
        MessageResult(removed.is_some())
    }
}

impl Handler<CleanupExpiredSessions> for SessionRegistryActor {
    type Result = MessageResult<CleanupExpiredSessions>;

    fn handle(&mut self, _msg: CleanupExpiredSessions, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.cleanup_sessions())
    }
}

impl Handler<StopRegistry> for SessionRegistryActor {
    type Result = ();

    fn handle(&mut self, _msg: StopRegistry, ctx: &mut Self::Context) -> Self::Result {
        ctx.stop();
    }
}
