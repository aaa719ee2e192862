//! Session Management
//!
//! One `ChatSession` per browser session. `submit` is the presentation
//! loop's turn: blank questions only produce a warning, anything else is
//! appended, dispatched to the agent, and answered.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::Result;
use crate::event::{AgentRun, EventSink};
use crate::reasoning::Agent;
use crate::transcript::Transcript;

/// Warning shown for a blank submission
pub const EMPTY_QUESTION_WARNING: &str = "Please enter a question";

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of one submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Nothing was dispatched; show this to the user
    Warning(String),
    /// The agent answered and the transcript grew by two messages
    Answered(AgentRun),
}

/// A chat session: its transcript plus bookkeeping
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique identifier
    pub id: SessionId,

    /// Conversation history
    pub transcript: Transcript,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a new session
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    /// Create with specific ID
    pub fn with_id(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            transcript: Transcript::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Run one turn.
    ///
    /// On agent failure the user's message stays in the transcript and no
    /// assistant reply is added.
    pub async fn submit(
        &mut self,
        question: &str,
        agent: &Agent,
        events: &EventSink,
    ) -> Result<TurnOutcome> {
        if question.trim().is_empty() {
            return Ok(TurnOutcome::Warning(EMPTY_QUESTION_WARNING.into()));
        }

        self.transcript.push_user(question);
        self.touch();

        let run = agent.run(&self.transcript, events).await?;
        self.transcript.push_assistant(run.answer.clone());
        self.touch();

        Ok(TurnOutcome::Answered(run))
    }

    /// Message count
    pub fn message_count(&self) -> usize {
        self.transcript.len()
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to one session; the lock is held for a whole turn
pub type SessionHandle = Arc<Mutex<ChatSession>>;

/// In-memory session store. Nothing outlives the process.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session
    pub async fn create(&self) -> (SessionId, SessionHandle) {
        let session = ChatSession::new();
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id.clone(), Arc::clone(&handle));
        tracing::debug!(session = %id, "Session created");
        (id, handle)
    }

    /// Look up a session
    pub async fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Drop a session
    pub async fn remove(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drop every session untouched for longer than `max_idle`.
    ///
    /// A session whose lock is held is mid-turn and always survives.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let Some(cutoff) = TimeDelta::from_std(max_idle)
            .ok()
            .and_then(|idle| Utc::now().checked_sub_signed(idle))
        else {
            return 0;
        };
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, handle| {
            handle
                .try_lock()
                .map_or(true, |session| session.updated_at > cutoff)
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
