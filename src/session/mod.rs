//! Interactive sessions.
//!
//! A session is one browser-connected instance of the app and the unit of
//! state isolation: it owns a [`ConversationStore`], the last uploaded file
//! and the display toggles. Nothing is shared between sessions.

pub mod registry;
pub mod sweeper;

pub use registry::SessionRegistry;
pub use sweeper::SessionSweeper;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::chat::ConversationStore;
use crate::table::{Table, TableResult, TableSummary};

/// Identifier of an interactive session (carried in a cookie).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Raw bytes of the last uploaded file. The table is re-parsed on demand.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original file name.
    pub file_name: String,
    /// File content as received.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Parse the stored bytes.
    ///
    /// # Errors
    /// Returns the parser error for malformed content.
    pub fn table(&self) -> TableResult<Table> {
        Table::parse(&self.bytes)
    }

    /// Parse the stored bytes and render the prompt summary.
    ///
    /// # Errors
    /// Returns the parser error for malformed content.
    pub fn summary(&self) -> TableResult<String> {
        self.table().map(|t| TableSummary::from_table(&t).render())
    }
}

/// Display toggles of the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Show the uploaded table.
    pub show_table: bool,
    /// Show the descriptive statistics.
    pub show_stats: bool,
}

/// Mutable state of one session.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Conversations of the session.
    pub conversations: ConversationStore,
    /// Last uploaded file, if any.
    pub upload: Option<Upload>,
    /// Display toggles.
    pub display: DisplayOptions,
}

/// One interactive session.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    state: Mutex<SessionState>,
    cancel: CancellationToken,
    last_seen_ms: AtomicI64,
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            state: Mutex::new(SessionState::default()),
            cancel: CancellationToken::new(),
            last_seen_ms: AtomicI64::new(Utc::now().timestamp_millis()),
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Lock the session state. Do not hold the guard across remote calls.
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    /// Token cancelled when the session ends.
    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel every in-flight request of this session.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the session has ended.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Record activity now.
    pub fn touch(&self) {
        self.last_seen_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Last activity as milliseconds since the Unix epoch.
    #[must_use]
    pub fn last_seen_ms(&self) -> i64 {
        self.last_seen_ms.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{Message, Role};

    #[test]
    fn test_session_id_roundtrip() {
        let id = SessionId::new();
        let parsed: Result<SessionId, _> = id.to_string().parse();
        assert_eq!(parsed.ok(), Some(id));
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }

    #[test]
    fn test_upload_summary_is_recomputed() {
        let upload = Upload {
            file_name: "data.csv".to_string(),
            bytes: b"a,b\n1,2\n".to_vec(),
        };
        let first = upload.summary().unwrap_or_default();
        let second = upload.summary().unwrap_or_default();
        assert_eq!(first, second);
        assert!(first.contains("1 rows and 2 columns"));

        let broken = Upload {
            file_name: "bad.csv".to_string(),
            bytes: b"a,b\n1\n".to_vec(),
        };
        assert!(broken.summary().is_err());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let first = Session::new(SessionId::new());
        let second = Session::new(SessionId::new());

        {
            let mut state = first.lock().await;
            state
                .conversations
                .create_conversation(Some(Message::user("only in first")));
        }

        assert_eq!(first.lock().await.conversations.len(), 1);
        assert!(second.lock().await.conversations.is_empty());
        assert_eq!(
            first.lock().await.conversations.current_messages()[0].role(),
            Role::User
        );
    }

    #[test]
    fn test_cancel_marks_ended() {
        let session = Session::new(SessionId::new());
        assert!(!session.is_ended());
        session.cancel();
        assert!(session.is_ended());
        assert!(session.cancel_token().is_cancelled());
    }
}
