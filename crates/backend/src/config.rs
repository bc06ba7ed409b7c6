//! Configuration options for the backend client

use std::path::PathBuf;
use std::time::Duration;

/// Configuration options for the backend client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Whether to persist the signed-in session to `session_path`
    pub persist_session: bool,

    /// Where the session is persisted
    pub session_path: Option<PathBuf>,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The database schema
    pub db_schema: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            persist_session: false,
            session_path: None,
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
        }
    }
}

impl ClientOptions {
    /// Persist the session to the given file
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_session = true;
        self.session_path = Some(path.into());
        self
    }

    /// The session file, if persistence is on
    pub(crate) fn session_file(&self) -> Option<&PathBuf> {
        if self.persist_session {
            self.session_path.as_ref()
        } else {
            None
        }
    }
}
