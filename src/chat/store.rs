//! File-backed session storage.
//!
//! One JSON document per session, named `<session_id>.json` under a
//! configurable directory. Saves are always full-document overwrites via a
//! temp file and an atomic rename; there is no locking or versioning, so
//! concurrent writers to the same session race (last writer wins).

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::warn;

use crate::chat::config::StorageConfig;
use crate::chat::errors::{ChatError, ChatResult};
use crate::chat::session::{Session, SessionId, SessionSummary};

/// Boxed future type for store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Session store trait.
pub trait SessionStore: Send + Sync {
    /// Read the persisted record for an identifier.
    ///
    /// # Errors
    /// `NotFound` when no record exists, `CorruptSession` when the record
    /// cannot be parsed, `Storage` on I/O failure.
    fn load(&self, id: SessionId) -> StoreFuture<'_, ChatResult<Session>>;

    /// Allocate a new session with a fresh identifier and an empty message
    /// sequence. Nothing is persisted until the first `save`.
    fn create(&self) -> Session;

    /// Serialize the full session and replace any prior record content.
    ///
    /// # Errors
    /// Returns an error if serialization or storage access fails.
    fn save(&self, session: &Session) -> StoreFuture<'_, ChatResult<()>>;

    /// Enumerate all persisted sessions, most-recently-updated first.
    ///
    /// # Errors
    /// Returns an error if the storage directory cannot be read.
    fn list(&self) -> StoreFuture<'_, ChatResult<Vec<SessionSummary>>>;

    /// Remove the persisted record.
    ///
    /// # Errors
    /// `NotFound` when no record exists, `Storage` on I/O failure.
    fn delete(&self, id: SessionId) -> StoreFuture<'_, ChatResult<()>>;
}

/// File-system implementation of the session store.
pub struct FileSessionStore {
    base_dir: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at the configured sessions directory.
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            base_dir: config.sessions_dir.clone(),
        }
    }

    /// Create a store rooted at an explicit directory.
    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn session_path(&self, id: SessionId) -> PathBuf {
        self.base_dir.join(format!("{id}.json"))
    }

    async fn read_session(path: &Path, id: SessionId) -> ChatResult<Session> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ChatError::NotFound(id.to_string()));
            }
            Err(err) => return Err(ChatError::Storage(err)),
        };

        serde_json::from_str(&content).map_err(|source| ChatError::CorruptSession {
            id: id.to_string(),
            source,
        })
    }

    async fn write_session(&self, session: &Session) -> ChatResult<()> {
        tokio::fs::create_dir_all(&self.base_dir).await?;

        let path = self.session_path(session.session_id);
        let tmp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(session)?;

        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, id: SessionId) -> StoreFuture<'_, ChatResult<Session>> {
        Box::pin(async move {
            let path = self.session_path(id);
            Self::read_session(&path, id).await
        })
    }

    fn create(&self) -> Session {
        Session::new()
    }

    fn save(&self, session: &Session) -> StoreFuture<'_, ChatResult<()>> {
        let session = session.clone();
        Box::pin(async move { self.write_session(&session).await })
    }

    fn list(&self) -> StoreFuture<'_, ChatResult<Vec<SessionSummary>>> {
        Box::pin(async move {
            let mut entries = match tokio::fs::read_dir(&self.base_dir).await {
                Ok(entries) => entries,
                // A store that was never written to has no sessions.
                Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
                Err(err) => return Err(ChatError::Storage(err)),
            };

            let mut summaries = Vec::new();
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                    continue;
                }
                let Some(id) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| stem.parse::<SessionId>().ok())
                else {
                    continue;
                };

                match Self::read_session(&path, id).await {
                    Ok(session) => summaries.push(session.summary()),
                    Err(err) => {
                        warn!("Skipping unreadable session record {id}: {err}");
                    }
                }
            }

            summaries.sort_by(|a, b| {
                b.updated_at
                    .cmp(&a.updated_at)
                    .then_with(|| a.session_id.cmp(&b.session_id))
            });

            Ok(summaries)
        })
    }

    fn delete(&self, id: SessionId) -> StoreFuture<'_, ChatResult<()>> {
        Box::pin(async move {
            let path = self.session_path(id);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    Err(ChatError::NotFound(id.to_string()))
                }
                Err(err) => Err(ChatError::Storage(err)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::session::ChatMessage;
    use tempfile::TempDir;

    fn test_store() -> (FileSessionStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::with_base_dir(dir.path());
        (store, dir)
    }

    fn session_with_turn(user: &str, assistant: &str) -> Session {
        let mut session = Session::new();
        session.messages.push(ChatMessage::user(user));
        session.messages.push(ChatMessage::assistant(assistant));
        session
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let (store, _dir) = test_store();
        let session = session_with_turn("What is cotton candy?", "Spun sugar.");

        store.save(&session).await.unwrap();
        let loaded = store.load(session.session_id).await.unwrap();

        assert_eq!(loaded.session_id, session.session_id);
        assert_eq!(loaded.message_count(), 2);
        assert_eq!(loaded.messages[0].content, "What is cotton candy?");
        assert_eq!(loaded.messages[1].content, "Spun sugar.");
    }

    #[tokio::test]
    async fn test_load_unknown_id_is_not_found() {
        let (store, _dir) = test_store();
        let result = store.load(SessionId::new()).await;
        assert!(matches!(result, Err(ChatError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_corrupt_record_is_distinct_from_not_found() {
        let (store, dir) = test_store();
        let id = SessionId::new();
        std::fs::write(dir.path().join(format!("{id}.json")), "{ not json").unwrap();

        let result = store.load(id).await;
        assert!(matches!(result, Err(ChatError::CorruptSession { .. })));
    }

    #[tokio::test]
    async fn test_save_is_full_overwrite() {
        let (store, _dir) = test_store();
        let mut session = session_with_turn("first", "reply one");
        store.save(&session).await.unwrap();

        session.messages.push(ChatMessage::user("second"));
        session.messages.push(ChatMessage::assistant("reply two"));
        store.save(&session).await.unwrap();

        let loaded = store.load(session.session_id).await.unwrap();
        assert_eq!(loaded.message_count(), 4);
    }

    #[tokio::test]
    async fn test_delete_then_load_is_not_found() {
        let (store, _dir) = test_store();
        let session = session_with_turn("hello", "hi");
        store.save(&session).await.unwrap();

        store.delete(session.session_id).await.unwrap();

        let result = store.load(session.session_id).await;
        assert!(matches!(result, Err(ChatError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let (store, _dir) = test_store();
        let result = store.delete(SessionId::new()).await;
        assert!(matches!(result, Err(ChatError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let (store, _dir) = test_store();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_most_recently_updated_first() {
        let (store, _dir) = test_store();

        let mut older = session_with_turn("old", "old reply");
        let mut newer = session_with_turn("new", "new reply");
        older.updated_at = chrono::Utc::now() - chrono::Duration::minutes(5);
        newer.updated_at = chrono::Utc::now();

        store.save(&older).await.unwrap();
        store.save(&newer).await.unwrap();

        let summaries = store.list().await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].session_id, newer.session_id);
        assert_eq!(summaries[1].session_id, older.session_id);
        assert_eq!(summaries[0].message_count, 2);
    }

    #[tokio::test]
    async fn test_every_listed_session_loads() {
        let (store, _dir) = test_store();
        for i in 0..3 {
            let session = session_with_turn(&format!("q{i}"), &format!("a{i}"));
            store.save(&session).await.unwrap();
        }

        for summary in store.list().await.unwrap() {
            assert!(store.load(summary.session_id).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_list_skips_unreadable_records() {
        let (store, dir) = test_store();
        let session = session_with_turn("ok", "fine");
        store.save(&session).await.unwrap();
        std::fs::write(dir.path().join(format!("{}.json", SessionId::new())), "garbage").unwrap();

        let summaries = store.list().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].session_id, session.session_id);
    }

    #[test]
    fn test_create_allocates_unique_empty_sessions() {
        let (store, _dir) = test_store();
        let a = store.create();
        let b = store.create();
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(a.message_count(), 0);
    }
}
