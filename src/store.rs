use crate::conversation::Conversation;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
#[error("session not found: {0}")]
pub struct SessionNotFound(pub Uuid);

/// One user session: a conversation plus a version counter bumped on
/// every reset. The counter lets the controller recognize a response
/// that resolved against an older lifecycle.
#[derive(Debug)]
pub struct Session {
    pub conversation: Conversation,
    version: u64,
}

impl Session {
    fn new(system_text: &str) -> Self {
        Session {
            conversation: Conversation::new(system_text),
            version: 1,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Start a fresh lifecycle: re-create the system turn, re-inject the
    /// document recovered from the injected turn, drop all Q&A turns.
    pub fn reset(&mut self, system_text: &str, max_chars: usize) {
        let doc = self.conversation.document_text().map(str::to_owned);
        self.conversation.reset(system_text, doc.as_deref(), max_chars);
        self.version += 1;
    }
}

/// In-memory session registry. Each id owns its conversation; nothing is
/// ever shared between sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore::default()
    }

    pub fn create(&self, system_text: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .lock()
            .unwrap()
            .insert(id, Session::new(system_text));
        id
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions.lock().unwrap().remove(&id).is_some()
    }

    /// Run `f` against the session's state under the lock.
    pub fn with<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, SessionNotFound> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.get_mut(&id).ok_or(SessionNotFound(id))?;
        Ok(f(session))
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.create("sys");
        let b = store.create("sys");
        assert_ne!(a, b);

        store
            .with(a, |s| s.conversation.append_question("only in a").unwrap())
            .unwrap();

        let len_a = store.with(a, |s| s.conversation.len()).unwrap();
        let len_b = store.with(b, |s| s.conversation.len()).unwrap();
        assert_eq!(len_a, 2);
        assert_eq!(len_b, 1);
    }

    #[test]
    fn test_reset_bumps_version_and_keeps_document() {
        let store = SessionStore::new();
        let id = store.create("sys");
        store
            .with(id, |s| {
                s.conversation.inject_document("doc text", 1000);
                s.conversation.append_question("q").unwrap();
                assert_eq!(s.version(), 1);
                s.reset("sys", 1000);
                assert_eq!(s.version(), 2);
                assert_eq!(s.conversation.len(), 2);
                assert_eq!(s.conversation.turns()[0].role, Role::System);
                assert_eq!(s.conversation.document_text(), Some("doc text"));
            })
            .unwrap();
    }

    #[test]
    fn test_remove_and_unknown_id() {
        let store = SessionStore::new();
        let id = store.create("sys");
        assert_eq!(store.len(), 1);
        assert!(store.remove(id));
        assert!(!store.remove(id));
        assert!(store.is_empty());
        assert!(store.with(id, |_| ()).is_err());
    }
}
