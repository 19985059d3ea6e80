//! In-memory session store keyed by a stable hash of the user's email.
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::{Error, Result};
use crate::traits::SessionStore;
use crate::types::{HistoryRecord, Session};

const USER_ID_HEX_LEN: usize = 16;

/// First 16 hex chars of SHA-256 over the trimmed, lower-cased email.
pub fn user_id_for_email(email: &str) -> Result<String> {
    let email_norm = email.trim().to_lowercase();
    if email_norm.is_empty() {
        return Err(Error::InvalidQuery("email required".to_string()));
    }
    let digest = Sha256::digest(email_norm.as_bytes());
    let mut hex = String::with_capacity(USER_ID_HEX_LEN);
    for byte in digest.iter().take(USER_ID_HEX_LEN / 2) {
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(hex)
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn init(&self, name: &str, email: &str) -> Result<Session> {
        let user_id = user_id_for_email(email)?;
        let mut sessions = self.sessions.write();
        let session = sessions.entry(user_id.clone()).or_insert_with(|| {
            let name = name.trim();
            Session {
                user_id,
                name: if name.is_empty() { "User".to_string() } else { name.to_string() },
                email: email.trim().to_lowercase(),
                history: Vec::new(),
            }
        });
        Ok(session.clone())
    }

    fn get(&self, user_id: &str) -> Option<Session> {
        self.sessions.read().get(user_id).cloned()
    }

    fn append(&self, user_id: &str, record: HistoryRecord) -> bool {
        match self.sessions.write().get_mut(user_id) {
            Some(session) => {
                session.history.push(record);
                true
            }
            None => false,
        }
    }

    fn update_last_answer(&self, user_id: &str, answer: &str) -> bool {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(user_id).and_then(|s| s.history.last_mut()) {
            Some(last) => {
                last.answer = answer.to_string();
                true
            }
            None => false,
        }
    }
}
