//! Client-side session: the bearer token, the signed-in user and the
//! recent-documents list, persisted through a [`LocalStore`].

pub mod history;
pub mod store;

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

pub use history::{RecentDocument, RecentDocuments, MAX_RECENT_DOCUMENTS};
pub use store::{FileStore, LocalStore, MemoryStore, StoreError};

use crate::auth::UserInfo;
use crate::generation::GenerationResult;

pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "user";
pub const RECENT_DOCUMENTS_KEY: &str = "recentDhaDocuments";

/// Where the UI goes after the session is dropped.
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Default)]
struct Credentials {
    token: Option<String>,
    user: Option<UserInfo>,
}

pub struct Session {
    store: Arc<dyn LocalStore>,
    credentials: RwLock<Credentials>,
    // Serializes the read-modify-write of the history list.
    history: Mutex<()>,
}

impl Session {
    /// Load whatever a previous run left in `store`.
    ///
    /// A user entry that no longer parses is discarded with a warning; the
    /// token on its own still counts as a session.
    pub fn restore(store: Arc<dyn LocalStore>) -> Result<Self, StoreError> {
        let token = store.get(AUTH_TOKEN_KEY)?.filter(|t| !t.is_empty());
        let user = match store.get(USER_KEY)? {
            Some(raw) => match serde_json::from_str::<UserInfo>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    log::warn!("Discarding stored user: {}", e);
                    store.remove(USER_KEY)?;
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            store,
            credentials: RwLock::new(Credentials { token, user }),
            history: Mutex::new(()),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            credentials: RwLock::new(Credentials::default()),
            history: Mutex::new(()),
        }
    }

    /// Persist `token` and `user`, then adopt them. A failed write leaves
    /// neither key behind.
    pub fn login(&self, token: &str, user: UserInfo) -> Result<(), StoreError> {
        self.store.set(USER_KEY, &serde_json::to_string(&user)?)?;
        if let Err(e) = self.store.set(AUTH_TOKEN_KEY, token) {
            if let Err(rollback) = self.store.remove(USER_KEY) {
                log::warn!("Failed to roll back stored user: {}", rollback);
            }
            return Err(e);
        }
        log::info!("Signed in as '{}'", user.username);

        let mut creds = self.credentials.write();
        creds.token = Some(token.to_string());
        creds.user = Some(user);
        Ok(())
    }

    /// Drop the token and user. Recent documents survive a logout.
    pub fn logout(&self) -> Result<(), StoreError> {
        {
            let mut creds = self.credentials.write();
            creds.token = None;
            creds.user = None;
        }
        self.store.remove(AUTH_TOKEN_KEY)?;
        self.store.remove(USER_KEY)
    }

    pub fn token(&self) -> Option<String> {
        self.credentials.read().token.clone()
    }

    pub fn user(&self) -> Option<UserInfo> {
        self.credentials.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.read().token.is_some()
    }

    /// `Authorization` header value, if signed in.
    pub fn bearer(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {}", t))
    }

    pub fn recent_documents(&self) -> Result<RecentDocuments, StoreError> {
        let _guard = self.history.lock();
        self.load_history()
    }

    /// Record a freshly generated document at the head of the history.
    pub fn remember(
        &self,
        result: &GenerationResult,
        full_name: &str,
    ) -> Result<RecentDocuments, StoreError> {
        let _guard = self.history.lock();
        let mut recent = self.load_history()?;
        if let Some(evicted) = recent.push(RecentDocument::from_result(result, full_name)) {
            log::debug!("Evicted {} from recent documents", evicted.document_number);
        }
        self.store
            .set(RECENT_DOCUMENTS_KEY, &serde_json::to_string(&recent)?)?;
        Ok(recent)
    }

    fn load_history(&self) -> Result<RecentDocuments, StoreError> {
        let Some(raw) = self.store.get(RECENT_DOCUMENTS_KEY)? else {
            return Ok(RecentDocuments::new());
        };
        match serde_json::from_str::<RecentDocuments>(&raw) {
            Ok(mut recent) => {
                recent.truncate();
                Ok(recent)
            }
            Err(e) => {
                log::warn!("Discarding unreadable recent documents: {}", e);
                Ok(RecentDocuments::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> UserInfo {
        UserInfo {
            id: "admin".to_string(),
            username: "admin".to_string(),
            role: "admin".to_string(),
        }
    }

    fn result(n: usize) -> GenerationResult {
        GenerationResult {
            document_type: "birth_certificate".to_string(),
            document_number: format!("BC25{:08X}", n),
            registration_number: format!("DHA-20250101-{:06}", n),
            pdf_base64: "JVBERi0=".to_string(),
            qr_code: format!("http://localhost/verify/{}", n),
            verification_url: format!("http://localhost/verify/{}", n),
            filename: format!("birth_certificate-{}.pdf", n),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_login_persists_and_restores() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let session = Session::restore(store.clone()).unwrap();
        assert!(!session.is_authenticated());

        session.login("tok", user()).unwrap();
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("tok"));

        let restored = Session::restore(store).unwrap();
        assert!(restored.is_authenticated());
        assert_eq!(restored.bearer().as_deref(), Some("Bearer tok"));
        assert_eq!(restored.user().unwrap().username, "admin");
    }

    /// Rejects writes to one key.
    struct FailingStore {
        inner: MemoryStore,
        failing_key: &'static str,
    }

    impl LocalStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if key == self.failing_key {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_login_persists_nothing() {
        for failing_key in [AUTH_TOKEN_KEY, USER_KEY] {
            let store: Arc<dyn LocalStore> = Arc::new(FailingStore {
                inner: MemoryStore::new(),
                failing_key,
            });
            let session = Session::restore(store.clone()).unwrap();

            assert!(session.login("tok", user()).is_err());
            assert!(!session.is_authenticated());
            assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), None);
            assert_eq!(store.get(USER_KEY).unwrap(), None);
        }
    }

    #[test]
    fn test_logout_keeps_history() {
        let session = Session::in_memory();
        session.login("tok", user()).unwrap();
        session.remember(&result(1), "Jane Doe").unwrap();

        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert_eq!(session.recent_documents().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_user_is_discarded() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        store.set(AUTH_TOKEN_KEY, "tok").unwrap();
        store.set(USER_KEY, "{broken").unwrap();

        let session = Session::restore(store.clone()).unwrap();
        assert!(session.is_authenticated());
        assert!(session.user().is_none());
        assert_eq!(store.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_history_is_capped() {
        let session = Session::in_memory();
        for n in 0..(MAX_RECENT_DOCUMENTS + 3) {
            session.remember(&result(n), "Jane Doe").unwrap();
        }
        let recent = session.recent_documents().unwrap();
        assert_eq!(recent.len(), MAX_RECENT_DOCUMENTS);
        assert_eq!(
            recent.iter().next().unwrap().document_number,
            result(MAX_RECENT_DOCUMENTS + 2).document_number
        );
        assert!(recent
            .iter()
            .all(|d| d.document_number != result(0).document_number));
    }
}
