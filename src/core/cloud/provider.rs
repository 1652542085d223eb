//! Cloud provider: account and project operations on top of a
//! [`CloudBackend`], with the logged-in user kept in a [`SessionStore`].

use std::cell::RefCell;

use chrono::{DateTime, Utc};

use super::backend::CloudBackend;
use super::error::{CloudError, CloudResult};
use super::models::{NewUser, ProjectRecord, ProjectSummary, ProjectUpsert, UserRecord};
use crate::core::SchemaState;
use crate::core::session::SessionStore;

pub struct CloudProvider<B, S> {
    /// `None` when the backend could not be configured
    backend: Option<B>,
    session: S,
    current_user: RefCell<Option<UserRecord>>,
    clock: fn() -> DateTime<Utc>,
}

impl<B: CloudBackend, S: SessionStore> CloudProvider<B, S> {
    /// Creates the provider and restores the user from the session store
    pub fn new(backend: Option<B>, session: S) -> Self {
        let current_user = session.load();
        Self {
            backend,
            session,
            current_user: RefCell::new(current_user),
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    pub fn current_user(&self) -> Option<UserRecord> {
        self.current_user.borrow().clone()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    fn client(&self) -> CloudResult<&B> {
        self.backend.as_ref().ok_or(CloudError::NotInitialized)
    }

    fn require_user(&self) -> CloudResult<UserRecord> {
        self.current_user().ok_or(CloudError::NotLoggedIn)
    }

    fn set_user(&self, user: UserRecord) {
        if let Err(e) = self.session.save(&user) {
            leptos::logging::warn!("Failed to persist session: {}", e);
        }
        *self.current_user.borrow_mut() = Some(user);
    }

    pub async fn login(&self, username: &str, password: &str) -> CloudResult<UserRecord> {
        let client = self.client()?;
        let user = client
            .find_user(username, password)
            .await?
            .ok_or(CloudError::InvalidCredentials)?;

        leptos::logging::log!("Logged in as {}", user.username);
        self.set_user(user.clone());
        Ok(user)
    }

    pub async fn register(&self, username: &str, password: &str) -> CloudResult<UserRecord> {
        let client = self.client()?;
        if client.username_exists(username).await? {
            return Err(CloudError::UsernameTaken);
        }
        let user = client
            .insert_user(&NewUser {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;

        leptos::logging::log!("Registered {}", user.username);
        self.set_user(user.clone());
        Ok(user)
    }

    pub fn logout(&self) {
        self.current_user.borrow_mut().take();
        self.session.clear();
    }

    /// Saves the schema under `name`, overwriting the user's project with
    /// the same name
    pub async fn save_project(
        &self,
        name: &str,
        state: &SchemaState,
    ) -> CloudResult<Vec<ProjectRecord>> {
        let client = self.client()?;
        let user = self.require_user()?;
        let data = serde_json::to_value(state).map_err(|e| CloudError::Decode(e.to_string()))?;

        let rows = client
            .upsert_project(&ProjectUpsert {
                user_id: user.id,
                name: name.to_string(),
                data,
                updated_at: (self.clock)(),
            })
            .await?;
        leptos::logging::log!("Project '{}' saved ({} rows)", name, rows.len());
        Ok(rows)
    }

    /// Projects of the current user; empty when nobody is logged in
    pub async fn list_projects(&self) -> CloudResult<Vec<ProjectSummary>> {
        let client = self.client()?;
        let Some(user) = self.current_user() else {
            return Ok(Vec::new());
        };
        Ok(client.list_projects(&user.id).await?)
    }

    pub async fn get_project(&self, id: &str) -> CloudResult<ProjectRecord> {
        let client = self.client()?;
        let user = self.require_user()?;
        client
            .get_project(id, &user.id)
            .await?
            .ok_or(CloudError::NotFound)
    }

    /// Fetches a project and decodes its schema
    pub async fn load_schema(&self, id: &str) -> CloudResult<SchemaState> {
        self.get_project(id).await?.schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cloud::memory::MemoryBackend;
    use crate::core::session::{MemorySession, SessionError};
    use crate::core::{Column, Table};
    use futures::executor::block_on;

    type TestProvider = CloudProvider<MemoryBackend, MemorySession>;

    fn provider() -> TestProvider {
        CloudProvider::new(
            Some(MemoryBackend::new().with_user("alice", "secret")),
            MemorySession::new(),
        )
    }

    fn logged_in() -> TestProvider {
        let provider = provider();
        block_on(provider.login("alice", "secret")).unwrap();
        provider
    }

    fn schema() -> SchemaState {
        SchemaState::new().with_table(
            Table::new("t1", "users")
                .with_position(12.5, 40.0)
                .add_column(Column::new("c1", "id", "INT").primary_key())
                .add_column(Column::new("c2", "org_id", "BIGINT").foreign_key()),
        )
    }

    #[test]
    fn test_login_persists_session() {
        let provider = provider();
        let user = block_on(provider.login("alice", "secret")).unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(provider.current_user(), Some(user.clone()));
        assert_eq!(provider.session.load(), Some(user));
    }

    #[test]
    fn test_login_with_wrong_password() {
        let provider = provider();
        let result = block_on(provider.login("alice", "nope"));

        assert_eq!(result, Err(CloudError::InvalidCredentials));
        assert!(provider.current_user().is_none());
        assert!(provider.session.raw().is_none());
    }

    #[test]
    fn test_session_restored_on_construction() {
        let session = MemorySession::new();
        session
            .save(&UserRecord {
                id: "1".into(),
                username: "alice".into(),
                password: None,
            })
            .unwrap();
        let provider = CloudProvider::new(Some(MemoryBackend::new()), session);

        assert_eq!(provider.current_user().unwrap().username, "alice");
    }

    #[test]
    fn test_logout_clears_session() {
        let provider = logged_in();
        provider.logout();

        assert!(provider.current_user().is_none());
        assert!(provider.session.raw().is_none());
    }

    #[test]
    fn test_register_then_duplicate() {
        let provider = provider();
        let user = block_on(provider.register("bob", "pw")).unwrap();
        assert_eq!(provider.current_user(), Some(user));

        let again = block_on(provider.register("bob", "other"));
        assert_eq!(again, Err(CloudError::UsernameTaken));
    }

    #[test]
    fn test_uninitialized_short_circuits() {
        let provider: TestProvider = CloudProvider::new(None, MemorySession::new());

        assert!(!provider.is_initialized());
        assert_eq!(
            block_on(provider.login("a", "b")),
            Err(CloudError::NotInitialized)
        );
        assert_eq!(
            block_on(provider.save_project("x", &schema())),
            Err(CloudError::NotInitialized)
        );
        assert_eq!(block_on(provider.list_projects()), Err(CloudError::NotInitialized));
        assert_eq!(block_on(provider.get_project("1")), Err(CloudError::NotInitialized));
    }

    #[test]
    fn test_not_logged_in_guards_skip_the_backend() {
        let provider = provider();

        assert_eq!(
            block_on(provider.save_project("x", &schema())),
            Err(CloudError::NotLoggedIn)
        );
        assert_eq!(block_on(provider.get_project("1")), Err(CloudError::NotLoggedIn));
        assert_eq!(block_on(provider.list_projects()), Ok(Vec::new()));
        assert_eq!(provider.backend().unwrap().request_count(), 0);
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let provider = logged_in();
        let original = schema();

        let rows = block_on(provider.save_project("My Database", &original)).unwrap();
        let loaded = block_on(provider.load_schema(&rows[0].id)).unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn test_save_same_name_overwrites() {
        let provider = logged_in();
        block_on(provider.save_project("shop", &SchemaState::new())).unwrap();
        let rows = block_on(provider.save_project("shop", &schema())).unwrap();

        assert_eq!(provider.backend().unwrap().project_count(), 1);
        assert_eq!(rows[0].schema().unwrap(), schema());
    }

    #[test]
    fn test_list_newest_first() {
        fn early() -> DateTime<Utc> {
            "2025-01-01T00:00:00Z".parse().unwrap()
        }
        fn late() -> DateTime<Utc> {
            "2025-06-01T00:00:00Z".parse().unwrap()
        }

        let provider = logged_in().with_clock(early);
        block_on(provider.save_project("first", &schema())).unwrap();
        let provider = provider.with_clock(late);
        block_on(provider.save_project("second", &schema())).unwrap();

        let names: Vec<String> = block_on(provider.list_projects())
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[test]
    fn test_get_project_is_owner_scoped() {
        let provider = logged_in();
        let rows = block_on(provider.save_project("private", &schema())).unwrap();
        provider.logout();

        block_on(provider.register("mallory", "pw")).unwrap();
        assert_eq!(
            block_on(provider.get_project(&rows[0].id)),
            Err(CloudError::NotFound)
        );
        assert!(block_on(provider.list_projects()).unwrap().is_empty());
    }

    /// Storage that refuses writes, like a browser with localStorage disabled
    struct ReadOnlySession;

    impl SessionStore for ReadOnlySession {
        fn load(&self) -> Option<UserRecord> {
            None
        }

        fn save(&self, _user: &UserRecord) -> Result<(), SessionError> {
            Err(SessionError::Unavailable)
        }

        fn clear(&self) {}
    }

    #[test]
    fn test_login_survives_session_write_failure() {
        let provider = CloudProvider::new(
            Some(MemoryBackend::new().with_user("alice", "secret")),
            ReadOnlySession,
        );

        let user = block_on(provider.login("alice", "secret")).unwrap();
        assert_eq!(provider.current_user(), Some(user));

        let saved = block_on(provider.save_project("Shop", &schema())).unwrap();
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn test_backend_errors_are_surfaced() {
        let provider = logged_in();
        provider.backend().unwrap().fail_with("connection reset");

        let error = block_on(provider.list_projects()).unwrap_err();
        assert_eq!(error.to_string(), "connection reset");

        provider.backend().unwrap().recover();
        assert!(block_on(provider.list_projects()).is_ok());
    }
}
