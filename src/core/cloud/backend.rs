use super::error::BackendError;
use super::models::{NewUser, ProjectRecord, ProjectSummary, ProjectUpsert, UserRecord};

pub type BackendResult<T> = Result<T, BackendError>;

/// Queries against the hosted tables.
///
/// Each method is a single request; nothing is retried or batched.
/// Futures are not `Send`: the browser implementation awaits `fetch`.
#[allow(async_fn_in_trait)]
pub trait CloudBackend {
    /// `bdd_users` row matching both username and password
    async fn find_user(&self, username: &str, password: &str) -> BackendResult<Option<UserRecord>>;

    async fn username_exists(&self, username: &str) -> BackendResult<bool>;

    async fn insert_user(&self, user: &NewUser) -> BackendResult<UserRecord>;

    /// Insert or overwrite the project with the same `(user_id, name)`
    async fn upsert_project(&self, project: &ProjectUpsert) -> BackendResult<Vec<ProjectRecord>>;

    /// Projects of the user, most recently updated first
    async fn list_projects(&self, user_id: &str) -> BackendResult<Vec<ProjectSummary>>;

    /// Project by id, only if it belongs to the user
    async fn get_project(&self, id: &str, user_id: &str) -> BackendResult<Option<ProjectRecord>>;
}
