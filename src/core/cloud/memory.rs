//! In-memory [`CloudBackend`] with the same row semantics as the hosted
//! tables: upsert conflicts on `(user_id, name)`, listings are newest first
//! and project reads are scoped to the owner.

use std::cell::{Cell, RefCell};

use super::backend::{BackendResult, CloudBackend};
use super::error::BackendError;
use super::models::{NewUser, ProjectRecord, ProjectSummary, ProjectUpsert, UserRecord};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    users: RefCell<Vec<UserRecord>>,
    projects: RefCell<Vec<ProjectRecord>>,
    next_id: Cell<u64>,
    /// Fails every call with this message when set
    failure: RefCell<Option<String>>,
    requests: Cell<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, username: &str, password: &str) -> Self {
        let id = self.allocate_id();
        self.users.borrow_mut().push(UserRecord {
            id,
            username: username.to_string(),
            password: Some(password.to_string()),
        });
        self
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.borrow_mut() = Some(message.into());
    }

    pub fn recover(&self) {
        self.failure.borrow_mut().take();
    }

    /// Number of calls that reached the backend
    pub fn request_count(&self) -> usize {
        self.requests.get()
    }

    pub fn project_count(&self) -> usize {
        self.projects.borrow().len()
    }

    fn allocate_id(&self) -> String {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id.to_string()
    }

    fn begin(&self) -> BackendResult<()> {
        self.requests.set(self.requests.get() + 1);
        match self.failure.borrow().as_ref() {
            Some(message) => Err(BackendError::new(message.clone())),
            None => Ok(()),
        }
    }
}

impl CloudBackend for MemoryBackend {
    async fn find_user(&self, username: &str, password: &str) -> BackendResult<Option<UserRecord>> {
        self.begin()?;
        Ok(self
            .users
            .borrow()
            .iter()
            .find(|u| u.username == username && u.password.as_deref() == Some(password))
            .cloned())
    }

    async fn username_exists(&self, username: &str) -> BackendResult<bool> {
        self.begin()?;
        Ok(self.users.borrow().iter().any(|u| u.username == username))
    }

    async fn insert_user(&self, user: &NewUser) -> BackendResult<UserRecord> {
        self.begin()?;
        if self.users.borrow().iter().any(|u| u.username == user.username) {
            return Err(BackendError {
                message: "duplicate key value violates unique constraint".to_string(),
                code: Some("23505".to_string()),
                details: None,
                hint: None,
            });
        }
        let record = UserRecord {
            id: self.allocate_id(),
            username: user.username.clone(),
            password: Some(user.password.clone()),
        };
        self.users.borrow_mut().push(record.clone());
        Ok(record)
    }

    async fn upsert_project(&self, project: &ProjectUpsert) -> BackendResult<Vec<ProjectRecord>> {
        self.begin()?;
        let mut projects = self.projects.borrow_mut();
        let existing = projects
            .iter_mut()
            .find(|p| p.user_id == project.user_id && p.name == project.name);

        let record = match existing {
            Some(row) => {
                row.data = project.data.clone();
                row.updated_at = Some(project.updated_at);
                row.clone()
            }
            None => {
                let row = ProjectRecord {
                    id: self.allocate_id(),
                    user_id: project.user_id.clone(),
                    name: project.name.clone(),
                    data: project.data.clone(),
                    created_at: Some(project.updated_at),
                    updated_at: Some(project.updated_at),
                };
                projects.push(row.clone());
                row
            }
        };
        Ok(vec![record])
    }

    async fn list_projects(&self, user_id: &str) -> BackendResult<Vec<ProjectSummary>> {
        self.begin()?;
        let mut rows: Vec<ProjectSummary> = self
            .projects
            .borrow()
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(ProjectSummary::from)
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }

    async fn get_project(&self, id: &str, user_id: &str) -> BackendResult<Option<ProjectRecord>> {
        self.begin()?;
        Ok(self
            .projects
            .borrow()
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .cloned())
    }
}

