//! Browser-side access to the cloud provider
//!
//! The provider lives in a thread-local and is built lazily from the
//! `<meta>` settings. The server build has no provider: every call
//! reports `CloudError::NotInitialized`.

use leptos::prelude::*;

use crate::core::SchemaState;
#[cfg(not(feature = "hydrate"))]
use crate::core::cloud::CloudError;
use crate::core::cloud::{CloudResult, ProjectRecord, ProjectSummary, UserRecord};

/// Reactive cloud state shared by the panel and the auth modal
#[derive(Clone, Copy)]
pub struct CloudContext {
    pub user: RwSignal<Option<UserRecord>>,
    pub auth_open: RwSignal<bool>,
}

pub fn provide_cloud_context() -> CloudContext {
    let ctx = CloudContext {
        // Session is restored after hydration
        user: RwSignal::new(None),
        auth_open: RwSignal::new(false),
    };
    provide_context(ctx);
    ctx
}

pub fn use_cloud() -> CloudContext {
    expect_context::<CloudContext>()
}

#[cfg(feature = "hydrate")]
mod client {
    use std::rc::Rc;

    use crate::core::cloud::{CloudProvider, SupabaseBackend};
    use crate::core::config::CloudConfig;
    use crate::core::session::LocalStorageSession;

    pub type AppProvider = CloudProvider<SupabaseBackend, LocalStorageSession>;

    thread_local! {
        static PROVIDER: Rc<AppProvider> = Rc::new(build());
    }

    fn build() -> AppProvider {
        let backend = match CloudConfig::from_document() {
            Some(config) => match SupabaseBackend::new(&config) {
                Ok(backend) => Some(backend),
                Err(e) => {
                    leptos::logging::warn!("Invalid Supabase settings: {}", e);
                    None
                }
            },
            None => {
                leptos::logging::warn!("Supabase settings missing, cloud features disabled");
                None
            }
        };
        CloudProvider::new(backend, LocalStorageSession)
    }

    pub fn provider() -> Rc<AppProvider> {
        PROVIDER.with(Rc::clone)
    }
}

#[cfg(feature = "hydrate")]
pub fn current_user() -> Option<UserRecord> {
    client::provider().current_user()
}

#[cfg(feature = "hydrate")]
pub async fn login(username: String, password: String) -> CloudResult<UserRecord> {
    client::provider().login(&username, &password).await
}

#[cfg(feature = "hydrate")]
pub async fn register(username: String, password: String) -> CloudResult<UserRecord> {
    client::provider().register(&username, &password).await
}

#[cfg(feature = "hydrate")]
pub fn logout() {
    client::provider().logout();
}

#[cfg(feature = "hydrate")]
pub async fn save_project(name: String, state: SchemaState) -> CloudResult<Vec<ProjectRecord>> {
    client::provider().save_project(&name, &state).await
}

#[cfg(feature = "hydrate")]
pub async fn list_projects() -> CloudResult<Vec<ProjectSummary>> {
    client::provider().list_projects().await
}

#[cfg(feature = "hydrate")]
pub async fn load_schema(project_id: String) -> CloudResult<SchemaState> {
    client::provider().load_schema(&project_id).await
}

// Server stubs

#[cfg(not(feature = "hydrate"))]
pub fn current_user() -> Option<UserRecord> {
    None
}

#[cfg(not(feature = "hydrate"))]
pub async fn login(_username: String, _password: String) -> CloudResult<UserRecord> {
    Err(CloudError::NotInitialized)
}

#[cfg(not(feature = "hydrate"))]
pub async fn register(_username: String, _password: String) -> CloudResult<UserRecord> {
    Err(CloudError::NotInitialized)
}

#[cfg(not(feature = "hydrate"))]
pub fn logout() {}

#[cfg(not(feature = "hydrate"))]
pub async fn save_project(_name: String, _state: SchemaState) -> CloudResult<Vec<ProjectRecord>> {
    Err(CloudError::NotInitialized)
}

#[cfg(not(feature = "hydrate"))]
pub async fn list_projects() -> CloudResult<Vec<ProjectSummary>> {
    Err(CloudError::NotInitialized)
}

#[cfg(not(feature = "hydrate"))]
pub async fn load_schema(_project_id: String) -> CloudResult<SchemaState> {
    Err(CloudError::NotInitialized)
}
