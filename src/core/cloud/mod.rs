//! Cloud persistence on a hosted Supabase project

mod backend;
mod error;
pub mod memory;
mod models;
pub mod postgrest;
mod provider;

pub use backend::{BackendResult, CloudBackend};
pub use error::{BackendError, CloudError, CloudResult};
pub use models::{NewUser, ProjectRecord, ProjectSummary, ProjectUpsert, UserRecord};
pub use postgrest::SupabaseBackend;
pub use provider::CloudProvider;
