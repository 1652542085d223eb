//! Supabase backend over the PostgREST HTTP interface
//!
//! Request construction is plain data so it can be checked without a
//! network; [`SupabaseBackend`] sends the requests with `gloo-net` in the
//! browser.

use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::backend::{BackendResult, CloudBackend};
use super::error::BackendError;
use super::models::{NewUser, ProjectRecord, ProjectSummary, ProjectUpsert, UserRecord};
use crate::core::config::CloudConfig;

pub const USERS_TABLE: &str = "bdd_users";
pub const PROJECTS_TABLE: &str = "projects";
const SUMMARY_COLUMNS: &str = "id,name,created_at,updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Fully built PostgREST request
#[derive(Debug, Clone, PartialEq)]
pub struct PostgrestRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl PostgrestRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Builds PostgREST requests for one Supabase project
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    rest_url: Url,
    api_key: String,
}

impl QueryBuilder {
    pub fn new(config: &CloudConfig) -> Result<Self, BackendError> {
        let base = Url::parse(&config.supabase_url)
            .map_err(|e| BackendError::new(format!("Invalid Supabase URL: {}", e)))?;
        let rest_url = base
            .join("rest/v1/")
            .map_err(|e| BackendError::new(format!("Invalid Supabase URL: {}", e)))?;
        Ok(Self {
            rest_url,
            api_key: config.supabase_key.clone(),
        })
    }

    fn table_url(&self, table: &str, params: &[(&str, String)]) -> String {
        let mut url = self.rest_url.clone();
        url.path_segments_mut()
            .map(|mut segments| {
                segments.pop_if_empty().push(table);
            })
            .ok();
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        url.to_string()
    }

    fn headers(&self, extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut headers = vec![
            ("apikey".to_string(), self.api_key.clone()),
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.api_key),
            ),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        headers.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        headers
    }

    fn get(&self, table: &str, params: &[(&str, String)]) -> PostgrestRequest {
        PostgrestRequest {
            method: HttpMethod::Get,
            url: self.table_url(table, params),
            headers: self.headers(&[]),
            body: None,
        }
    }

    fn post<T: Serialize>(
        &self,
        table: &str,
        params: &[(&str, String)],
        prefer: &str,
        body: &T,
    ) -> Result<PostgrestRequest, BackendError> {
        let body = serde_json::to_string(body).map_err(|e| BackendError::new(e.to_string()))?;
        Ok(PostgrestRequest {
            method: HttpMethod::Post,
            url: self.table_url(table, params),
            headers: self.headers(&[("Content-Type", "application/json"), ("Prefer", prefer)]),
            body: Some(body),
        })
    }

    pub fn find_user(&self, username: &str, password: &str) -> PostgrestRequest {
        self.get(
            USERS_TABLE,
            &[
                ("select", "*".to_string()),
                ("username", eq(username)),
                ("password", eq(password)),
                ("limit", "1".to_string()),
            ],
        )
    }

    pub fn username_exists(&self, username: &str) -> PostgrestRequest {
        self.get(
            USERS_TABLE,
            &[
                ("select", "id".to_string()),
                ("username", eq(username)),
                ("limit", "1".to_string()),
            ],
        )
    }

    pub fn insert_user(&self, user: &NewUser) -> Result<PostgrestRequest, BackendError> {
        self.post(USERS_TABLE, &[], "return=representation", user)
    }

    pub fn upsert_project(&self, project: &ProjectUpsert) -> Result<PostgrestRequest, BackendError> {
        self.post(
            PROJECTS_TABLE,
            &[("on_conflict", "user_id,name".to_string())],
            "resolution=merge-duplicates,return=representation",
            project,
        )
    }

    pub fn list_projects(&self, user_id: &str) -> PostgrestRequest {
        self.get(
            PROJECTS_TABLE,
            &[
                ("select", SUMMARY_COLUMNS.to_string()),
                ("user_id", eq(user_id)),
                ("order", "updated_at.desc".to_string()),
            ],
        )
    }

    pub fn get_project(&self, id: &str, user_id: &str) -> PostgrestRequest {
        self.get(
            PROJECTS_TABLE,
            &[
                ("select", "*".to_string()),
                ("id", eq(id)),
                ("user_id", eq(user_id)),
            ],
        )
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// Decodes a successful response body
pub fn decode_rows<T: DeserializeOwned>(body: &str) -> BackendResult<Vec<T>> {
    serde_json::from_str(body).map_err(|e| BackendError::new(format!("Unexpected response: {}", e)))
}

/// Supabase project accessed through its REST endpoint
#[derive(Debug, Clone)]
pub struct SupabaseBackend {
    queries: QueryBuilder,
}

impl SupabaseBackend {
    pub fn new(config: &CloudConfig) -> Result<Self, BackendError> {
        Ok(Self {
            queries: QueryBuilder::new(config)?,
        })
    }

    pub fn queries(&self) -> &QueryBuilder {
        &self.queries
    }

    #[cfg(feature = "hydrate")]
    async fn execute(&self, request: PostgrestRequest) -> BackendResult<String> {
        use gloo_net::http::{Method, RequestBuilder};

        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };
        let mut builder = RequestBuilder::new(&request.url).method(method);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let prepared = match request.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| BackendError::new(e.to_string()))?;

        let response = prepared
            .send()
            .await
            .map_err(|e| BackendError::new(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::new(e.to_string()))?;

        if response.ok() {
            Ok(body)
        } else {
            Err(BackendError::from_response(status, &body))
        }
    }

    #[cfg(not(feature = "hydrate"))]
    async fn execute(&self, request: PostgrestRequest) -> BackendResult<String> {
        tracing::warn!(url = %request.url, "cloud request outside the browser");
        Err(BackendError::new("Cloud requests are only available in the browser"))
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, request: PostgrestRequest) -> BackendResult<Vec<T>> {
        let body = self.execute(request).await?;
        decode_rows(&body)
    }
}

impl CloudBackend for SupabaseBackend {
    async fn find_user(&self, username: &str, password: &str) -> BackendResult<Option<UserRecord>> {
        let rows: Vec<UserRecord> = self
            .fetch_rows(self.queries.find_user(username, password))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn username_exists(&self, username: &str) -> BackendResult<bool> {
        let rows: Vec<serde_json::Value> =
            self.fetch_rows(self.queries.username_exists(username)).await?;
        Ok(!rows.is_empty())
    }

    async fn insert_user(&self, user: &NewUser) -> BackendResult<UserRecord> {
        let rows: Vec<UserRecord> = self.fetch_rows(self.queries.insert_user(user)?).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::new("User was not created"))
    }

    async fn upsert_project(&self, project: &ProjectUpsert) -> BackendResult<Vec<ProjectRecord>> {
        self.fetch_rows(self.queries.upsert_project(project)?).await
    }

    async fn list_projects(&self, user_id: &str) -> BackendResult<Vec<ProjectSummary>> {
        self.fetch_rows(self.queries.list_projects(user_id)).await
    }

    async fn get_project(&self, id: &str, user_id: &str) -> BackendResult<Option<ProjectRecord>> {
        let rows: Vec<ProjectRecord> = self.fetch_rows(self.queries.get_project(id, user_id)).await?;
        Ok(rows.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn builder() -> QueryBuilder {
        QueryBuilder::new(&CloudConfig {
            supabase_url: "https://demo.supabase.co".to_string(),
            supabase_key: "anon-key".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_auth_headers_on_every_request() {
        let request = builder().list_projects("u1");
        assert_eq!(request.header("apikey"), Some("anon-key"));
        assert_eq!(request.header("authorization"), Some("Bearer anon-key"));
        assert_eq!(request.method, HttpMethod::Get);
        assert!(request.body.is_none());
    }

    #[test]
    fn test_find_user_filters_both_columns() {
        let request = builder().find_user("alice", "p@ss word");
        let url = Url::parse(&request.url).unwrap();
        assert_eq!(url.path(), "/rest/v1/bdd_users");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("username".into(), "eq.alice".into())));
        assert!(pairs.contains(&("password".into(), "eq.p@ss word".into())));
        assert!(pairs.contains(&("limit".into(), "1".into())));
    }

    #[test]
    fn test_list_projects_orders_newest_first() {
        let request = builder().list_projects("42");
        let url = Url::parse(&request.url).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/rest/v1/projects");
        assert!(pairs.contains(&("select".into(), "id,name,created_at,updated_at".into())));
        assert!(pairs.contains(&("user_id".into(), "eq.42".into())));
        assert!(pairs.contains(&("order".into(), "updated_at.desc".into())));
    }

    #[test]
    fn test_upsert_targets_owner_and_name() {
        let upsert = ProjectUpsert {
            user_id: "u1".into(),
            name: "My Database".into(),
            data: serde_json::json!({"tables": []}),
            updated_at: Utc::now(),
        };
        let request = builder().upsert_project(&upsert).unwrap();
        let url = Url::parse(&request.url).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(request.method, HttpMethod::Post);
        assert!(pairs.contains(&("on_conflict".into(), "user_id,name".into())));
        assert_eq!(
            request.header("Prefer"),
            Some("resolution=merge-duplicates,return=representation")
        );
        let body: serde_json::Value = serde_json::from_str(request.body.as_ref().unwrap()).unwrap();
        assert_eq!(body["name"], "My Database");
        assert_eq!(body["user_id"], "u1");
        assert!(body["updated_at"].is_string());
    }

    #[test]
    fn test_get_project_scoped_to_owner() {
        let request = builder().get_project("p1", "u1");
        let url = Url::parse(&request.url).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("id".into(), "eq.p1".into())));
        assert!(pairs.contains(&("user_id".into(), "eq.u1".into())));
    }

    #[test]
    fn test_base_url_with_path_suffix() {
        let builder = QueryBuilder::new(&CloudConfig {
            supabase_url: "https://demo.supabase.co/".to_string(),
            supabase_key: "k".to_string(),
        })
        .unwrap();
        let url = Url::parse(&builder.list_projects("u").url).unwrap();
        assert_eq!(url.path(), "/rest/v1/projects");
    }

    #[test]
    fn test_invalid_supabase_url() {
        let result = QueryBuilder::new(&CloudConfig {
            supabase_url: "not a url".to_string(),
            supabase_key: "k".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_rows_rejects_objects() {
        let rows: BackendResult<Vec<UserRecord>> = decode_rows(r#"{"message":"x"}"#);
        assert!(rows.is_err());
    }
}
