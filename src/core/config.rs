//! Application configuration.
//!
//! The server loads [`Config`] with `Config::from_env()` after calling
//! `dotenvy::dotenv()` and renders the Supabase settings into `<meta>` tags
//! of the HTML shell; the browser reads them back with
//! [`CloudConfig::from_document`].

/// `<meta>` tag names carrying the Supabase settings to the browser
pub const META_SUPABASE_URL: &str = "vdb-supabase-url";
pub const META_SUPABASE_KEY: &str = "vdb-supabase-key";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Supabase project URL
    /// Example: https://abcdefgh.supabase.co
    pub supabase_url: Option<String>,

    /// Supabase anon (public) API key
    pub supabase_anon_key: Option<String>,

    /// tracing filter directive, e.g. `info,vdb=debug`
    pub log_filter: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` before this to load from `.env` file.
    pub fn from_env() -> Self {
        Self {
            supabase_url: non_empty(std::env::var("SUPABASE_URL").ok()),
            supabase_anon_key: non_empty(std::env::var("SUPABASE_ANON_KEY").ok()),
            log_filter: non_empty(std::env::var("RUST_LOG").ok()),
        }
    }

    /// Check if Supabase is configured
    pub fn has_cloud(&self) -> bool {
        self.cloud().is_some()
    }

    /// Supabase settings, if both parts are present
    pub fn cloud(&self) -> Option<CloudConfig> {
        Some(CloudConfig {
            supabase_url: self.supabase_url.clone()?,
            supabase_key: self.supabase_anon_key.clone()?,
        })
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or("info")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Connection settings of the hosted backend
#[derive(Debug, Clone, PartialEq)]
pub struct CloudConfig {
    pub supabase_url: String,
    pub supabase_key: String,
}

impl CloudConfig {
    /// Reads the settings the server rendered into the page head
    #[cfg(feature = "hydrate")]
    pub fn from_document() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let meta = |name: &str| -> Option<String> {
            let element = document
                .query_selector(&format!("meta[name=\"{}\"]", name))
                .ok()??;
            non_empty(element.get_attribute("content"))
        };
        Some(Self {
            supabase_url: meta(META_SUPABASE_URL)?,
            supabase_key: meta(META_SUPABASE_KEY)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_requires_both_parts() {
        let config = Config {
            supabase_url: Some("https://demo.supabase.co".to_string()),
            supabase_anon_key: None,
            log_filter: None,
        };
        assert!(!config.has_cloud());

        let config = Config {
            supabase_anon_key: Some("anon".to_string()),
            ..config
        };
        assert_eq!(
            config.cloud(),
            Some(CloudConfig {
                supabase_url: "https://demo.supabase.co".to_string(),
                supabase_key: "anon".to_string(),
            })
        );
    }

    #[test]
    fn test_log_filter_default() {
        assert_eq!(Config::default().log_filter(), "info");

        let config = Config {
            log_filter: Some("debug".to_string()),
            ..Default::default()
        };
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
    }
}
