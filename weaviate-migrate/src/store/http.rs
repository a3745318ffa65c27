//! Blocking HTTP adapter for the Weaviate REST schema API.

use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use url::Url;

use super::SchemaStore;
use crate::errors::{MigrateError, MigrateResult, StoreError};
use crate::schema::{ClassDefinition, PropertyDefinition, Schema};

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a [`WeaviateStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the instance, e.g. `http://localhost:8080`.
    pub url: Url,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl StoreConfig {
    pub fn new(url: &str) -> MigrateResult<Self> {
        let parsed = Url::parse(url)
            .map_err(|err| MigrateError::configuration(format!("invalid store URL '{url}': {err}")))?;

        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(MigrateError::configuration(format!(
                "store URL '{url}' must be an http(s) URL"
            )));
        }

        Ok(Self {
            url: parsed,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set the API key. Blank keys are treated as no key.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{url}/v1/schema/{segments...}` with each segment percent-encoded.
    pub fn schema_endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("v1").push("schema").extend(segments);
        }
        url
    }
}

#[derive(Deserialize)]
struct SchemaResponse {
    #[serde(default)]
    classes: Option<Vec<ClassDefinition>>,
}

/// Schema store reached over HTTP.
pub struct WeaviateStore {
    client: Client,
    config: StoreConfig,
}

impl WeaviateStore {
    pub fn connect(config: StoreConfig) -> MigrateResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| MigrateError::configuration(format!("failed to build HTTP client: {err}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<String, StoreError> {
        let request = match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        };

        let response = request.send().map_err(|err| StoreError::Transport {
            operation,
            message: err.to_string(),
        })?;

        let status = response.status();
        let body = response.text().map_err(|err| StoreError::Transport {
            operation,
            message: err.to_string(),
        })?;
        debug!("{operation} -> HTTP {}", status.as_u16());

        if !status.is_success() {
            return Err(StoreError::Status {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

impl SchemaStore for WeaviateStore {
    fn get_schema(&self) -> Result<Schema, StoreError> {
        let url = self.config.schema_endpoint(&[]);
        let body = self.send("get_schema", self.client.get(url))?;

        let response: SchemaResponse = serde_json::from_str(&body).map_err(|err| StoreError::Decode {
            operation: "get_schema",
            message: err.to_string(),
        })?;

        Ok(Schema::new(response.classes.unwrap_or_default()))
    }

    fn create_class(&self, class: &ClassDefinition) -> Result<(), StoreError> {
        let url = self.config.schema_endpoint(&[]);
        self.send("create_class", self.client.post(url).json(class))?;
        Ok(())
    }

    fn create_property(&self, class_name: &str, property: &PropertyDefinition) -> Result<(), StoreError> {
        let url = self.config.schema_endpoint(&[class_name, "properties"]);
        self.send("create_property", self.client.post(url).json(property))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_endpoint() {
        let config = StoreConfig::new("http://localhost:8080").unwrap();
        assert_eq!(config.schema_endpoint(&[]).as_str(), "http://localhost:8080/v1/schema");
        assert_eq!(
            config.schema_endpoint(&["Article", "properties"]).as_str(),
            "http://localhost:8080/v1/schema/Article/properties"
        );
    }

    #[test]
    fn test_schema_endpoint_keeps_base_path() {
        let config = StoreConfig::new("https://db.example.com/weaviate/").unwrap();
        assert_eq!(
            config.schema_endpoint(&[]).as_str(),
            "https://db.example.com/weaviate/v1/schema"
        );
    }

    #[test]
    fn test_class_names_are_encoded() {
        let config = StoreConfig::new("http://localhost:8080").unwrap();
        assert_eq!(
            config.schema_endpoint(&["a/b", "properties"]).as_str(),
            "http://localhost:8080/v1/schema/a%2Fb/properties"
        );
    }

    #[test]
    fn test_invalid_urls_are_configuration_errors() {
        assert!(matches!(
            StoreConfig::new("not a url"),
            Err(MigrateError::Configuration { .. })
        ));
        assert!(matches!(
            StoreConfig::new("ftp://localhost"),
            Err(MigrateError::Configuration { .. })
        ));
    }

    #[test]
    fn test_blank_api_key_is_dropped() {
        let config = StoreConfig::new("http://localhost:8080")
            .unwrap()
            .with_api_key(Some("  ".to_string()));
        assert!(config.api_key.is_none());

        let config = config.with_api_key(Some("secret".to_string()));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_null_classes_read_as_empty() {
        let response: SchemaResponse = serde_json::from_str(r#"{"classes": null}"#).unwrap();
        assert!(response.classes.unwrap_or_default().is_empty());
    }

    #[test]
    fn test_class_with_null_properties_decodes() {
        let response: SchemaResponse =
            serde_json::from_str(r#"{"classes": [{"class": "Bare", "properties": null, "vectorizer": "none"}]}"#)
                .unwrap();
        let classes = response.classes.unwrap_or_default();
        assert_eq!(classes[0].name, "Bare");
        assert!(classes[0].properties.is_empty());
        assert_eq!(classes[0].extra["vectorizer"], "none");
    }
}
