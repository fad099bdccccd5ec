use crate::config::HttpSourceConfig;
use crate::domain::Subject;
use crate::error::{AppError, Result};
use crate::models::FieldMap;
use crate::sources::{CachePolicy, Source, SourceError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Generic JSON-over-HTTP source adapter.
///
/// Concrete third-party lookups (IP geolocation, WHOIS gateways, tech-stack
/// detectors) are configured instances of this adapter rather than code in
/// this crate. The response's top-level JSON object is flattened into the
/// field map; nested objects are skipped.
pub struct HttpApiSource {
    name: String,
    url_template: String,
    rate_class: Option<String>,
    policy: CachePolicy,
    client: reqwest::Client,
}

impl HttpApiSource {
    pub fn from_config(config: &HttpSourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let policy = if config.cacheable {
            match config.ttl_secs {
                Some(secs) => CachePolicy::cached(Duration::from_secs(secs)),
                None => CachePolicy::cached_default(),
            }
        } else {
            CachePolicy::uncached()
        };

        Ok(Self {
            name: config.name.clone(),
            url_template: config.url.clone(),
            rate_class: config.rate_limit_class.clone(),
            policy,
            client,
        })
    }

    fn url_for(&self, subject: &Subject) -> String {
        self.url_template.replace("{domain}", subject.as_str())
    }

    /// Keep scalar and array values; nested objects carry structure this
    /// adapter does not interpret.
    fn flatten(body: Value) -> std::result::Result<FieldMap, SourceError> {
        let object = match body {
            Value::Object(map) => map,
            other => {
                return Err(SourceError::BadResponse(format!(
                    "expected JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let mut fields = FieldMap::new();
        for (key, value) in object {
            match value {
                Value::Object(_) => continue,
                other => {
                    fields.insert(key, other);
                }
            }
        }
        Ok(fields)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl Source for HttpApiSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn rate_limit_class(&self) -> &str {
        self.rate_class.as_deref().unwrap_or(&self.name)
    }

    fn cache_policy(&self) -> CachePolicy {
        self.policy
    }

    async fn fetch(&self, subject: &Subject) -> std::result::Result<FieldMap, SourceError> {
        let url = self.url_for(subject);
        debug!(source = %self.name, %url, "Fetching source");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout
            } else {
                SourceError::BadResponse(e.to_string())
            }
        })?;

        match response.status().as_u16() {
            404 => return Err(SourceError::NotFound),
            429 => return Err(SourceError::QuotaExceeded),
            status if !response.status().is_success() => {
                return Err(SourceError::BadResponse(format!("status {}", status)))
            }
            _ => {}
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SourceError::BadResponse(format!("invalid JSON: {}", e)))?;

        Self::flatten(body)
    }
}
