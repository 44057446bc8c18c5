//! Cloudinary API client with request signing and response handling.

use std::collections::BTreeMap;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, Url};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::error::classify_failure;
use crate::config::StoreConfig;
use crate::error::{Result, VfsError};
use crate::http::{HttpClient, HttpResponse};

/// Parameters that are sent but never signed.
const UNSIGNED_PARAMS: [&str; 5] = ["file", "cloud_name", "resource_type", "api_key", "signature"];

/// Cloudinary API client.
///
/// Admin API calls authenticate with HTTP basic auth; Upload API calls carry a
/// SHA-256 signature over their parameters.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_url: Url,
    api_key: String,
    api_secret: String,
}

impl ApiClient {
    /// Create a new API client from store configuration.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let http = match &config.proxy {
            Some(proxy) => HttpClient::with_proxy(proxy, config.request_timeout())?,
            None => HttpClient::new(config.request_timeout())?,
        };
        let base_url = Url::parse(&config.cloud_url())
            .map_err(|e| VfsError::Config(format!("Invalid API base URL: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Build an endpoint URL from fixed segments plus a store path.
    ///
    /// Each path segment is percent-encoded individually, so folder names with spaces
    /// or reserved characters stay a single segment.
    pub fn endpoint(&self, fixed: &[&str], store_path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| VfsError::Config("API base URL cannot be a base".to_string()))?;
            segments.pop_if_empty();
            segments.extend(fixed);
            segments.extend(store_path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }

    /// Admin API request; returns the decoded JSON body on success.
    pub async fn admin(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<Value> {
        let builder = self
            .http
            .request(method, url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .query(query);
        let response = self.http.send(builder).await?;
        decode(response, context)
    }

    /// Signed Upload API form post (e.g. `destroy`).
    pub async fn signed_post(
        &self,
        url: Url,
        params: BTreeMap<String, String>,
        context: &str,
    ) -> Result<Value> {
        let form = self.signed_params(params);
        let builder = self.http.request(Method::POST, url).form(&form);
        let response = self.http.send(builder).await?;
        decode(response, context)
    }

    /// Signed multipart upload of a file payload.
    pub async fn signed_upload(
        &self,
        url: Url,
        params: BTreeMap<String, String>,
        data: Vec<u8>,
        file_name: &str,
        content_type: Option<&str>,
        context: &str,
    ) -> Result<Value> {
        let mut part = Part::bytes(data).file_name(file_name.to_string());
        if let Some(mime) = content_type {
            part = part.mime_str(mime)?;
        }

        let mut form = Form::new().part("file", part);
        for (key, value) in self.signed_params(params) {
            form = form.text(key, value);
        }

        let builder = self.http.request(Method::POST, url).multipart(form);
        let response = self.http.send(builder).await?;
        decode(response, context)
    }

    /// Add `timestamp`, `api_key`, `signature_algorithm` and `signature`.
    fn signed_params(&self, mut params: BTreeMap<String, String>) -> BTreeMap<String, String> {
        params
            .entry("timestamp".to_string())
            .or_insert_with(|| chrono::Utc::now().timestamp().to_string());
        params.insert("signature_algorithm".to_string(), "sha256".to_string());
        let signature = sign(&params, &self.api_secret);
        params.insert("api_key".to_string(), self.api_key.clone());
        params.insert("signature".to_string(), signature);
        params
    }
}

/// Compute the Upload API signature.
///
/// Parameters are sorted by name, joined as `k=v` with `&`, suffixed with the secret
/// and hashed with SHA-256. Empty values and unsigned parameters are skipped.
pub fn sign(params: &BTreeMap<String, String>, secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(k, v)| !v.is_empty() && !UNSIGNED_PARAMS.contains(&k.as_str()))
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn decode(response: HttpResponse, context: &str) -> Result<Value> {
    if !response.is_success() {
        return Err(classify_failure(response.status, &response.body, context));
    }
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&response.body)?)
}
