use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::error::StoreError;

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    /// `Prefer: return=representation`, so writes answer with the stored rows.
    pub fn representation_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&self.anon_key)
            .map_err(|_| StoreError::Auth("Invalid anon key".to_string()))?;
        headers.insert("apikey", api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| StoreError::Auth("Invalid bearer token".to_string()))?;
            headers.insert(AUTHORIZATION, bearer);
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T, StoreError>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    /// Reads are retried once when the store is unreachable or answers 5xx.
    /// Writes go out exactly once.
    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         auth_token: Option<&str>, body: Option<Value>,
                                         extra_headers: Option<HeaderMap>)
                                         -> Result<T, StoreError>
    where T: DeserializeOwned {
        let first = self
            .send_once(method.clone(), path, auth_token, body.clone(), extra_headers.clone())
            .await;

        match first {
            Err(e) if method == Method::GET && e.is_retryable() => {
                warn!("Read of {} failed ({}), retrying once", path, e);
                self.send_once(method, path, auth_token, body, extra_headers).await
            }
            other => other,
        }
    }

    async fn send_once<T>(&self, method: Method, path: &str,
                          auth_token: Option<&str>, body: Option<Value>,
                          extra_headers: Option<HeaderMap>)
                          -> Result<T, StoreError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => StoreError::Auth(error_text),
                404 => StoreError::NotFound(error_text),
                code if code >= 500 => StoreError::Unavailable(format!("{}: {}", status, error_text)),
                code => StoreError::Api { status: code, message: error_text },
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Inserts one row and returns it as stored.
    pub async fn insert<T>(&self, collection: &str, auth_token: &str, row: Value) -> Result<T, StoreError>
    where T: DeserializeOwned {
        let path = format!("/rest/v1/{}", collection);
        let rows: Vec<T> = self
            .request_with_headers(Method::POST, &path, Some(auth_token), Some(row),
                                  Some(Self::representation_headers()))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("Insert into {} returned no rows", collection)))
    }

    /// Conditional PATCH. An empty result means the filter matched nothing.
    pub async fn update<T>(&self, collection: &str, filters: &str, auth_token: &str, patch: Value)
                           -> Result<Vec<T>, StoreError>
    where T: DeserializeOwned {
        let path = format!("/rest/v1/{}?{}", collection, filters);
        self.request_with_headers(Method::PATCH, &path, Some(auth_token), Some(patch),
                                  Some(Self::representation_headers()))
            .await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
