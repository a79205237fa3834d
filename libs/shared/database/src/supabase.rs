use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE},
    Client, Method, Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::DatabaseError;

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    server_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            server_key: config.database_key().to_string(),
        }
    }

    /// Builds request headers. Without a caller token the server key is sent,
    /// since authorization is decided by the services, not by row policies.
    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap, DatabaseError> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", header_value(&self.anon_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let bearer = auth_token.unwrap_or(&self.server_key);
        if !bearer.is_empty() {
            headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", bearer))?);
        }

        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<Response, DatabaseError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await.map_err(|e| {
            error!("Database request to {} failed: {}", url, e);
            DatabaseError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);
            return Err(DatabaseError::from_status(status.as_u16(), error_text));
        }

        Ok(response)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, DatabaseError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        headers: Option<HeaderMap>,
    ) -> Result<T, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let is_read = method == Method::GET;
        match self.send(method, path, auth_token, body, headers).await {
            Ok(response) => Ok(response.json::<T>().await?),
            Err(DatabaseError::InvalidIdentifier(detail)) if is_read => {
                debug!("Filter rejected by the database, reading as no rows: {}", detail);
                no_rows()
            }
            Err(e) => Err(e),
        }
    }

    /// Sends a request whose response body is not needed (PostgREST answers
    /// 204 with no content unless a representation is requested).
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(), DatabaseError> {
        self.send(method, path, auth_token, body, None).await?;
        Ok(())
    }

    /// GET with `Prefer: count=exact`; returns the rows and the total row count
    /// reported in `Content-Range`.
    pub async fn request_with_count<T>(
        &self,
        path: &str,
        auth_token: Option<&str>,
    ) -> Result<(T, Option<u64>), DatabaseError>
    where
        T: DeserializeOwned,
    {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("count=exact"));

        let response = match self.send(Method::GET, path, auth_token, None, Some(headers)).await {
            Ok(response) => response,
            Err(DatabaseError::InvalidIdentifier(detail)) => {
                debug!("Filter rejected by the database, reading as no rows: {}", detail);
                return Ok((no_rows()?, Some(0)));
            }
            Err(e) => return Err(e),
        };
        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range_total);

        let data = response.json::<T>().await?;
        Ok((data, total))
    }
}

/// Header requesting that PostgREST return the written rows.
pub fn return_representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

/// PostgREST collection reads always answer with an array.
fn no_rows<T: DeserializeOwned>() -> Result<T, DatabaseError> {
    Ok(serde_json::from_value(Value::Array(Vec::new()))?)
}

fn header_value(value: &str) -> Result<HeaderValue, DatabaseError> {
    HeaderValue::from_str(value)
        .map_err(|e| DatabaseError::Request(format!("Invalid header value: {}", e)))
}

fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit('/').next().and_then(|total| total.parse().ok())
}
