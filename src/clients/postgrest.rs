use super::{BackendError, build_http_client, error_message, parse_json};
use crate::config::BackendConfig;
use crate::domain::SortOrder;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::debug;

const OBJECT_MEDIA_TYPE: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";

/// A read or filter against one table: `select=`, `col=eq.value` and `order=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<(String, SortOrder)>,
}

impl Query {
    #[must_use]
    pub fn table(name: &str) -> Self {
        Self {
            table: name.to_string(),
            select: None,
            filters: Vec::new(),
            order: None,
        }
    }

    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    #[must_use]
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), format!("eq.{value}")));
        self
    }

    #[must_use]
    pub fn order(mut self, column: &str, order: SortOrder) -> Self {
        self.order = Some((column.to_string(), order));
        self
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Query string pairs in the order the backend expects them.
    #[must_use]
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 2);
        if let Some(select) = &self.select {
            params.push(("select".to_string(), select.clone()));
        }
        params.extend(self.filters.iter().cloned());
        if let Some((column, order)) = &self.order {
            params.push((
                "order".to_string(),
                format!("{column}.{}", order.as_query_suffix()),
            ));
        }
        params
    }
}

/// Client for the `/rest/v1` table API.
///
/// Clones share the access token, so signing in through one handle
/// authorizes every other.
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl PostgrestClient {
    /// # Errors
    ///
    /// Fails when the underlying HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Replaces the bearer token used for row-level security. `None` falls
    /// back to the anonymous key.
    pub fn set_access_token(&self, token: Option<String>) {
        let mut guard = self
            .access_token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = token;
    }

    #[must_use]
    pub fn has_access_token(&self) -> bool {
        self.access_token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    fn bearer(&self) -> String {
        let guard = self
            .access_token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        format!("Bearer {}", guard.as_deref().unwrap_or(&self.anon_key))
    }

    fn request(&self, method: Method, query: &Query) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, query.table);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, self.bearer())
            .query(&query.params())
    }

    pub async fn select<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>, BackendError> {
        let body = self
            .execute(Method::GET, query, self.request(Method::GET, query))
            .await?;
        parse_json(&body)
    }

    /// Fetches exactly one row. Zero or several matches come back as a 406.
    pub async fn single<T: DeserializeOwned>(&self, query: &Query) -> Result<T, BackendError> {
        let request = self
            .request(Method::GET, query)
            .header(ACCEPT, OBJECT_MEDIA_TYPE);
        let body = self.execute(Method::GET, query, request).await?;
        parse_json(&body)
    }

    /// Inserts one row and returns it as stored.
    pub async fn insert_one<B, T>(&self, table: &str, row: &B) -> Result<T, BackendError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let query = Query::table(table);
        let request = self
            .request(Method::POST, &query)
            .header("Prefer", RETURN_REPRESENTATION)
            .header(ACCEPT, OBJECT_MEDIA_TYPE)
            .json(row);
        let body = self.execute(Method::POST, &query, request).await?;
        parse_json(&body)
    }

    /// Patches every row matching the query's filters and returns them.
    pub async fn update<B, T>(&self, query: &Query, patch: &B) -> Result<Vec<T>, BackendError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::PATCH, query)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(patch);
        let body = self.execute(Method::PATCH, query, request).await?;
        parse_json(&body)
    }

    /// Deletes every row matching the query's filters and returns how many.
    pub async fn delete(&self, query: &Query) -> Result<usize, BackendError> {
        let request = self
            .request(Method::DELETE, query)
            .header("Prefer", RETURN_REPRESENTATION);
        let body = self.execute(Method::DELETE, query, request).await?;
        let rows: Vec<serde_json::Value> = if body.trim().is_empty() {
            Vec::new()
        } else {
            parse_json(&body)?
        };
        Ok(rows.len())
    }

    async fn execute(
        &self,
        method: Method,
        query: &Query,
        request: RequestBuilder,
    ) -> Result<String, BackendError> {
        let start = Instant::now();
        let result = request.send().await;

        let status = result
            .as_ref()
            .map_or_else(|_| "error".to_string(), |r| r.status().as_u16().to_string());
        let labels = [
            ("method", method.to_string()),
            ("table", query.table.clone()),
            ("status", status.clone()),
        ];
        metrics::counter!("backend_requests_total", &labels).increment(1);
        metrics::histogram!("backend_request_duration_seconds", &labels)
            .record(start.elapsed().as_secs_f64());

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            method = %method,
            table = %query.table,
            status = %status,
            duration_ms,
            "Backend request finished"
        );

        let response = result?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        Ok(body)
    }
}
