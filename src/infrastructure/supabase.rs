//! Minimal PostgREST (Supabase) table client.
//!
//! Mirrors the query-builder shape of the hosted API: pick a table, add
//! `eq`/`ilike`/`in` filters, finish with `select`, `insert`, `update` or
//! `delete`. There are no transactions; every call is one HTTP request.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    pub service_role_key: String,
}

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {table} failed with status {status}: {message}")]
    Api {
        method: &'static str,
        table: String,
        status: u16,
        message: String,
    },
}

impl From<SupabaseError> for DomainError {
    fn from(e: SupabaseError) -> Self {
        DomainError::Store(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, String),
    Ilike(String, String),
    In(String, Vec<String>),
}

impl Filter {
    /// PostgREST query pair, e.g. `("id", "eq.5")`.
    pub fn to_query_pair(&self) -> (String, String) {
        match self {
            Filter::Eq(column, value) => (column.clone(), format!("eq.{}", value)),
            Filter::Ilike(column, pattern) => (column.clone(), format!("ilike.{}", pattern)),
            Filter::In(column, values) => (column.clone(), format!("in.({})", values.join(","))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    config: SupabaseConfig,
    http: Client,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn from(&self, table: &str) -> TableQuery<'_> {
        TableQuery {
            client: self,
            table: table.to_string(),
            filters: Vec::new(),
        }
    }

    fn request(&self, method: reqwest::Method, table: &str) -> RequestBuilder {
        let url = format!(
            "{}/rest/v1/{}",
            self.config.url.trim_end_matches('/'),
            table
        );
        self.http
            .request(method, url)
            .header("apikey", &self.config.service_role_key)
            .bearer_auth(&self.config.service_role_key)
    }
}

pub struct TableQuery<'a> {
    client: &'a SupabaseClient,
    table: String,
    filters: Vec<Filter>,
}

impl<'a> TableQuery<'a> {
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push(Filter::Eq(column.to_string(), value.to_string()));
        self
    }

    /// `pattern` uses SQL wildcards written as `*` (PostgREST convention).
    pub fn ilike(mut self, column: &str, pattern: &str) -> Self {
        self.filters
            .push(Filter::Ilike(column.to_string(), pattern.to_string()));
        self
    }

    pub fn in_list<T: ToString>(mut self, column: &str, values: &[T]) -> Self {
        self.filters.push(Filter::In(
            column.to_string(),
            values.iter().map(ToString::to_string).collect(),
        ));
        self
    }

    fn query_pairs(&self) -> Vec<(String, String)> {
        self.filters.iter().map(Filter::to_query_pair).collect()
    }

    pub async fn select<T: DeserializeOwned>(self, columns: &str) -> Result<Vec<T>, SupabaseError> {
        let mut pairs = vec![("select".to_string(), columns.to_string())];
        pairs.extend(self.query_pairs());
        let req = self
            .client
            .request(reqwest::Method::GET, &self.table)
            .query(&pairs);
        self.send_json("select", req).await
    }

    pub async fn insert<B, T>(self, rows: &B) -> Result<Vec<T>, SupabaseError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self
            .client
            .request(reqwest::Method::POST, &self.table)
            .header("Prefer", "return=representation")
            .json(rows);
        self.send_json("insert", req).await
    }

    /// Returns the updated rows; an empty vector means no row matched.
    pub async fn update<B, T>(self, patch: &B) -> Result<Vec<T>, SupabaseError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self
            .client
            .request(reqwest::Method::PATCH, &self.table)
            .header("Prefer", "return=representation")
            .query(&self.query_pairs())
            .json(patch);
        self.send_json("update", req).await
    }

    pub async fn delete(self) -> Result<(), SupabaseError> {
        let req = self
            .client
            .request(reqwest::Method::DELETE, &self.table)
            .query(&self.query_pairs());
        self.send("delete", req).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: &'static str,
        req: RequestBuilder,
    ) -> Result<reqwest::Response, SupabaseError> {
        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(text);

            return Err(SupabaseError::Api {
                method,
                table: self.table.clone(),
                status,
                message,
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: &'static str,
        req: RequestBuilder,
    ) -> Result<Vec<T>, SupabaseError> {
        Ok(self.send(method, req).await?.json().await?)
    }
}
