//! Supabase client for the remote relational store
//!
//! Talks to the project's PostgREST endpoint. Upserts rely on the
//! `resolution=merge-duplicates` preference plus the destination table's
//! unique key.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, AppResult};
use crate::external::{Row, TabularStore};

/// Supabase PostgREST client
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    /// Create a new SupabaseClient for a project URL and API key
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    async fn send_rows(
        &self,
        table: &str,
        rows: &[Row],
        prefer: &str,
        on_conflict: Option<&str>,
    ) -> AppResult<()> {
        let mut request = self
            .client
            .post(self.rest_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", prefer)
            .json(rows);

        if let Some(key) = on_conflict {
            request = request.query(&[("on_conflict", key)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Store(format!("request to '{}' failed: {}", table, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Store(format!(
                "'{}' returned {}: {}",
                table, status, body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl TabularStore for SupabaseClient {
    async fn insert(&self, table: &str, rows: &[Row]) -> AppResult<()> {
        self.send_rows(table, rows, "return=minimal", None).await
    }

    async fn upsert(&self, table: &str, rows: &[Row], on_conflict: Option<&str>) -> AppResult<()> {
        self.send_rows(
            table,
            rows,
            "resolution=merge-duplicates,return=minimal",
            on_conflict,
        )
        .await
    }

    async fn fetch_id_map(&self, table: &str, key_column: &str) -> AppResult<HashMap<String, i64>> {
        let response = self
            .client
            .get(self.rest_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[("select", format!("id,{}", key_column))])
            .send()
            .await
            .map_err(|e| AppError::Store(format!("request to '{}' failed: {}", table, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Store(format!(
                "'{}' returned {}: {}",
                table, status, body
            )));
        }

        let rows: Vec<HashMap<String, serde_json::Value>> = response
            .json()
            .await
            .map_err(|e| AppError::Store(format!("failed to parse '{}' response: {}", table, e)))?;

        let mut map = HashMap::with_capacity(rows.len());
        for row in rows {
            let id = row.get("id").and_then(|v| v.as_i64());
            let key = row.get(key_column).and_then(|v| v.as_str());
            match (id, key) {
                (Some(id), Some(key)) => {
                    map.insert(key.to_string(), id);
                }
                _ => {
                    return Err(AppError::Store(format!(
                        "malformed id row in '{}' response",
                        table
                    )));
                }
            }
        }

        Ok(map)
    }
}
