//! Remote tabular store integrations

pub mod supabase;

pub use supabase::SupabaseClient;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::AppResult;

/// A JSON row as sent to the remote store.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// The remote tabular store the pipeline writes to.
///
/// The pipeline depends only on these three operations. Production code
/// talks to Supabase through [`SupabaseClient`]; tests supply in-memory
/// doubles.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Append rows to a table.
    async fn insert(&self, table: &str, rows: &[Row]) -> AppResult<()>;

    /// Insert rows, merging with existing rows that share the table's
    /// unique key. `on_conflict` names the key column(s) when the table
    /// has more than one candidate.
    async fn upsert(&self, table: &str, rows: &[Row], on_conflict: Option<&str>) -> AppResult<()>;

    /// Fetch `{key_column value -> generated id}` pairs for a table.
    async fn fetch_id_map(&self, table: &str, key_column: &str) -> AppResult<HashMap<String, i64>>;
}
