//! The transport interface extractors read through, plus an in-memory
//! fixture-backed implementation used in offline mode and by tests.
//!
//! The live transport (RFC pool, OData client, JDBC, CSV reader) is an
//! external collaborator — only its interface is specified here.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum TransportError {
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("authorization error: {0}")]
    Authorization(String),
    #[error("timeout reading {0}")]
    Timeout(String),
    #[error("remote function module error: {0}")]
    FunctionModule(String),
}

/// A single record read from a table; an opaque JSON object, since
/// table schemas vary per ERP and per extractor.
pub type Row = Value;

/// A chunk of rows returned by a streaming read.
#[derive(Debug, Clone, Default)]
pub struct TableChunk {
    pub rows: Vec<Row>,
}

/// A bounded table read.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub fields: Vec<String>,
    pub where_clause: Option<String>,
    pub max_rows: Option<usize>,
}

/// A streaming table read; in addition to `ReadOptions`, bounds how
/// many rows are materialised per chunk.
#[derive(Debug, Clone, Default)]
pub struct StreamOptions {
    pub read: ReadOptions,
    pub chunk_size: usize,
}

/// The read-only transport interface consumed by every extractor.
/// Every method is a suspension point (spec §5) — no other code path
/// in this workspace performs I/O.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn read_table(&self, name: &str, opts: ReadOptions) -> Result<Vec<Row>, TransportError>;

    /// Returns a finite, non-restartable lazy sequence of chunks.
    /// Implementations MUST release any transport-side resources when
    /// the stream is dropped before exhaustion.
    async fn stream_table(
        &self,
        name: &str,
        opts: StreamOptions,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<TableChunk, TransportError>> + Send>>, TransportError>;

    async fn call_fm(&self, name: &str, params: Value) -> Result<Value, TransportError>;

    async fn read_odata(&self, service: &str, entity: &str) -> Result<Vec<Row>, TransportError>;
}

/// In-memory transport backed by per-extractor fixture tables. This is
/// the one concrete `Transport` this workspace ships; it is what every
/// extractor's `extract_offline()` path and test suite reads from.
#[derive(Debug, Default)]
pub struct OfflineTransport {
    /// table name -> fixture rows
    fixtures: RwLock<BTreeMap<String, Arc<Vec<Row>>>>,
}

impl OfflineTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixture(self, table: impl Into<String>, rows: Vec<Row>) -> Self {
        self.fixtures.write().insert(table.into(), Arc::new(rows));
        self
    }

    pub fn set_fixture(&self, table: impl Into<String>, rows: Vec<Row>) {
        self.fixtures.write().insert(table.into(), Arc::new(rows));
    }
}

#[async_trait]
impl Transport for OfflineTransport {
    async fn read_table(&self, name: &str, opts: ReadOptions) -> Result<Vec<Row>, TransportError> {
        let rows = self
            .fixtures
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| TransportError::TableNotFound(name.to_string()))?;
        let mut rows = (*rows).clone();
        if let Some(max) = opts.max_rows {
            rows.truncate(max);
        }
        Ok(rows)
    }

    async fn stream_table(
        &self,
        name: &str,
        opts: StreamOptions,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<TableChunk, TransportError>> + Send>>, TransportError> {
        let rows = self.read_table(name, opts.read).await?;
        let chunk_size = opts.chunk_size.max(1);
        let chunks: Vec<TableChunk> = rows
            .chunks(chunk_size)
            .map(|c| TableChunk { rows: c.to_vec() })
            .collect();
        Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok))))
    }

    async fn call_fm(&self, name: &str, _params: Value) -> Result<Value, TransportError> {
        Err(TransportError::FunctionModule(format!(
            "no offline fixture registered for function module {name}"
        )))
    }

    async fn read_odata(&self, _service: &str, entity: &str) -> Result<Vec<Row>, TransportError> {
        self.read_table(entity, ReadOptions::default()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::pin_mut;
    use serde_json::json;

    #[tokio::test]
    async fn read_table_returns_fixture_rows() {
        let t = OfflineTransport::new().with_fixture("BKPF", vec![json!({"a": 1}), json!({"a": 2})]);
        let rows = t.read_table("BKPF", ReadOptions::default()).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn read_table_missing_is_not_found() {
        let t = OfflineTransport::new();
        let err = t.read_table("MISSING", ReadOptions::default()).await.unwrap_err();
        assert!(matches!(err, TransportError::TableNotFound(_)));
    }

    #[tokio::test]
    async fn stream_table_yields_bounded_chunks() {
        let rows: Vec<Row> = (0..10).map(|i| json!({"i": i})).collect();
        let t = OfflineTransport::new().with_fixture("T", rows);
        let stream = t
            .stream_table(
                "T",
                StreamOptions {
                    read: ReadOptions::default(),
                    chunk_size: 3,
                },
            )
            .await
            .unwrap();
        pin_mut!(stream);
        let mut total = 0;
        let mut chunk_count = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.unwrap();
            total += chunk.rows.len();
            chunk_count += 1;
        }
        assert_eq!(total, 10);
        assert_eq!(chunk_count, 4); // 3,3,3,1
    }

    #[tokio::test]
    async fn max_rows_truncates() {
        let rows: Vec<Row> = (0..10).map(|i| json!({"i": i})).collect();
        let t = OfflineTransport::new().with_fixture("T", rows);
        let result = t
            .read_table("T", ReadOptions { max_rows: Some(4), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(result.len(), 4);
    }
}
