//! The base extractor contract: identity, declared table expectations,
//! and the coverage-tracked read helpers every concrete extractor
//! routes its reads through.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use erp_coverage::{CoverageDetail, CoverageStatus, CoverageTracker, ExtractionContext, TableExpectation};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::transport::{ReadOptions, Row, StreamOptions, Transport, TransportError};

/// Who an extractor is, for registry lookup and reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorIdentity {
    pub extractor_id: String,
    pub name: String,
    pub module: String,
    pub category: String,
}

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("no transport configured for live extraction")]
    NoTransport,
    #[error("extractor error: {0}")]
    Other(String),
}

/// A shared, serialisable result record. Rather than a per-extractor
/// sum-type variant, every extractor erases its output to this common
/// shape; the per-extractor schema lives alongside the extractor as
/// its `expected_tables()` declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractorOutput {
    pub extractor_id: String,
    /// table name -> rows read (live or fixture)
    pub tables: BTreeMap<String, Vec<Row>>,
    /// free-form extractor-computed summary fields
    pub metadata: Value,
}

impl ExtractorOutput {
    pub fn new(extractor_id: impl Into<String>) -> Self {
        Self {
            extractor_id: extractor_id.into(),
            tables: BTreeMap::new(),
            metadata: Value::Null,
        }
    }

    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// The tagged result stored in the orchestrator's results map: either
/// a successful `ExtractorOutput`, or the captured error message from
/// an uncaught extractor failure (spec §7 `extractor_error`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtractorResult {
    Ok(ExtractorOutput),
    Error(String),
}

impl ExtractorResult {
    pub fn output(&self) -> Option<&ExtractorOutput> {
        match self {
            ExtractorResult::Ok(output) => Some(output),
            ExtractorResult::Error(_) => None,
        }
    }
}

/// Coverage-tracked read helper handed to `extract_live`/`extract_offline`.
/// Every read is wrapped so success/failure/skip is recorded against
/// the owning extractor's identity.
pub struct ExtractHelper {
    identity: ExtractorIdentity,
    tracker: Arc<CoverageTracker>,
    transport: Option<Arc<dyn Transport>>,
}

impl ExtractHelper {
    pub fn new(
        identity: ExtractorIdentity,
        tracker: Arc<CoverageTracker>,
        transport: Option<Arc<dyn Transport>>,
    ) -> Self {
        Self {
            identity,
            tracker,
            transport,
        }
    }

    fn transport(&self) -> Result<&Arc<dyn Transport>, ExtractorError> {
        self.transport.as_ref().ok_or(ExtractorError::NoTransport)
    }

    pub async fn read_table(&self, name: &str, opts: ReadOptions) -> Result<Vec<Row>, ExtractorError> {
        match self.transport()?.read_table(name, opts).await {
            Ok(rows) => {
                self.tracker.track(
                    self.identity.extractor_id.clone(),
                    name,
                    CoverageStatus::Extracted,
                    CoverageDetail::rows(rows.len() as u64),
                );
                Ok(rows)
            }
            Err(e) => {
                tracing::warn!(extractor_id = %self.identity.extractor_id, table = name, error = %e, "table read failed");
                self.tracker.track(
                    self.identity.extractor_id.clone(),
                    name,
                    CoverageStatus::Failed,
                    CoverageDetail::error(e.to_string()),
                );
                Err(ExtractorError::Transport(e))
            }
        }
    }

    /// Reads a table but tolerates a transport failure by recording it
    /// and returning an empty result set, for extractors where a
    /// single missing table should not abort the whole extraction.
    pub async fn try_read_table(&self, name: &str, opts: ReadOptions) -> Vec<Row> {
        self.read_table(name, opts).await.unwrap_or_default()
    }

    pub async fn stream_table(
        &self,
        name: &str,
        opts: StreamOptions,
    ) -> Result<Vec<Row>, ExtractorError> {
        let transport = self.transport()?;
        let stream = transport.stream_table(name, opts).await;
        let mut rows = Vec::new();
        match stream {
            Ok(mut s) => {
                while let Some(chunk) = s.next().await {
                    match chunk {
                        Ok(chunk) => rows.extend(chunk.rows),
                        Err(e) => {
                            self.tracker.track(
                                self.identity.extractor_id.clone(),
                                name,
                                CoverageStatus::Partial,
                                CoverageDetail {
                                    row_count: Some(rows.len() as u64),
                                    error: Some(e.to_string()),
                                    reason: None,
                                },
                            );
                            return Ok(rows);
                        }
                    }
                }
                self.tracker.track(
                    self.identity.extractor_id.clone(),
                    name,
                    CoverageStatus::Extracted,
                    CoverageDetail::rows(rows.len() as u64),
                );
                Ok(rows)
            }
            Err(e) => {
                self.tracker.track(
                    self.identity.extractor_id.clone(),
                    name,
                    CoverageStatus::Failed,
                    CoverageDetail::error(e.to_string()),
                );
                Err(ExtractorError::Transport(e))
            }
        }
    }

    pub async fn call_fm(&self, name: &str, params: Value) -> Result<Value, ExtractorError> {
        match self.transport()?.call_fm(name, params).await {
            Ok(v) => {
                self.tracker.track(
                    self.identity.extractor_id.clone(),
                    name,
                    CoverageStatus::Extracted,
                    CoverageDetail::rows(1),
                );
                Ok(v)
            }
            Err(e) => {
                self.tracker.track(
                    self.identity.extractor_id.clone(),
                    name,
                    CoverageStatus::Failed,
                    CoverageDetail::error(e.to_string()),
                );
                Err(ExtractorError::Transport(e))
            }
        }
    }

    pub async fn read_odata(&self, service: &str, entity: &str) -> Result<Vec<Row>, ExtractorError> {
        match self.transport()?.read_odata(service, entity).await {
            Ok(rows) => {
                self.tracker.track(
                    self.identity.extractor_id.clone(),
                    entity,
                    CoverageStatus::Extracted,
                    CoverageDetail::rows(rows.len() as u64),
                );
                Ok(rows)
            }
            Err(e) => {
                self.tracker.track(
                    self.identity.extractor_id.clone(),
                    entity,
                    CoverageStatus::Failed,
                    CoverageDetail::error(e.to_string()),
                );
                Err(ExtractorError::Transport(e))
            }
        }
    }

    /// Records rows sourced from an extractor-declared offline
    /// fixture (no transport round-trip) as extracted.
    pub fn offline_rows(&self, name: &str, rows: Vec<Row>) -> Vec<Row> {
        self.tracker.track(
            self.identity.extractor_id.clone(),
            name,
            CoverageStatus::Extracted,
            CoverageDetail::rows(rows.len() as u64),
        );
        rows
    }

    /// Deliberately skips a declared table (e.g. RFC-only table in
    /// OData mode), recording why.
    pub fn skip_table(&self, name: &str, reason: impl Into<String>) {
        self.tracker.track(
            self.identity.extractor_id.clone(),
            name,
            CoverageStatus::Skipped,
            CoverageDetail::reason(reason),
        );
    }
}

/// The contract every concrete extractor implements. `extract()` is
/// the single entry point the orchestrator calls; it is provided and
/// routes to `extract_live`/`extract_offline` per the context's mode.
#[async_trait]
pub trait BaseExtractor: Send + Sync {
    fn identity(&self) -> ExtractorIdentity;
    fn expected_tables(&self) -> Vec<TableExpectation>;

    async fn extract_live(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError>;
    async fn extract_offline(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError>;

    async fn extract(&self, ctx: &ExtractionContext<dyn Transport>) -> ExtractorResult {
        let identity = self.identity();
        let helper = ExtractHelper::new(identity.clone(), ctx.tracker(), ctx.transport().cloned());
        tracing::info!(extractor_id = %identity.extractor_id, mode = ?ctx.mode, "extractor starting");
        let result = if ctx.is_live() {
            self.extract_live(&helper).await
        } else {
            self.extract_offline(&helper).await
        };
        match result {
            Ok(output) => ExtractorResult::Ok(output),
            Err(e) => {
                tracing::error!(extractor_id = %identity.extractor_id, error = %e, "extractor failed");
                ExtractorResult::Error(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erp_coverage::ExtractionMode;

    struct Dummy;

    #[async_trait]
    impl BaseExtractor for Dummy {
        fn identity(&self) -> ExtractorIdentity {
            ExtractorIdentity {
                extractor_id: "DUMMY".into(),
                name: "Dummy".into(),
                module: "test".into(),
                category: "test".into(),
            }
        }

        fn expected_tables(&self) -> Vec<TableExpectation> {
            vec![TableExpectation::new("T1", "test table")]
        }

        async fn extract_live(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
            let rows = helper.read_table("T1", ReadOptions::default()).await?;
            let mut out = ExtractorOutput::new("DUMMY");
            out.tables.insert("T1".into(), rows);
            Ok(out)
        }

        async fn extract_offline(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
            self.extract_live(helper).await
        }
    }

    #[tokio::test]
    async fn extract_tracks_coverage_on_success() {
        use crate::transport::OfflineTransport;
        let transport: Arc<dyn Transport> =
            Arc::new(OfflineTransport::new().with_fixture("T1", vec![serde_json::json!({"x": 1})]));
        let ctx: ExtractionContext<dyn Transport> =
            ExtractionContext::new(ExtractionMode::Offline, Some(transport));

        let result = Dummy.extract(&ctx).await;
        match result {
            ExtractorResult::Ok(output) => assert_eq!(output.rows("T1").len(), 1),
            ExtractorResult::Error(e) => panic!("unexpected error: {e}"),
        }
        let report = ctx.tracker().report("DUMMY");
        assert_eq!(report.extracted, 1);
    }

    #[tokio::test]
    async fn extract_tracks_coverage_on_failure_and_does_not_panic() {
        let ctx: ExtractionContext<dyn Transport> = ExtractionContext::new(ExtractionMode::Offline, None);
        let result = Dummy.extract(&ctx).await;
        assert!(matches!(result, ExtractorResult::Error(_)));
    }
}
