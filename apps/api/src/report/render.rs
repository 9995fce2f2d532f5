//! Report renderer: parse, build the report tree, hand it to a backend.
//!
//! Serialization is CPU-bound, so it runs inside `tokio::task::spawn_blocking`.
//! That is the only await point; there is no partial output on failure.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

use crate::report::builder::{build_report, report_date};
use crate::report::document::{HeadingLevel, ReportDocument};
use crate::report::docx::DocxBackend;
use crate::report::models::{GrantRecord, ReportRequest};
use crate::report::parser::parse_grants;

const FILENAME_STEM: &str = "grant-research-report";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Document serialization failed: {0}")]
    Serialization(String),
}

impl From<zip::result::ZipError> for RenderError {
    fn from(e: zip::result::ZipError) -> Self {
        RenderError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        RenderError::Serialization(e.to_string())
    }
}

/// Encodes a `ReportDocument` into a concrete file format.
///
/// Swap implementations to change the output format without touching
/// report content logic.
pub trait DocumentBackend: Send + Sync {
    fn name(&self) -> &str;
    fn content_type(&self) -> &str;
    fn extension(&self) -> &str;
    fn serialize(&self, doc: &ReportDocument) -> Result<Bytes, RenderError>;
}

/// A finished report, ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Bytes,
    pub filename: String,
    pub content_type: String,
}

#[derive(Clone)]
pub struct ReportRenderer {
    backend: Arc<dyn DocumentBackend>,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new(Arc::new(DocxBackend))
    }
}

impl ReportRenderer {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    /// Parses `request.text` into grants and renders the full report.
    pub async fn render(&self, request: &ReportRequest) -> Result<RenderedDocument, RenderError> {
        let grants = parse_grants(&request.text);
        self.render_records(request, &grants).await
    }

    /// Renders already-parsed grant records.
    pub async fn render_records(
        &self,
        request: &ReportRequest,
        grants: &[GrantRecord],
    ) -> Result<RenderedDocument, RenderError> {
        let document = build_report(request, grants);
        debug!(
            "Built report tree: {} blocks, {} grant sections",
            document.blocks.len(),
            document.headings(HeadingLevel::Three).count()
        );

        let backend = Arc::clone(&self.backend);
        let bytes = tokio::task::spawn_blocking(move || backend.serialize(&document))
            .await
            .map_err(|e| RenderError::Serialization(format!("render worker failed: {e}")))??;

        info!(
            "Rendered {} report: {} grants, {} bytes",
            self.backend.name(),
            grants.len(),
            bytes.len()
        );

        Ok(RenderedDocument {
            bytes,
            filename: report_filename(&request.timestamp, self.backend.extension()),
            content_type: self.backend.content_type().to_string(),
        })
    }
}

/// `grant-research-report-2026-03-02.docx`, or the bare stem when the timestamp is unreadable.
pub fn report_filename(timestamp: &str, extension: &str) -> String {
    match report_date(timestamp) {
        Some(date) => format!("{FILENAME_STEM}-{}.{extension}", date.format("%Y-%m-%d")),
        None => format!("{FILENAME_STEM}.{extension}"),
    }
}
