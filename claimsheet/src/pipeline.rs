//! End-to-end run: acquire, parse, summarize, render.

use crate::acquire::{acquire, AcquisitionError, ClaimFetcher};
use crate::credentials::CredentialChain;
use claim::{ClaimDocument, ClaimError, ReportConfig, ReportSummary, StatusCounts};
use report_builder::{sheet_name_for, RenderError, ReportBuilder};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Claim(#[from] ClaimError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Claim file to parse, or the download target when `job_id` is set.
    pub input: PathBuf,
    pub output: PathBuf,
    pub job_id: Option<String>,
    pub config: ReportConfig,
}

impl RunOptions {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            job_id: None,
            config: ReportConfig::default(),
        }
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_config(mut self, config: ReportConfig) -> Self {
        self.config = config;
        self
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub output: PathBuf,
    pub counts: StatusCounts,
    pub warnings: usize,
}

pub async fn run(
    options: &RunOptions,
    fetcher: &dyn ClaimFetcher,
    credentials: &CredentialChain,
) -> AppResult<RunReport> {
    let claim_path = acquire(
        &options.input,
        options.job_id.as_deref(),
        fetcher,
        credentials,
    )
    .await?;

    let doc = ClaimDocument::from_path(&claim_path)?;
    generate_report(&doc, options)
}

/// Summarize an already parsed claim and write the workbook.
pub fn generate_report(doc: &ClaimDocument, options: &RunOptions) -> AppResult<RunReport> {
    if doc.is_empty() {
        warn!("claim has no test results, writing an empty report");
    }
    if !doc.warnings.is_empty() {
        warn!(count = doc.warnings.len(), "some claim records were malformed");
    }

    let summary = ReportSummary::build(doc, &options.config);

    let mut builder = ReportBuilder::new(options.config.output.clone())
        .with_sheet_name(&sheet_name_for(&options.output));
    if let Some(job_id) = &options.job_id {
        builder = builder.with_job_id(job_id.as_str());
    }
    builder.write(&summary, &doc.versions, &options.output)?;

    info!(
        total = summary.overall.total,
        failed = summary.overall.failed,
        "report complete"
    );

    Ok(RunReport {
        output: options.output.clone(),
        counts: summary.overall,
        warnings: doc.warnings.len(),
    })
}
