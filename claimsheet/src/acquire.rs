//! Locating the claim file: either a local path or a download from DCI.

use crate::credentials::{CredentialChain, Credentials};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Input file not found: {path}")]
    FileNotFound { path: String },
    #[error(
        "Missing DCI credentials: {}. Export them or add `export NAME=value` lines to the credentials file",
        .missing.join(", ")
    )]
    MissingCredentials { missing: Vec<String> },
    #[error("Failed to fetch claim for job '{job_id}': {message}")]
    FetchFailed { job_id: String, message: String },
}

pub type AcquisitionResult<T> = Result<T, AcquisitionError>;

/// Downloads a job's claim file to a local path.
#[async_trait]
pub trait ClaimFetcher: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(
        &self,
        job_id: &str,
        target: &Path,
        credentials: &Credentials,
    ) -> AcquisitionResult<()>;
}

pub const DEFAULT_FETCH_COMMAND: &str = "dcictl";
const FILE_LIST_LIMIT: u32 = 200;

/// Fetches claims by driving the `dcictl` command line client.
#[derive(Debug, Clone)]
pub struct DciFetcher {
    program: String,
    base_args: Vec<OsString>,
    list_limit: u32,
}

impl Default for DciFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl DciFetcher {
    pub fn new() -> Self {
        Self {
            program: DEFAULT_FETCH_COMMAND.to_string(),
            base_args: Vec::new(),
            list_limit: FILE_LIST_LIMIT,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments placed before every subcommand, e.g. a wrapper script path.
    pub fn with_base_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.base_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_list_limit(mut self, limit: u32) -> Self {
        self.list_limit = limit;
        self
    }

    async fn run(
        &self,
        job_id: &str,
        args: &[OsString],
        credentials: &Credentials,
    ) -> AcquisitionResult<String> {
        let failed = |message: String| AcquisitionError::FetchFailed {
            job_id: job_id.to_string(),
            message,
        };
        let subcommand = args
            .first()
            .map(|a| a.to_string_lossy().into_owned())
            .unwrap_or_default();

        debug!(program = %self.program, subcommand = %subcommand, "running fetch command");
        let output = Command::new(&self.program)
            .args(&self.base_args)
            .args(args)
            .envs(credentials.iter())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| failed(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!(
                "{} {} exited with {}: {}",
                self.program,
                subcommand,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ClaimFetcher for DciFetcher {
    fn name(&self) -> &str {
        &self.program
    }

    async fn fetch(
        &self,
        job_id: &str,
        target: &Path,
        credentials: &Credentials,
    ) -> AcquisitionResult<()> {
        let listing = self
            .run(
                job_id,
                &[
                    "file-list".into(),
                    job_id.into(),
                    "--limit".into(),
                    self.list_limit.to_string().into(),
                ],
                credentials,
            )
            .await?;

        let file_ids = claim_file_ids(&listing);
        if file_ids.is_empty() {
            return Err(AcquisitionError::FetchFailed {
                job_id: job_id.to_string(),
                message: "no claim.json file listed for the job".to_string(),
            });
        }
        info!(job_id, files = file_ids.len(), "found claim file");

        self.run(
            job_id,
            &[
                "job-download-file".into(),
                job_id.into(),
                "--file-id".into(),
                file_ids.join(",").into(),
                "--target".into(),
                target.as_os_str().to_owned(),
            ],
            credentials,
        )
        .await?;

        Ok(())
    }
}

/// File ids of the `claim.json` entries in a `dcictl file-list` table.
pub fn claim_file_ids(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter(|line| line.contains("claim.json") && line.contains("text/plain"))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(|id| id.trim_matches('|').to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Resolve the claim file to parse.
///
/// Without a job id `input` must already exist. With one, credentials are
/// resolved first and the claim is downloaded to `input`.
pub async fn acquire(
    input: &Path,
    job_id: Option<&str>,
    fetcher: &dyn ClaimFetcher,
    credentials: &CredentialChain,
) -> AcquisitionResult<PathBuf> {
    let Some(job_id) = job_id else {
        if !input.is_file() {
            return Err(AcquisitionError::FileNotFound {
                path: input.display().to_string(),
            });
        }
        info!(path = %input.display(), "using local claim file");
        return Ok(input.to_path_buf());
    };

    let resolved = credentials.resolve()?;
    info!(job_id, fetcher = fetcher.name(), "fetching claim");
    fetcher.fetch(job_id, input, &resolved).await?;

    if !input.is_file() {
        return Err(AcquisitionError::FetchFailed {
            job_id: job_id.to_string(),
            message: format!("download finished but {} does not exist", input.display()),
        });
    }

    Ok(input.to_path_buf())
}
