use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::command::{classify, rewrite, split_args, Classification, RewrittenCommand};
use crate::config::Config;
use crate::error::{FfstageError, Result};
use crate::reconciler::{ReconcileOutcome, Reconciler};
use crate::resolver::{Resolution, Resolver};
use crate::staging::StagingDir;
use crate::storage::{ObjectStorageTrait, StorageFactory};
use crate::transcoder::{TranscoderFactory, TranscoderTrait};

/// Directory name shown in place of a real job id when nothing is created
pub const DRY_RUN_JOB_ID: &str = "<job-id>";

/// One transcode request
#[derive(Debug, Clone)]
pub struct Job {
    pub command_string: String,
    pub staging_root: Option<PathBuf>,
    pub executable: Option<PathBuf>,
}

impl Job {
    pub fn new<S: Into<String>>(command_string: S) -> Self {
        Self {
            command_string: command_string.into(),
            staging_root: None,
            executable: None,
        }
    }

    pub fn with_staging_root(mut self, root: Option<PathBuf>) -> Self {
        self.staging_root = root;
        self
    }

    pub fn with_executable(mut self, executable: Option<PathBuf>) -> Self {
        self.executable = executable;
        self
    }
}

/// Command rewritten for local execution plus what reconciliation needs
#[derive(Debug, Clone)]
pub struct PreparedCommand {
    pub rewritten: RewrittenCommand,
    pub resolution: Resolution,
}

/// Summary of a finished job
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub job_id: String,
    pub staging_dir: PathBuf,
    pub rewritten_command: String,
    pub destination: String,
    pub segmented: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: ReconcileOutcome,
}

pub struct Workflow {
    config: Config,
    storage: Box<dyn ObjectStorageTrait>,
    transcoder: Box<dyn TranscoderTrait>,
}

impl Workflow {
    pub fn new(config: Config) -> Self {
        let storage = StorageFactory::create_storage(config.storage.clone());
        let transcoder = TranscoderFactory::create_transcoder(config.transcoder.clone());
        Self::with_components(config, storage, transcoder)
    }

    pub fn with_components(
        config: Config,
        storage: Box<dyn ObjectStorageTrait>,
        transcoder: Box<dyn TranscoderTrait>,
    ) -> Self {
        Self { config, storage, transcoder }
    }

    /// Tokenize, classify, resolve and rewrite a command for `staging_dir`
    pub async fn prepare_command(
        &self,
        command: &str,
        staging_dir: &Path,
    ) -> Result<PreparedCommand> {
        let parsed = parse_command(command)?;
        self.resolve_command(parsed, staging_dir).await
    }

    async fn resolve_command(
        &self,
        parsed: ParsedCommand,
        staging_dir: &Path,
    ) -> Result<PreparedCommand> {
        let ParsedCommand { tokens, classification } = parsed;

        let resolution = Resolver::new(self.storage.as_ref(), self.config.storage.presign_expiry())
            .resolve(&tokens, &classification, staging_dir)
            .await?;

        for (literal, resolved) in resolution.replacements.iter() {
            debug!("Replacing {} with {}", literal, resolved);
        }

        let rewritten = rewrite(
            &tokens,
            &resolution.replacements,
            resolution.output_index,
            &resolution.local_output,
        );

        Ok(PreparedCommand { rewritten, resolution })
    }

    /// Resolve a job's command without creating anything or running the transcoder
    pub async fn dry_run(&self, job: &Job) -> Result<PreparedCommand> {
        let staging_dir = self.staging_root(job).join(DRY_RUN_JOB_ID);
        self.prepare_command(&job.command_string, &staging_dir).await
    }

    /// Run a job end to end: stage, transcode, reconcile.
    ///
    /// The command is validated before any process is started or any
    /// directory is created.
    pub async fn run(&self, job: &Job) -> Result<JobReport> {
        let started_at = Utc::now();
        let parsed = parse_command(&job.command_string)?;

        self.transcoder
            .check_availability(job.executable.as_deref())
            .await?;

        let staging = StagingDir::prepare(self.staging_root(job)).await?;
        let result = self.execute(job, parsed, &staging, started_at).await;

        if self.config.staging.cleanup {
            if let Err(e) = staging.cleanup().await {
                warn!("Failed to remove staging directory: {}", e);
            }
        }

        let report = result?;
        info!("Job {} completed", report.job_id);
        Ok(report)
    }

    async fn execute(
        &self,
        job: &Job,
        parsed: ParsedCommand,
        staging: &StagingDir,
        started_at: DateTime<Utc>,
    ) -> Result<JobReport> {
        let prepared = self.resolve_command(parsed, staging.path()).await?;
        let resolution = &prepared.resolution;

        info!("Output file: {}", resolution.destination.literal);
        info!("Staging directory: {}", staging.path().display());
        info!("Actual command string: {}", prepared.rewritten.command_string);

        self.transcoder
            .transcode(job.executable.as_deref(), &prepared.rewritten.args, staging.path())
            .await?;

        let outcome = Reconciler::new(self.storage.as_ref())
            .reconcile(&resolution.destination, staging, resolution.segment_pattern.as_ref())
            .await?;

        Ok(JobReport {
            job_id: staging.job_id().to_string(),
            staging_dir: staging.path().to_path_buf(),
            rewritten_command: prepared.rewritten.command_string.clone(),
            destination: resolution.destination.literal.clone(),
            segmented: resolution.is_segmented(),
            started_at,
            finished_at: Utc::now(),
            outcome,
        })
    }

    fn staging_root(&self, job: &Job) -> PathBuf {
        job.staging_root
            .clone()
            .unwrap_or_else(|| self.config.staging.root.clone())
    }
}

struct ParsedCommand {
    tokens: Vec<String>,
    classification: Classification,
}

fn parse_command(command: &str) -> Result<ParsedCommand> {
    if command.trim().is_empty() {
        return Err(FfstageError::MissingCommand);
    }

    let tokens = split_args(command)?;
    let classification = classify(&tokens)?;
    Ok(ParsedCommand { tokens, classification })
}
