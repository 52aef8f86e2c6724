use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::error::{FfstageError, Result};

/// External program invocation shared by the transcoder and storage CLI
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
    pub working_dir: Option<PathBuf>,
}

/// Captured result of a finished child process
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Diagnostic text for failures: stderr when present, otherwise the exit code
    pub fn diagnostics(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

impl ExternalCommand {
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
            working_dir: None,
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add a path argument
    pub fn path_arg<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add an argument only when a value is present
    pub fn optional_arg<S: Into<String>>(self, flag: &str, value: Option<S>) -> Self {
        match value {
            Some(v) => self.arg(flag).arg(v),
            None => self,
        }
    }

    /// Run the child process with the given working directory
    pub fn current_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Run to completion and capture its output.
    ///
    /// Only a failure to spawn is an error here; the exit status is left to
    /// the caller, which knows what a failure means for its operation.
    pub async fn output(&self) -> Result<CommandOutput> {
        debug!("Executing {}: {} {:?}", self.description, self.binary_path, self.args);

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|e| FfstageError::Process {
            program: self.binary_path.clone(),
            message: e.to_string(),
        })?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
