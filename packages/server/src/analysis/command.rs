use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::{AnalysisError, AnalysisResult, Analyser};

const PATH_PLACEHOLDER: &str = "{path}";

/// Runs an external analysis program and parses its stdout as JSON.
pub struct CommandAnalyser {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandAnalyser {
    pub fn new(program: String, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program,
            args,
            timeout,
        }
    }

    /// Substitute the audio path into the configured arguments, appending it
    /// when no argument carries the placeholder.
    fn build_args(&self, path: &Path) -> Vec<String> {
        let path = path.to_string_lossy();
        let mut substituted = false;
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                if arg.contains(PATH_PLACEHOLDER) {
                    substituted = true;
                    arg.replace(PATH_PLACEHOLDER, &path)
                } else {
                    arg.clone()
                }
            })
            .collect();
        if !substituted {
            args.push(path.into_owned());
        }
        args
    }
}

#[async_trait]
impl Analyser for CommandAnalyser {
    #[instrument(skip(self), fields(program = %self.program))]
    async fn analyse(&self, path: &Path) -> Result<AnalysisResult, AnalysisError> {
        if !tokio::fs::try_exists(path).await? {
            return Err(AnalysisError::MissingInput(path.to_path_buf()));
        }

        let child = Command::new(&self.program)
            .args(self.build_args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| AnalysisError::TimedOut(self.timeout))??;

        if !output.status.success() {
            return Err(AnalysisError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(bytes = output.stdout.len(), "Analyser finished");
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}
