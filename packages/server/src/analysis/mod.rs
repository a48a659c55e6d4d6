mod command;
mod probe;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{AnalysisBackend, AnalysisConfig};

pub use command::CommandAnalyser;
pub use probe::ProbeAnalyser;

/// Structured analysis output. Its shape belongs to the analyser.
pub type AnalysisResult = serde_json::Value;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Analysis input not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Analyser exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Analyser produced invalid output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("Analysis timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Analyser misconfigured: {0}")]
    Config(String),
}

/// Turns an uploaded audio file into a structured result.
#[async_trait]
pub trait Analyser: Send + Sync {
    async fn analyse(&self, path: &Path) -> Result<AnalysisResult, AnalysisError>;
}

/// Build the analyser selected by configuration.
pub fn from_config(config: &AnalysisConfig) -> Result<Arc<dyn Analyser>, AnalysisError> {
    match config.backend {
        AnalysisBackend::Probe => Ok(Arc::new(ProbeAnalyser)),
        AnalysisBackend::Command => {
            let program = config.command.clone().ok_or_else(|| {
                AnalysisError::Config("analysis.command is required for the command backend".into())
            })?;
            Ok(Arc::new(CommandAnalyser::new(
                program,
                config.args.clone(),
                Duration::from_secs(config.timeout_secs),
            )))
        }
    }
}
