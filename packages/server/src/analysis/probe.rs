use std::path::Path;

use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use super::{AnalysisError, AnalysisResult, Analyser};

/// Cheap built-in analyser describing the file itself.
pub struct ProbeAnalyser;

#[async_trait]
impl Analyser for ProbeAnalyser {
    async fn analyse(&self, path: &Path) -> Result<AnalysisResult, AnalysisError> {
        let mut file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AnalysisError::MissingInput(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut hasher = Sha256::new();
        let mut size: u64 = 0;
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            size += n as u64;
            hasher.update(&buf[..n]);
        }

        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let extension = path.extension().and_then(|e| e.to_str());
        let content_type = mime_guess::from_path(path).first_or_octet_stream();

        Ok(json!({
            "filename": filename,
            "extension": extension,
            "content_type": content_type.as_ref(),
            "size": size,
            "sha256": hex::encode(hasher.finalize()),
        }))
    }
}
