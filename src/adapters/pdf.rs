use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::domain::ports::PdfTextExtractor;
use crate::utils::error::{DirectoryError, Result};

/// Flattens a PDF by piping it through `pdftotext - -` (poppler-utils).
#[derive(Debug, Clone)]
pub struct PdfToText {
    program: String,
}

impl PdfToText {
    pub fn new() -> Self {
        Self::with_program("pdftotext")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdfToText {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PdfTextExtractor for PdfToText {
    async fn extract_text(&self, pdf: &[u8]) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(["-", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DirectoryError::PdfDecode {
                message: format!("failed to start {}: {}", self.program, e),
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| DirectoryError::PdfDecode {
            message: format!("{} stdin unavailable", self.program),
        })?;

        // stdin must be fed while stdout drains
        let input = pdf.to_vec();
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await?;
        let written = writer.await.map_err(|e| DirectoryError::PdfDecode {
            message: format!("stdin writer failed: {}", e),
        })?;

        if !output.status.success() {
            return Err(DirectoryError::PdfDecode {
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        written?;

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(bytes = pdf.len(), chars = text.len(), "pdf flattened to text");
        Ok(text)
    }
}
