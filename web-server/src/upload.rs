// web-server/src/upload.rs
use actix_multipart::Multipart;
use common::UploadConfig;
use futures::{StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::error::GatewayError;
use crate::upstream::FileAttachment;

/// Multipart field that carries the spreadsheet
pub const FILE_FIELD: &str = "file";

/// Constraints applied while receiving an upload
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub dir: PathBuf,
    pub max_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

impl From<&UploadConfig> for UploadPolicy {
    fn from(config: &UploadConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            max_bytes: config.max_bytes,
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }
}

impl UploadPolicy {
    pub fn accepts(&self, file_name: &str) -> bool {
        declared_extension(file_name)
            .map(|ext| self.allowed_extensions.iter().any(|allowed| *allowed == ext))
            .unwrap_or(false)
    }

    fn rejection_message(&self) -> String {
        let listed = self
            .allowed_extensions
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Only Excel or CSV files ({}) are allowed.", listed)
    }
}

fn declared_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// An uploaded file held in temporary storage for the duration of one request.
/// The backing file is removed when this value is discarded or dropped.
#[derive(Debug)]
pub struct UploadFile {
    pub original_name: String,
    pub size_bytes: u64,
    pub declared_extension: String,
    temp: NamedTempFile,
}

impl UploadFile {
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn attachment(&self) -> FileAttachment {
        FileAttachment {
            field_name: FILE_FIELD.to_string(),
            file_name: self.original_name.clone(),
            path: self.temp.path().to_path_buf(),
            size_bytes: self.size_bytes,
        }
    }

    /// Delete the temp file now, logging rather than failing if that is not possible
    pub fn discard(self) {
        let path = self.temp.path().to_path_buf();
        if let Err(e) = self.temp.close() {
            tracing::warn!(path = %path.display(), "Failed to remove temporary upload: {}", e);
        }
    }
}

/// Pull the spreadsheet out of a multipart payload.
///
/// `Ok(None)` means no usable `file` field was sent. A payload that is not
/// multipart at all is treated the same way.
pub async fn receive_spreadsheet(
    mut payload: Multipart,
    policy: &UploadPolicy,
) -> Result<Option<UploadFile>, GatewayError> {
    loop {
        let mut field = match payload.next().await {
            Some(Ok(field)) => field,
            Some(Err(e)) => {
                tracing::debug!("Multipart payload unreadable: {}", e);
                return Ok(None);
            }
            None => return Ok(None),
        };

        let disposition = field.content_disposition();
        let is_file_field = disposition.get_name() == Some(FILE_FIELD);
        let file_name = disposition.get_filename().map(str::to_string);

        let original_name = match (is_file_field, file_name) {
            (true, Some(name)) if !name.is_empty() => name,
            _ => {
                // Drain fields we do not care about
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| GatewayError::Validation(e.to_string()))?;
                }
                continue;
            }
        };

        if !policy.accepts(&original_name) {
            return Err(GatewayError::Validation(policy.rejection_message()));
        }

        tokio::fs::create_dir_all(&policy.dir).await?;
        let temp = tempfile::Builder::new()
            .prefix("agents-")
            .tempfile_in(&policy.dir)?;
        let mut out = tokio::fs::File::from_std(temp.reopen()?);

        let mut size_bytes: u64 = 0;
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| GatewayError::Validation(e.to_string()))?
        {
            size_bytes += chunk.len() as u64;
            if size_bytes > policy.max_bytes {
                // `temp` is dropped here, removing the partial file
                return Err(GatewayError::FileTooLarge {
                    limit_bytes: policy.max_bytes,
                });
            }
            out.write_all(&chunk).await?;
        }
        out.flush().await?;

        let declared_extension = declared_extension(&original_name).unwrap_or_default();
        return Ok(Some(UploadFile {
            original_name,
            size_bytes,
            declared_extension,
            temp,
        }));
    }
}
