use crate::core::parser::SheetFormat;
use crate::utils::error::{ImportError, Result};
use std::path::{Path, PathBuf};

/// 上傳檔案的暫存位置。`temporary` 模式下，guard 被 drop 時一定刪檔，
/// 不論匯入成功、部分失敗或整批失敗。
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    original_name: String,
    remove_on_drop: bool,
}

impl StagedUpload {
    /// 由上傳流程暫存的檔案，處理完即刪除
    pub fn temporary(path: impl Into<PathBuf>, original_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            original_name: original_name.into(),
            remove_on_drop: true,
        }
    }

    /// 使用者自己的檔案，不刪除
    pub fn retained(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let original_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            path,
            original_name,
            remove_on_drop: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// 檢查副檔名與大小，回傳檔案格式；不合格的檔案不會進入匯入流程
    pub async fn check(&self, max_size: u64) -> Result<SheetFormat> {
        let format = SheetFormat::from_file_name(&self.original_name)?;

        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ImportError::MissingFileError {
                    path: self.path.display().to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.len() > max_size {
            return Err(ImportError::FileTooLargeError {
                size: metadata.len(),
                limit: max_size,
            });
        }

        Ok(format)
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if !self.remove_on_drop {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("🧹 Removed staged upload {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "⚠️ Failed to remove staged upload {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
