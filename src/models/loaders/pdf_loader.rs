use std::path::{Path, PathBuf};

use tokio::fs;

use crate::config::SOURCE_EXTENSION;
use crate::error::{AppError, AppResult};

/// 输入目录中待转换的 PDF 列表
///
/// 按文件名排序，目录内容不变时多次扫描得到相同顺序；可反复迭代
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfFiles {
    paths: Vec<PathBuf>,
}

impl PdfFiles {
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl IntoIterator for PdfFiles {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl<'a> IntoIterator for &'a PdfFiles {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// 文件名是否以 `.pdf` 结尾（不区分大小写）
pub fn is_source_file_name(name: &str) -> bool {
    name.to_lowercase().ends_with(SOURCE_EXTENSION)
}

/// 扫描文件夹中的所有 PDF 文件
pub async fn discover_pdf_files(folder: &Path) -> AppResult<PdfFiles> {
    let is_dir = fs::metadata(folder)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(AppError::DirectoryNotFound {
            path: folder.display().to_string(),
        });
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(folder).await?;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if !is_source_file_name(&name.to_string_lossy()) {
            continue;
        }
        if !entry.file_type().await?.is_file() {
            tracing::debug!("跳过同名目录: {}", entry.path().display());
            continue;
        }
        paths.push(entry.path());
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    tracing::info!("在 {} 中找到 {} 个 PDF", folder.display(), paths.len());

    Ok(PdfFiles { paths })
}
