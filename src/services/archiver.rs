//! 打包服务 - 业务能力层
//!
//! 把下载目录中的结果文件打成一个 zip

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::IN_PROGRESS_MARKER;
use crate::error::{AppError, AppResult};

/// 打包结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    pub path: PathBuf,
    pub entries: usize,
}

/// 将 `source_dir` 下的普通文件（不递归，跳过未完成的下载）打包到 `archive_path`
///
/// 目录为空时也会生成一个合法的空 zip
pub async fn archive_directory(source_dir: &Path, archive_path: &Path) -> AppResult<ArchiveReport> {
    let source_dir = source_dir.to_path_buf();
    let archive_path = archive_path.to_path_buf();

    tokio::task::spawn_blocking(move || write_archive(&source_dir, &archive_path))
        .await
        .map_err(|e| AppError::Archive {
            path: String::new(),
            message: format!("打包任务异常退出: {}", e),
        })?
}

fn write_archive(source_dir: &Path, archive_path: &Path) -> AppResult<ArchiveReport> {
    let with_path = |e: AppError| match e {
        AppError::Archive { message, .. } => AppError::Archive {
            path: archive_path.display().to_string(),
            message,
        },
        other => other,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(source_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        // 未下载完的临时文件不是结果
        if entry
            .file_name()
            .to_string_lossy()
            .to_lowercase()
            .ends_with(IN_PROGRESS_MARKER)
        {
            debug!("跳过未完成的下载: {}", entry.path().display());
            continue;
        }
        files.push(entry.path());
    }
    files.sort();

    if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut zip = ZipWriter::new(File::create(archive_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!("打包: {}", name);
        zip.start_file(name, options)
            .map_err(|e| with_path(e.into()))?;
        let mut input = File::open(path)?;
        io::copy(&mut input, &mut zip)?;
    }
    zip.finish().map_err(|e| with_path(e.into()))?;

    info!(
        "📦 已打包 {} 个文件 -> {}",
        files.len(),
        archive_path.display()
    );

    Ok(ArchiveReport {
        path: archive_path.to_path_buf(),
        entries: files.len(),
    })
}
