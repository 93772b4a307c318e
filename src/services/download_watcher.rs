//! 下载完成检测 - 业务能力层
//!
//! 外部服务不会告诉我们下载何时结束，只能对比下载目录的前后快照：
//! 出现一个快照中没有的、非临时的、扩展名合格的普通文件即视为完成。

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tokio::fs;
use tracing::debug;

use crate::config::{IN_PROGRESS_MARKER, OUTPUT_EXTENSIONS};
use crate::error::AppResult;
use crate::models::DirectorySnapshot;
use crate::services::bounded_wait::{poll_until, WaitOutcome};

/// 文件名是否是合格的转换结果
pub fn is_accepted_output(name: &str) -> bool {
    let lower = name.to_lowercase();
    !lower.ends_with(IN_PROGRESS_MARKER) && OUTPUT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// 下载完成检测器
#[derive(Debug, Clone)]
pub struct DownloadWatcher {
    dir: PathBuf,
    poll_interval: Duration,
}

impl DownloadWatcher {
    pub fn new(dir: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            poll_interval,
        }
    }

    /// 在任务触发下载之前拍下目录快照
    pub async fn snapshot(&self) -> AppResult<DirectorySnapshot> {
        DirectorySnapshot::capture(&self.dir).await
    }

    /// 轮询直到出现新的结果文件或超时
    pub async fn wait_for_download(
        &self,
        snapshot: &DirectorySnapshot,
        timeout: Duration,
    ) -> AppResult<WaitOutcome<PathBuf>> {
        debug!(
            "等待下载完成: {} (快照 {} 项, 时限 {:?})",
            self.dir.display(),
            snapshot.len(),
            timeout
        );
        poll_until(timeout, self.poll_interval, move || self.find_new_download(snapshot)).await
    }

    /// 扫描一次目录，返回快照之后出现的合格文件
    ///
    /// 同时出现多个时取修改时间最早的，时间相同再按文件名
    pub async fn find_new_download(&self, snapshot: &DirectorySnapshot) -> AppResult<Option<PathBuf>> {
        let mut best: Option<(SystemTime, PathBuf)> = None;
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if snapshot.contains(&name) || !is_accepted_output(&name.to_string_lossy()) {
                continue;
            }
            // 快照里已有它的临时文件，说明是之前的任务留下的下载刚刚改名
            let mut partial = name.clone();
            partial.push(IN_PROGRESS_MARKER);
            if snapshot.contains(&partial) {
                debug!("忽略之前任务的下载: {}", name.to_string_lossy());
                continue;
            }
            // 临时文件可能在列目录和读取元数据之间被改名
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            let path = entry.path();
            let better = match &best {
                Some((t, p)) => (modified, &path) < (*t, p),
                None => true,
            };
            if better {
                best = Some((modified, path));
            }
        }

        Ok(best.map(|(_, path)| path))
    }
}
