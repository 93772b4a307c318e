use std::fmt;
use std::path::{Path, PathBuf};

use tracing::warn;

/// 转换任务状态
///
/// 声明顺序即推进顺序，状态只能向前推进或直接进入终止状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobStatus {
    Started,
    Navigated,
    FileSubmitted,
    OptionSelected,
    ConversionTriggered,
    DownloadTriggered,
    Completed,
    TimedOut,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::TimedOut | JobStatus::Failed
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Started => "STARTED",
            JobStatus::Navigated => "NAVIGATED",
            JobStatus::FileSubmitted => "FILE_SUBMITTED",
            JobStatus::OptionSelected => "OPTION_SELECTED",
            JobStatus::ConversionTriggered => "CONVERSION_TRIGGERED",
            JobStatus::DownloadTriggered => "DOWNLOAD_TRIGGERED",
            JobStatus::Completed => "COMPLETED",
            JobStatus::TimedOut => "TIMED_OUT",
            JobStatus::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// 单个 PDF 的一次转换尝试
#[derive(Debug, Clone)]
pub struct ConversionJob {
    source: PathBuf,
    status: JobStatus,
    result: Option<PathBuf>,
    failure_reason: Option<String>,
}

impl ConversionJob {
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            status: JobStatus::Started,
            result: None,
            failure_reason: None,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// 源文件名（用于日志和汇总）
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .unwrap_or(self.source.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn result(&self) -> Option<&Path> {
        self.result.as_deref()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// 推进到下一个非终止状态，返回是否推进成功
    ///
    /// 已终止或试图回退时不做任何修改
    pub fn advance(&mut self, next: JobStatus) -> bool {
        if next.is_terminal() || self.status.is_terminal() || next <= self.status {
            warn!(
                "忽略非法状态转换 {} -> {} ({})",
                self.status,
                next,
                self.source_name()
            );
            return false;
        }
        self.status = next;
        true
    }

    pub fn complete(&mut self, result: PathBuf) {
        if self.finish(JobStatus::Completed) {
            self.result = Some(result);
        }
    }

    pub fn time_out(&mut self, reason: impl Into<String>) {
        if self.finish(JobStatus::TimedOut) {
            self.failure_reason = Some(reason.into());
        }
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.finish(JobStatus::Failed) {
            self.failure_reason = Some(reason.into());
        }
    }

    fn finish(&mut self, terminal: JobStatus) -> bool {
        if self.status.is_terminal() {
            warn!(
                "任务已处于终止状态 {}，忽略 {} ({})",
                self.status,
                terminal,
                self.source_name()
            );
            return false;
        }
        self.status = terminal;
        true
    }
}
