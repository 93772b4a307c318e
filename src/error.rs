use std::time::Duration;

use thiserror::Error;

/// 应用程序错误类型
///
/// 只有 `DirectoryNotFound` 与 `SessionFailed` 会终止整个批次，
/// 其余错误都在单个任务边界内被转换为任务的终止状态。
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入目录不存在或不是目录
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },

    /// 页面控件在限定时间内没有达到预期状态
    ///
    /// `last_error` 保存轮询期间最后一次检查失败的原因
    #[error("等待控件 `{element}` 超时 ({timeout:?}){}", error_suffix(.last_error))]
    ElementTimeout {
        element: String,
        timeout: Duration,
        last_error: Option<String>,
    },

    /// 限定时间内没有出现合格的下载文件
    #[error("等待下载完成超时 ({timeout:?})")]
    DownloadTimeout { timeout: Duration },

    /// 与外部服务交互时发生的意外错误（导航失败、脚本执行失败等）
    #[error("交互失败 [{step}]: {message}")]
    InteractionFault { step: String, message: String },

    /// 浏览器会话启动或配置失败
    #[error("浏览器会话失败: {message}")]
    SessionFailed { message: String },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config { message: String },

    /// 打包失败
    #[error("打包失败 ({path}): {message}")]
    Archive { path: String, message: String },

    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),
}

// ========== 从常见错误类型转换 ==========

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config {
            message: err.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::Archive {
            path: String::new(),
            message: err.to_string(),
        }
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建交互失败错误
    pub fn interaction(step: impl Into<String>, source: impl std::fmt::Display) -> Self {
        AppError::InteractionFault {
            step: step.into(),
            message: source.to_string(),
        }
    }

    /// 创建会话失败错误
    pub fn session(source: impl std::fmt::Display) -> Self {
        AppError::SessionFailed {
            message: source.to_string(),
        }
    }
}

fn error_suffix(last_error: &Option<String>) -> String {
    last_error
        .as_ref()
        .map(|e| format!(", 最后一次检查失败: {}", e))
        .unwrap_or_default()
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
