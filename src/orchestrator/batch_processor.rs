//! 批量处理入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志文件、选择器配置
//! 2. **文件发现**：扫描输入目录（目录不存在时整个批次失败）
//! 3. **资源管理**：批次内只启动一个浏览器会话，结束时保证关闭
//! 4. **打包**：把下载目录打成一个 zip
//! 5. **全局统计**：输出并记录成功/超时/失败数量

use std::future::Future;

use anyhow::{Context, Result};
use tracing::warn;

use crate::browser::{run_scoped, AutomationSession, ChromeSession};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{discover_pdf_files, BatchRun, BatchSummary};
use crate::orchestrator::batch_runner::run_batch;
use crate::services::{archive_directory, ArchiveReport};
use crate::utils::logging::{
    append_summary_to_log_file, init_log_file, log_files_found, log_startup, print_final_stats,
};

/// 应用主结构
pub struct App {
    config: Config,
}

/// 一次完整运行的结果
#[derive(Debug)]
pub struct RunReport {
    pub summary: BatchSummary,
    pub archive: ArchiveReport,
}

impl App {
    /// 初始化应用
    pub fn initialize(mut config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        config
            .resolve_selectors()
            .context("加载选择器配置失败")?;
        log_startup(&config);
        Ok(Self { config })
    }

    /// 使用本地浏览器运行
    pub async fn run(&self) -> Result<RunReport> {
        let options = self.config.session_options();
        self.run_with(|| async move { ChromeSession::launch(&options).await })
            .await
    }

    /// 运行主逻辑，`launch` 只在确实有文件需要转换时才会被调用
    pub async fn run_with<S, L, Fut>(&self, launch: L) -> Result<RunReport>
    where
        S: AutomationSession,
        L: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<S>>,
    {
        let config = &self.config;
        let files = discover_pdf_files(&config.input_dir)
            .await
            .context("扫描输入目录失败")?;
        log_files_found(files.len());

        tokio::fs::create_dir_all(&config.download_dir)
            .await
            .with_context(|| format!("无法创建下载目录: {}", config.download_dir.display()))?;

        let run = if files.is_empty() {
            warn!("⚠️ 没有找到待转换的 PDF 文件");
            BatchRun::new(config.input_dir.clone(), config.download_dir.clone())
        } else {
            let session = launch().await.context("启动浏览器会话失败")?;
            run_scoped(session, |page| async move { run_batch(&page, &files, config).await })
                .await
                .context("关闭浏览器会话失败")?
        };

        let archive = archive_directory(&config.download_dir, &config.archive_path())
            .await
            .context("打包下载目录失败")?;

        let summary = run.summary();
        print_final_stats(&summary, &archive, &config.output_log_file);
        append_summary_to_log_file(&config.output_log_file, &summary, &archive)?;

        Ok(RunReport { summary, archive })
    }
}
