//! 单个文件的转换流程 - 流程层
//!
//! 流程顺序：
//! 1. 打开转换页面
//! 2. 等待文件上传控件出现 → 上传 PDF
//! 3. 等待“单个工作表”选项可点击 → 点击
//! 4. 等待转换按钮可点击 → 点击
//! 5. 拍下载目录快照，等待下载按钮可点击 → 点击
//! 6. 等待下载目录出现新的结果文件
//!
//! 任何一步出错都只会让当前任务失败，不会向外传播。

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::{Config, Selector, SelectorMap, WaitTimeouts};
use crate::error::{AppError, AppResult};
use crate::infrastructure::{ElementCondition, ServicePage};
use crate::models::{ConversionJob, JobStatus};
use crate::services::{poll_until, DownloadWatcher, WaitOutcome};
use crate::workflow::conversion_ctx::ConversionCtx;

/// 转换流程
///
/// - 不持有页面，由调用方传入
/// - 只推进任务状态，不决定批次是否继续
pub struct ConversionFlow {
    target_url: String,
    selectors: SelectorMap,
    timeouts: WaitTimeouts,
    watcher: DownloadWatcher,
}

impl ConversionFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            target_url: config.target_url.clone(),
            selectors: config.selectors.clone(),
            timeouts: config.timeouts.clone(),
            watcher: DownloadWatcher::new(&config.download_dir, config.timeouts.poll_interval),
        }
    }

    /// 把任务推进到终止状态
    pub async fn run<P: ServicePage>(&self, page: &P, job: &mut ConversionJob, ctx: &ConversionCtx) {
        match self.drive(page, job, ctx).await {
            Ok(WaitOutcome::Found(result)) => {
                info!(
                    "{} ✅ 转换完成: {}",
                    ctx,
                    result.file_name().unwrap_or_default().to_string_lossy()
                );
                job.complete(result);
            }
            Ok(WaitOutcome::TimedOut) => {
                let err = AppError::DownloadTimeout {
                    timeout: self.timeouts.download,
                };
                warn!("{} ⏰ {}", ctx, err);
                job.time_out(err.to_string());
            }
            Err(e) => {
                error!("{} ❌ 在 {} 之后失败: {}", ctx, job.status(), e);
                job.fail(e.to_string());
            }
        }
    }

    async fn drive<P: ServicePage>(
        &self,
        page: &P,
        job: &mut ConversionJob,
        ctx: &ConversionCtx,
    ) -> AppResult<WaitOutcome<PathBuf>> {
        let s = &self.selectors;
        let t = &self.timeouts;

        // STARTED → NAVIGATED
        page.navigate(&self.target_url).await?;
        job.advance(JobStatus::Navigated);
        self.settle().await;

        // NAVIGATED → FILE_SUBMITTED
        self.wait_for(page, "file_input", &s.file_input, ElementCondition::Present, t.file_input)
            .await?;
        page.upload_file(&s.file_input, job.source()).await?;
        job.advance(JobStatus::FileSubmitted);
        info!("{} 📤 已上传", ctx);
        self.settle().await;

        // FILE_SUBMITTED → OPTION_SELECTED
        self.click_when_ready(page, "single_sheet_option", &s.single_sheet_option)
            .await?;
        job.advance(JobStatus::OptionSelected);

        // OPTION_SELECTED → CONVERSION_TRIGGERED
        self.click_when_ready(page, "convert_button", &s.convert_button)
            .await?;
        job.advance(JobStatus::ConversionTriggered);
        debug!("{} 已触发转换", ctx);

        // 快照必须在点击下载之前拍，否则很快完成的下载会被当成旧文件
        let snapshot = self.watcher.snapshot().await?;

        // CONVERSION_TRIGGERED → DOWNLOAD_TRIGGERED
        self.click_when_ready(page, "download_button", &s.download_button)
            .await?;
        job.advance(JobStatus::DownloadTriggered);
        info!("{} ⬇️ 已触发下载，等待文件落地...", ctx);

        // DOWNLOAD_TRIGGERED → COMPLETED | TIMED_OUT
        self.watcher.wait_for_download(&snapshot, t.download).await
    }

    async fn click_when_ready<P: ServicePage>(
        &self,
        page: &P,
        name: &str,
        selector: &Selector,
    ) -> AppResult<()> {
        self.wait_for(page, name, selector, ElementCondition::Clickable, self.timeouts.element)
            .await?;
        page.click(selector).await
    }

    /// 等待控件满足条件，超时返回 `ElementTimeout`
    ///
    /// 单次检查出错（例如页面正在跳转）只算“尚未就绪”，继续轮询
    async fn wait_for<P: ServicePage>(
        &self,
        page: &P,
        name: &str,
        selector: &Selector,
        condition: ElementCondition,
        timeout: Duration,
    ) -> AppResult<()> {
        let last_error: Mutex<Option<String>> = Mutex::new(None);
        let last_error_ref = &last_error;

        let outcome = poll_until(timeout, self.timeouts.poll_interval, move || async move {
            match page.probe(selector, condition).await {
                Ok(ready) => Ok::<_, AppError>(ready.then_some(())),
                Err(e) => {
                    debug!("检查控件 `{}` 失败，稍后重试: {}", name, e);
                    if let Ok(mut slot) = last_error_ref.lock() {
                        *slot = Some(e.to_string());
                    }
                    Ok(None)
                }
            }
        })
        .await?;

        match outcome {
            WaitOutcome::Found(()) => Ok(()),
            WaitOutcome::TimedOut => Err(AppError::ElementTimeout {
                element: name.to_string(),
                timeout,
                last_error: last_error.into_inner().unwrap_or_default(),
            }),
        }
    }

    async fn settle(&self) {
        if !self.timeouts.settle_delay.is_zero() {
            sleep(self.timeouts.settle_delay).await;
        }
    }
}
