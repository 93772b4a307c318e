use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::SessionOptions;
use crate::error::{AppError, AppResult};

/// 启动浏览器，并把下载重定向到 `options.download_dir`
///
/// 返回浏览器、事件处理任务和一个空白页面
pub async fn launch_browser(options: &SessionOptions) -> AppResult<(Browser, JoinHandle<()>, Page)> {
    info!("🚀 启动浏览器 (headless: {})...", options.headless);

    tokio::fs::create_dir_all(&options.download_dir).await?;
    let download_dir = tokio::fs::canonicalize(&options.download_dir).await?;
    debug!("下载目录: {}", download_dir.display());

    let (width, height) = options.window_size;
    let mut builder = BrowserConfig::builder()
        .window_size(width, height)
        .args(vec![
            "--no-sandbox",            // 容器内运行需要
            "--disable-dev-shm-usage", // 防止共享内存不足
            "--disable-gpu",
        ]);
    builder = if options.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(executable) = &options.chrome_executable {
        builder = builder.chrome_executable(executable);
    }
    let config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        AppError::session(format!("配置浏览器失败: {}", e))
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        AppError::session(format!("启动浏览器失败: {}", e))
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| AppError::session(format!("创建页面失败: {}", e)))?;

    if options.suppress_download_prompts {
        allow_downloads(&browser, &download_dir.to_string_lossy()).await?;
    }

    info!("✅ 浏览器已就绪");
    Ok((browser, handler_task, page))
}

/// 允许无提示下载到指定目录
///
/// 浏览器拒绝该命令时整个会话视为失败，否则下载会弹出保存对话框
async fn allow_downloads(browser: &Browser, download_dir: &str) -> AppResult<()> {
    let params = SetDownloadBehaviorParams::builder()
        .behavior(SetDownloadBehaviorBehavior::Allow)
        .download_path(download_dir)
        .build()
        .map_err(AppError::session)?;

    browser.execute(params).await.map_err(|e| {
        error!("Browser.setDownloadBehavior 失败: {}", e);
        AppError::session(format!("无法设置下载目录: {}", e))
    })?;
    Ok(())
}
