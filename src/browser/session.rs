//! 浏览器会话的作用域管理
//!
//! 整个批次只使用一个会话；无论流程正常结束、返回错误还是 panic，
//! 会话都恰好释放一次。

use std::future::Future;
use std::panic::AssertUnwindSafe;

use chromiumoxide::Browser;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::browser::headless::launch_browser;
use crate::config::SessionOptions;
use crate::error::AppResult;
use crate::infrastructure::{ChromeServicePage, JsExecutor, ServicePage};

/// 可以在结束时释放的自动化会话
#[allow(async_fn_in_trait)]
pub trait AutomationSession {
    type Page: ServicePage;

    /// 会话中用于操作外部服务的页面
    fn page(&self) -> Self::Page;

    /// 关闭会话
    async fn release(self) -> AppResult<()>;
}

/// 本地启动的浏览器会话
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: ChromeServicePage,
}

impl ChromeSession {
    pub async fn launch(options: &SessionOptions) -> AppResult<Self> {
        let (browser, handler, page) = launch_browser(options).await?;
        Ok(Self {
            browser,
            handler,
            page: ChromeServicePage::new(JsExecutor::new(page)),
        })
    }
}

impl AutomationSession for ChromeSession {
    type Page = ChromeServicePage;

    fn page(&self) -> ChromeServicePage {
        self.page.clone()
    }

    async fn release(mut self) -> AppResult<()> {
        info!("🔒 关闭浏览器...");
        if let Err(e) = self.browser.close().await {
            warn!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}

/// 在 `session` 上运行 `body`，结束后释放会话
///
/// `body` panic 时先释放会话再继续 panic
pub async fn run_scoped<S, F, Fut, T>(session: S, body: F) -> AppResult<T>
where
    S: AutomationSession,
    F: FnOnce(S::Page) -> Fut,
    Fut: Future<Output = T>,
{
    let outcome = AssertUnwindSafe(body(session.page())).catch_unwind().await;
    let released = session.release().await;

    match outcome {
        Ok(value) => {
            released?;
            Ok(value)
        }
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// 启动浏览器会话并在其中运行 `body`
pub async fn with_session<F, Fut, T>(options: &SessionOptions, body: F) -> AppResult<T>
where
    F: FnOnce(ChromeServicePage) -> Fut,
    Fut: Future<Output = T>,
{
    let session = ChromeSession::launch(options).await?;
    run_scoped(session, body).await
}
