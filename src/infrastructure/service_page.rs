//! 外部转换服务的页面操作 - 基础设施层
//!
//! `ServicePage` 只描述流程需要的四种页面能力，
//! `ChromeServicePage` 用 chromiumoxide 实现它们。

use std::path::Path;

use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::Element;
use tracing::debug;

use crate::config::Selector;
use crate::error::{AppError, AppResult};
use crate::infrastructure::JsExecutor;

/// 等待控件达到的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementCondition {
    /// 存在于 DOM 中（可以是隐藏的）
    Present,
    /// 可见且未禁用，可以点击
    Clickable,
}

/// 转换流程需要的页面能力
#[allow(async_fn_in_trait)]
pub trait ServicePage {
    /// 打开页面并等待加载完成
    async fn navigate(&self, url: &str) -> AppResult<()>;

    /// 检查一次控件是否满足条件（不等待）
    async fn probe(&self, selector: &Selector, condition: ElementCondition) -> AppResult<bool>;

    /// 把本地文件交给文件上传控件
    async fn upload_file(&self, selector: &Selector, file: &Path) -> AppResult<()>;

    /// 点击控件
    async fn click(&self, selector: &Selector) -> AppResult<()>;
}

/// 基于浏览器标签页的实现
#[derive(Clone)]
pub struct ChromeServicePage {
    executor: JsExecutor,
}

impl ChromeServicePage {
    pub fn new(executor: JsExecutor) -> Self {
        Self { executor }
    }

    async fn find(&self, selector: &Selector) -> AppResult<Element> {
        let page = self.executor.page();
        let found = match selector {
            Selector::Xpath(xpath) => page.find_xpath(xpath.as_str()).await,
            other => {
                // Css 和 Id 都能转成 CSS 选择器
                let css = other.as_css().unwrap_or_default();
                page.find_element(css).await
            }
        };
        found.map_err(|e| AppError::interaction(format!("find {}", selector), e))
    }
}

impl ServicePage for ChromeServicePage {
    async fn navigate(&self, url: &str) -> AppResult<()> {
        debug!("导航到: {}", url);
        self.executor
            .page()
            .goto(url)
            .await
            .map_err(|e| AppError::interaction(format!("navigate {}", url), e))?;
        Ok(())
    }

    async fn probe(&self, selector: &Selector, condition: ElementCondition) -> AppResult<bool> {
        let check = match condition {
            ElementCondition::Present => "return true;",
            ElementCondition::Clickable => {
                r#"const style = window.getComputedStyle(el);
                const rect = el.getBoundingClientRect();
                return !el.disabled
                    && style.display !== 'none'
                    && style.visibility !== 'hidden'
                    && rect.width > 0
                    && rect.height > 0;"#
            }
        };
        let js_code = format!(
            r#"
            (() => {{
                const el = {};
                if (!el) return false;
                {}
            }})()
            "#,
            selector.js_lookup(),
            check
        );

        let result = self.executor.eval(js_code).await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    async fn upload_file(&self, selector: &Selector, file: &Path) -> AppResult<()> {
        // 浏览器只接受绝对路径
        let absolute = tokio::fs::canonicalize(file).await?;
        let element = self.find(selector).await?;

        let params = SetFileInputFilesParams::builder()
            .files(vec![absolute.to_string_lossy().into_owned()])
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(|e| AppError::interaction("upload", e))?;

        self.executor
            .page()
            .execute(params)
            .await
            .map_err(|e| AppError::interaction("upload", e))?;
        Ok(())
    }

    async fn click(&self, selector: &Selector) -> AppResult<()> {
        let element = self.find(selector).await?;
        element
            .click()
            .await
            .map_err(|e| AppError::interaction(format!("click {}", selector), e))?;
        Ok(())
    }
}
