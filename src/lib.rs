//! # PDF To Excel Batch
//!
//! 通过浏览器自动化驱动在线转换服务，把一个目录中的 PDF 批量转换为 Excel，
//! 最后把结果打包成一个 zip。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露页面能力
//! - `ServicePage` - 导航 / 探测控件 / 上传 / 点击
//! - `browser/` - 启动浏览器，作用域内保证关闭
//!
//! ### ② 业务能力层（Services）
//! - `bounded_wait` - 限时轮询
//! - `download_watcher` - 通过目录快照差集判断下载完成
//! - `archiver` - 打包下载目录
//!
//! ### ③ 流程层（Workflow）
//! - `ConversionFlow` - 一个 PDF 的完整转换流程（状态机）
//!
//! ### ④ 编排层（Orchestration）
//! - `batch_runner` - 依次处理全部 PDF，隔离单个任务的失败
//! - `batch_processor` - 应用入口，管理会话、打包和统计

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{with_session, AutomationSession};
pub use config::{Config, Selector, SelectorMap};
pub use error::{AppError, AppResult};
pub use infrastructure::{ElementCondition, ServicePage};
pub use models::{BatchRun, BatchSummary, ConversionJob, JobStatus};
pub use orchestrator::{run_batch, App, RunReport};
pub use services::{DownloadWatcher, WaitOutcome};
pub use workflow::{ConversionCtx, ConversionFlow};
