//! 编排层（Orchestration Layer）
//!
//! ```text
//! batch_processor (App: 扫描 → 会话 → 批量转换 → 打包 → 统计)
//!     ↓
//! batch_runner (依次处理 Vec<PDF>)
//!     ↓
//! workflow::ConversionFlow (处理单个 PDF)
//!     ↓
//! services (限时轮询 / 下载检测 / 打包)
//!     ↓
//! infrastructure (ServicePage / JsExecutor)
//! ```

pub mod batch_processor;
pub mod batch_runner;

pub use batch_processor::{App, RunReport};
pub use batch_runner::run_batch;
