//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{BatchSummary, ConversionJob, JobStatus};
use crate::services::ArchiveReport;
use crate::workflow::ConversionCtx;

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；否则详细模式用 debug，默认 info
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\nPDF 转 Excel 日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - PDF 批量转 Excel");
    info!("📂 输入目录: {}", config.input_dir.display());
    info!("📥 下载目录: {}", config.download_dir.display());
    info!("🌐 转换页面: {}", config.target_url);
    info!("{}", "=".repeat(60));
}

/// 记录文件扫描结果
pub fn log_files_found(total: usize) {
    info!("✓ 找到 {} 个待转换的 PDF", total);
}

/// 记录单个任务开始
pub fn log_job_start(ctx: &ConversionCtx) {
    info!("\n{}", "─".repeat(60));
    info!("{} 开始转换", ctx);
}

/// 记录单个任务结果
pub fn log_job_outcome(ctx: &ConversionCtx, job: &ConversionJob) {
    match job.status() {
        JobStatus::Completed => info!(
            "{} 结果: {} -> {}",
            ctx,
            job.status(),
            job.result().map(|p| p.display().to_string()).unwrap_or_default()
        ),
        JobStatus::TimedOut => warn!("{} 结果: {}", ctx, job.status()),
        status => error!(
            "{} 结果: {} ({})",
            ctx,
            status,
            job.failure_reason().unwrap_or_default()
        ),
    }
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &BatchSummary, archive: &ArchiveReport, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", summary.completed, summary.total());
    info!("⏰ 超时: {}", summary.timed_out);
    info!("❌ 失败: {}", summary.failed);
    for unresolved in &summary.unresolved {
        warn!(
            "  需要重试: {} [{}] {}",
            unresolved.source_name, unresolved.status, unresolved.reason
        );
    }
    info!(
        "📦 打包文件: {} ({} 个文件)",
        archive.path.display(),
        archive.entries
    );
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 把汇总追加到日志文件，便于只重跑失败的文件
pub fn append_summary_to_log_file(
    log_file_path: &str,
    summary: &BatchSummary,
    archive: &ArchiveReport,
) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    writeln!(
        file,
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(
        file,
        "成功: {} | 超时: {} | 失败: {} | 共: {}",
        summary.completed,
        summary.timed_out,
        summary.failed,
        summary.total()
    )?;
    for result in &summary.results {
        writeln!(file, "OK\t{}", result.display())?;
    }
    for unresolved in &summary.unresolved {
        writeln!(
            file,
            "{}\t{}\t{}",
            unresolved.status, unresolved.source_name, unresolved.reason
        )?;
    }
    writeln!(file, "打包: {} ({} 个文件)", archive.path.display(), archive.entries)?;
    Ok(())
}
