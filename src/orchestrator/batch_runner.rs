//! 批量转换 - 编排层
//!
//! 按发现顺序逐个处理 PDF；单个任务失败或超时都不会中断批次。

use tracing::info;

use crate::config::Config;
use crate::infrastructure::ServicePage;
use crate::models::{BatchRun, ConversionJob, PdfFiles};
use crate::utils::logging::{log_job_outcome, log_job_start};
use crate::workflow::{ConversionCtx, ConversionFlow};

/// 在同一个页面上依次转换全部文件
pub async fn run_batch<P: ServicePage>(page: &P, files: &PdfFiles, config: &Config) -> BatchRun {
    let flow = ConversionFlow::new(config);
    let mut run = BatchRun::new(config.input_dir.clone(), config.download_dir.clone());
    let total = files.len();

    for (index, source) in files.iter().enumerate() {
        let mut job = ConversionJob::new(source.clone());
        let ctx = ConversionCtx::new(index + 1, total, job.source_name());
        log_job_start(&ctx);

        flow.run(page, &mut job, &ctx).await;

        log_job_outcome(&ctx, &job);
        run.record(job);
    }

    info!("全部 {} 个文件处理完毕", total);
    run
}
