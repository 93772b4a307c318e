use std::path::PathBuf;

use crate::models::job::{ConversionJob, JobStatus};

/// 一次批量运行：输入目录、下载目录以及按发现顺序排列的全部任务
#[derive(Debug)]
pub struct BatchRun {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    jobs: Vec<ConversionJob>,
}

impl BatchRun {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
            jobs: Vec::new(),
        }
    }

    /// 记录一个已终止的任务
    pub fn record(&mut self, job: ConversionJob) {
        debug_assert!(job.status().is_terminal());
        self.jobs.push(job);
    }

    pub fn jobs(&self) -> &[ConversionJob] {
        &self.jobs
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for job in &self.jobs {
            match job.status() {
                JobStatus::Completed => {
                    summary.completed += 1;
                    if let Some(result) = job.result() {
                        summary.results.push(result.to_path_buf());
                    }
                }
                JobStatus::TimedOut => {
                    summary.timed_out += 1;
                    summary.unresolved.push(UnresolvedJob::from_job(job));
                }
                _ => {
                    summary.failed += 1;
                    summary.unresolved.push(UnresolvedJob::from_job(job));
                }
            }
        }
        summary
    }
}

/// 批次汇总
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub completed: usize,
    pub timed_out: usize,
    pub failed: usize,
    /// 成功任务的结果文件
    pub results: Vec<PathBuf>,
    /// 失败或超时的输入，便于单独重跑
    pub unresolved: Vec<UnresolvedJob>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.completed + self.timed_out + self.failed
    }
}

/// 未成功的任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedJob {
    pub source_name: String,
    pub status: JobStatus,
    pub reason: String,
}

impl UnresolvedJob {
    fn from_job(job: &ConversionJob) -> Self {
        Self {
            source_name: job.source_name(),
            status: job.status(),
            reason: job.failure_reason().unwrap_or_default().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_each_terminal_status() {
        let mut run = BatchRun::new(PathBuf::from("pdfs"), PathBuf::from("downloads"));

        let mut ok = ConversionJob::new(PathBuf::from("pdfs/a.pdf"));
        ok.complete(PathBuf::from("downloads/a.xlsx"));
        let mut late = ConversionJob::new(PathBuf::from("pdfs/b.pdf"));
        late.time_out("无下载");
        let mut broken = ConversionJob::new(PathBuf::from("pdfs/c.pdf"));
        broken.fail("导航失败");

        run.record(ok);
        run.record(late);
        run.record(broken);

        let summary = run.summary();
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.timed_out, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.results, vec![PathBuf::from("downloads/a.xlsx")]);
        let names: Vec<_> = summary.unresolved.iter().map(|u| u.source_name.as_str()).collect();
        assert_eq!(names, vec!["b.pdf", "c.pdf"]);
    }

    #[test]
    fn test_empty_run_summary_is_zero() {
        let run = BatchRun::new(PathBuf::from("pdfs"), PathBuf::from("downloads"));
        assert_eq!(run.summary(), BatchSummary::default());
    }
}
