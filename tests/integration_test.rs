use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pdf_to_excel_batch::config::WaitTimeouts;
use pdf_to_excel_batch::{
    with_session, App, AppError, AppResult, AutomationSession, Config, ElementCondition,
    JobStatus, Selector, SelectorMap, ServicePage,
};
use tempfile::TempDir;

/// 模拟外部转换服务：按当前上传的文件决定各控件的行为
#[derive(Clone, Default)]
struct FakeService {
    download_dir: PathBuf,
    /// “单个工作表”选项永远不可点击的文件
    option_never_ready: HashSet<String>,
    /// 点击下载后不产生文件的文件
    never_downloads: HashSet<String>,
    /// 点击下载后只留下未完成临时文件的文件
    stalls_mid_download: HashSet<String>,
    /// 导航时报错的文件（按处理顺序从1开始）
    navigation_fails_on: HashSet<usize>,
    state: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    navigations: usize,
    current: Option<String>,
    attempted: Vec<String>,
}

impl FakeService {
    fn new(download_dir: &Path) -> Self {
        Self {
            download_dir: download_dir.to_path_buf(),
            ..Self::default()
        }
    }

    fn attempted(&self) -> Vec<String> {
        self.state.lock().unwrap().attempted.clone()
    }

    fn current(&self) -> String {
        self.state.lock().unwrap().current.clone().unwrap_or_default()
    }
}

impl ServicePage for FakeService {
    async fn navigate(&self, _url: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.navigations += 1;
        state.current = None;
        if self.navigation_fails_on.contains(&state.navigations) {
            return Err(AppError::interaction("navigate", "net::ERR_TIMED_OUT"));
        }
        Ok(())
    }

    async fn probe(&self, selector: &Selector, _condition: ElementCondition) -> AppResult<bool> {
        let blocked = *selector == SelectorMap::default().single_sheet_option
            && self.option_never_ready.contains(&self.current());
        Ok(!blocked)
    }

    async fn upload_file(&self, _selector: &Selector, file: &Path) -> AppResult<()> {
        let name = file.file_name().unwrap().to_string_lossy().into_owned();
        let mut state = self.state.lock().unwrap();
        state.attempted.push(name.clone());
        state.current = Some(name);
        Ok(())
    }

    async fn click(&self, selector: &Selector) -> AppResult<()> {
        if *selector != SelectorMap::default().download_button {
            return Ok(());
        }
        let current = self.current();
        if self.never_downloads.contains(&current) {
            return Ok(());
        }
        let stem = current.trim_end_matches(".pdf");
        // 先写临时文件再改名，模拟浏览器下载
        let partial = self.download_dir.join(format!("{}.xlsx.crdownload", stem));
        std::fs::write(&partial, b"sheet")?;
        if self.stalls_mid_download.contains(&current) {
            return Ok(());
        }
        std::fs::rename(&partial, self.download_dir.join(format!("{}.xlsx", stem)))?;
        Ok(())
    }
}

struct FakeSession {
    page: FakeService,
    releases: Arc<AtomicUsize>,
}

impl AutomationSession for FakeSession {
    type Page = FakeService;

    fn page(&self) -> FakeService {
        self.page.clone()
    }

    async fn release(self) -> AppResult<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Fixture {
    root: TempDir,
    config: Config,
}

impl Fixture {
    fn new(pdfs: &[&str]) -> Self {
        let root = TempDir::new().unwrap();
        let input_dir = root.path().join("pdfs");
        let download_dir = root.path().join("downloads");
        std::fs::create_dir(&input_dir).unwrap();
        std::fs::create_dir(&download_dir).unwrap();
        for name in pdfs {
            std::fs::write(input_dir.join(name), b"%PDF-1.4").unwrap();
        }

        let config = Config {
            input_dir,
            download_dir,
            output_log_file: root.path().join("output.txt").to_string_lossy().into_owned(),
            timeouts: WaitTimeouts {
                file_input: Duration::from_millis(40),
                element: Duration::from_millis(40),
                download: Duration::from_millis(80),
                poll_interval: Duration::from_millis(5),
                settle_delay: Duration::ZERO,
            },
            ..Config::default()
        };
        Self { root, config }
    }

    fn service(&self) -> FakeService {
        FakeService::new(&self.config.download_dir)
    }

    fn archive_entries(&self) -> usize {
        let file = std::fs::File::open(self.root.path().join("output.zip")).unwrap();
        zip::ZipArchive::new(file).unwrap().len()
    }
}

async fn run(
    fixture: &Fixture,
    service: FakeService,
) -> (pdf_to_excel_batch::RunReport, Arc<AtomicUsize>) {
    let releases = Arc::new(AtomicUsize::new(0));
    let session = FakeSession {
        page: service,
        releases: releases.clone(),
    };
    let app = App::initialize(fixture.config.clone()).unwrap();
    let report = app.run_with(|| async { Ok(session) }).await.unwrap();
    (report, releases)
}

#[tokio::test]
async fn test_scenario_a_one_option_never_ready() {
    let fixture = Fixture::new(&["1.pdf", "2.pdf", "3.pdf"]);
    let mut service = fixture.service();
    service.option_never_ready.insert("2.pdf".to_string());

    let (report, releases) = run(&fixture, service.clone()).await;

    assert_eq!(report.summary.completed, 2);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.timed_out, 0);
    assert_eq!(report.summary.unresolved[0].source_name, "2.pdf");
    assert_eq!(report.summary.unresolved[0].status, JobStatus::Failed);
    assert_eq!(service.attempted(), vec!["1.pdf", "2.pdf", "3.pdf"]);
    assert_eq!(report.archive.entries, 2);
    assert_eq!(fixture.archive_entries(), 2);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_scenario_b_download_never_appears() {
    let fixture = Fixture::new(&["only.pdf"]);
    let mut service = fixture.service();
    service.never_downloads.insert("only.pdf".to_string());

    let (report, releases) = run(&fixture, service).await;

    assert_eq!(report.summary.timed_out, 1);
    assert_eq!(report.summary.completed, 0);
    assert_eq!(report.summary.failed, 0);
    assert!(report.summary.results.is_empty());
    assert_eq!(fixture.archive_entries(), 0);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_scenario_c_empty_input_never_starts_a_session() {
    let fixture = Fixture::new(&[]);
    let launched = AtomicBool::new(false);
    let app = App::initialize(fixture.config.clone()).unwrap();

    let report = app
        .run_with(|| async {
            launched.store(true, Ordering::SeqCst);
            Ok(FakeSession {
                page: fixture.service(),
                releases: Arc::new(AtomicUsize::new(0)),
            })
        })
        .await
        .unwrap();

    assert_eq!(report.summary.total(), 0);
    assert_eq!(report.summary.completed, 0);
    assert_eq!(report.summary.timed_out, 0);
    assert_eq!(report.summary.failed, 0);
    assert!(!launched.load(Ordering::SeqCst));
    assert_eq!(fixture.archive_entries(), 0);
}

#[tokio::test]
async fn test_stalled_download_is_timed_out_and_not_archived() {
    let fixture = Fixture::new(&["a.pdf", "b.pdf"]);
    let mut service = fixture.service();
    service.stalls_mid_download.insert("a.pdf".to_string());

    let (report, _) = run(&fixture, service).await;

    assert_eq!(report.summary.timed_out, 1);
    assert_eq!(report.summary.completed, 1);
    assert_eq!(report.summary.unresolved[0].source_name, "a.pdf");
    assert!(fixture
        .config
        .download_dir
        .join("a.xlsx.crdownload")
        .exists());
    // 只有 b 的结果被打包，临时文件不算
    assert_eq!(report.archive.entries, 1);
    assert_eq!(fixture.archive_entries(), 1);
}

#[tokio::test]
async fn test_interaction_fault_does_not_abort_batch() {
    let fixture = Fixture::new(&["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);
    let mut service = fixture.service();
    service.navigation_fails_on.insert(1);
    service.never_downloads.insert("c.pdf".to_string());

    let (report, releases) = run(&fixture, service.clone()).await;

    // 每个输入都有且只有一个终止结果
    assert_eq!(report.summary.total(), 4);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.timed_out, 1);
    assert_eq!(report.summary.completed, 2);
    // 第一个文件导航失败，未上传
    assert_eq!(service.attempted(), vec!["b.pdf", "c.pdf", "d.pdf"]);
    let names: Vec<_> = report
        .summary
        .unresolved
        .iter()
        .map(|u| u.source_name.as_str())
        .collect();
    assert_eq!(names, vec!["a.pdf", "c.pdf"]);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_results_are_attributed_to_their_own_job() {
    let fixture = Fixture::new(&["x.pdf", "y.pdf"]);
    std::fs::write(fixture.config.download_dir.join("stale.xlsx"), b"old").unwrap();

    let (report, _) = run(&fixture, fixture.service()).await;

    let results: Vec<_> = report
        .summary
        .results
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(results, vec!["x.xlsx", "y.xlsx"]);
    // 旧文件也在下载目录中，会一起打包
    assert_eq!(fixture.archive_entries(), 3);
}

#[tokio::test]
async fn test_missing_input_directory_is_fatal() {
    let mut fixture = Fixture::new(&[]);
    fixture.config.input_dir = fixture.root.path().join("missing");
    let app = App::initialize(fixture.config.clone()).unwrap();

    let launched = AtomicBool::new(false);
    let result = app
        .run_with(|| async {
            launched.store(true, Ordering::SeqCst);
            Ok(FakeSession {
                page: fixture.service(),
                releases: Arc::new(AtomicUsize::new(0)),
            })
        })
        .await;

    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::DirectoryNotFound { .. })
    ));
    assert!(!launched.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_session_launch_failure_is_fatal() {
    let fixture = Fixture::new(&["a.pdf"]);
    let app = App::initialize(fixture.config.clone()).unwrap();

    let result = app
        .run_with(|| async { Err::<FakeSession, _>(AppError::session("chrome not found")) })
        .await;

    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::SessionFailed { .. })
    ));
}

/// 真实浏览器冒烟测试：打开转换页面并确认上传控件存在
#[tokio::test]
#[ignore] // 默认忽略，需要本机浏览器和网络：cargo test -- --ignored
async fn test_real_service_exposes_file_input() {
    pdf_to_excel_batch::utils::logging::init(true);

    let root = TempDir::new().unwrap();
    let config = Config {
        download_dir: root.path().join("downloads"),
        ..Config::from_env()
    };

    let present = with_session(&config.session_options(), |page| async move {
        page.navigate(&config.target_url).await?;
        tokio::time::sleep(Duration::from_secs(2)).await;
        page.probe(&config.selectors.file_input, ElementCondition::Present)
            .await
    })
    .await
    .expect("启动浏览器失败");

    assert!(present.expect("页面交互失败"), "应该能找到文件上传控件");
}
