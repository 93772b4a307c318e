use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// 可接受的源文件扩展名（不区分大小写）
pub const SOURCE_EXTENSION: &str = ".pdf";
/// 可接受的转换结果扩展名（不区分大小写）
pub const OUTPUT_EXTENSIONS: [&str; 3] = [".xlsx", ".xls", ".csv"];
/// 浏览器下载未完成时的临时扩展名
pub const IN_PROGRESS_MARKER: &str = ".crdownload";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 待转换 PDF 所在目录
    pub input_dir: PathBuf,
    /// 浏览器下载目录
    pub download_dir: PathBuf,
    /// 打包文件名（不含扩展名）
    pub archive_name: String,
    /// 转换页面 URL
    pub target_url: String,
    /// 是否无头运行
    pub headless: bool,
    /// 窗口尺寸
    pub window_size: (u32, u32),
    /// 浏览器可执行文件，不设置时由 chromiumoxide 自动查找
    pub chrome_executable: Option<PathBuf>,
    /// 各步骤的等待时限
    pub timeouts: WaitTimeouts,
    /// 页面选择器覆盖文件（TOML）
    pub selectors_file: Option<PathBuf>,
    /// 页面选择器
    pub selectors: SelectorMap,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

/// 各步骤的等待时限
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaitTimeouts {
    /// 等待文件上传控件出现
    pub file_input: Duration,
    /// 等待其它按钮可点击
    pub element: Duration,
    /// 等待下载完成
    pub download: Duration,
    /// 轮询间隔
    pub poll_interval: Duration,
    /// 导航和上传之后的固定停顿
    pub settle_delay: Duration,
}

impl Default for WaitTimeouts {
    fn default() -> Self {
        Self {
            file_input: Duration::from_secs(10),
            element: Duration::from_secs(20),
            download: Duration::from_secs(300),
            poll_interval: Duration::from_millis(1000),
            settle_delay: Duration::from_millis(2000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("pdfs"),
            download_dir: PathBuf::from("downloads"),
            archive_name: "output".to_string(),
            target_url: "https://www.ilovepdf.com/pdf_to_excel".to_string(),
            headless: true,
            window_size: (1920, 1080),
            chrome_executable: None,
            timeouts: WaitTimeouts::default(),
            selectors_file: None,
            selectors: SelectorMap::default(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        let timeouts = WaitTimeouts {
            file_input: env_secs("FILE_INPUT_TIMEOUT_SECS").unwrap_or(default.timeouts.file_input),
            element: env_secs("ELEMENT_TIMEOUT_SECS").unwrap_or(default.timeouts.element),
            download: env_secs("DOWNLOAD_TIMEOUT_SECS").unwrap_or(default.timeouts.download),
            poll_interval: env_millis("POLL_INTERVAL_MS").unwrap_or(default.timeouts.poll_interval),
            settle_delay: env_millis("SETTLE_DELAY_MS").unwrap_or(default.timeouts.settle_delay),
        };
        let window_size = (
            env_parse("WINDOW_WIDTH").unwrap_or(default.window_size.0),
            env_parse("WINDOW_HEIGHT").unwrap_or(default.window_size.1),
        );

        Self {
            input_dir: std::env::var("INPUT_DIR").map(PathBuf::from).unwrap_or(default.input_dir),
            download_dir: std::env::var("DOWNLOAD_DIR").map(PathBuf::from).unwrap_or(default.download_dir),
            archive_name: std::env::var("ARCHIVE_NAME").unwrap_or(default.archive_name),
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            headless: env_parse("HEADLESS").unwrap_or(default.headless),
            window_size,
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().map(PathBuf::from),
            timeouts,
            selectors_file: std::env::var("SELECTORS_FILE").ok().map(PathBuf::from),
            selectors: default.selectors,
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    /// 如果配置了选择器覆盖文件，则加载它替换默认选择器
    pub fn resolve_selectors(&mut self) -> AppResult<()> {
        if let Some(path) = &self.selectors_file {
            self.selectors = SelectorMap::load(path)?;
        }
        Ok(())
    }

    /// 浏览器会话的启动参数
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            headless: self.headless,
            download_dir: self.download_dir.clone(),
            suppress_download_prompts: true,
            window_size: self.window_size,
            chrome_executable: self.chrome_executable.clone(),
        }
    }

    /// 打包文件路径：下载目录旁边的 `<archive_name>.zip`
    pub fn archive_path(&self) -> PathBuf {
        let parent = self
            .download_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        parent.join(format!("{}.zip", self.archive_name))
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_secs(name: &str) -> Option<Duration> {
    env_parse::<u64>(name).map(Duration::from_secs)
}

fn env_millis(name: &str) -> Option<Duration> {
    env_parse::<u64>(name).map(Duration::from_millis)
}

/// 浏览器会话启动参数
#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub headless: bool,
    pub download_dir: PathBuf,
    pub suppress_download_prompts: bool,
    pub window_size: (u32, u32),
    pub chrome_executable: Option<PathBuf>,
}

/// 页面元素定位方式
///
/// TOML 写法：`{ by = "css", value = "input[type='file']" }`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "lowercase")]
pub enum Selector {
    Css(String),
    Xpath(String),
    Id(String),
}

impl Selector {
    /// 生成在页面中查找该元素的 JS 表达式，找不到时结果为 null
    pub fn js_lookup(&self) -> String {
        match self {
            Selector::Css(css) => format!("document.querySelector({})", js_string(css)),
            Selector::Id(id) => format!("document.getElementById({})", js_string(id)),
            Selector::Xpath(xpath) => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                js_string(xpath)
            ),
        }
    }

    /// 转为 CSS 选择器，XPath 无法转换
    pub fn as_css(&self) -> Option<String> {
        match self {
            Selector::Css(css) => Some(css.clone()),
            Selector::Id(id) => Some(format!("#{}", id)),
            Selector::Xpath(_) => None,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Css(v) => write!(f, "css={}", v),
            Selector::Xpath(v) => write!(f, "xpath={}", v),
            Selector::Id(v) => write!(f, "id={}", v),
        }
    }
}

fn js_string(value: &str) -> String {
    // serde_json 的字符串转义与 JS 字符串字面量兼容
    serde_json::Value::String(value.to_string()).to_string()
}

/// 外部页面的选择器表
///
/// 页面布局变化时只需要改这一处（或提供 `SELECTORS_FILE`）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorMap {
    /// 文件上传控件（通常是隐藏的）
    pub file_input: Selector,
    /// “单个工作表”选项，按页面结构位置定位
    pub single_sheet_option: Selector,
    /// 转换按钮
    pub convert_button: Selector,
    /// 下载按钮
    pub download_button: Selector,
}

impl Default for SelectorMap {
    fn default() -> Self {
        Self {
            file_input: Selector::Css("input[type='file']".to_string()),
            single_sheet_option: Selector::Xpath(
                "/html/body/div[1]/div[1]/div[2]/div[2]/div[5]/ul/li[1]/div".to_string(),
            ),
            convert_button: Selector::Id("processTask".to_string()),
            download_button: Selector::Id("pickfiles".to_string()),
        }
    }
}

impl SelectorMap {
    /// 从 TOML 文件加载选择器，未写出的项保持默认值
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::Config {
            message: format!("无法读取选择器文件 {}: {}", path.display(), e),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        Ok(toml::from_str(content)?)
    }
}
