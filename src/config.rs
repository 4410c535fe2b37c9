use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::{CrawlError, CrawlResult};
use crate::models::CrawlRequest;

/// 采集总时长上限，按历史运行平均 ~4.5 分钟估算
pub const DEFAULT_GENERAL_TIMEOUT: Duration = Duration::from_secs(4 * 60);
/// 两次页面交互之间的等待
pub const DEFAULT_TIME_BETWEEN_STEPS: Duration = Duration::from_secs(5);
/// 每个文件下载完成的等待时长
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);
/// 单个点击-下载步骤的上限
pub const STEP_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_OUTPUT_FOLDER: &str = "/output";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/77.0.3830.0 Safari/537.36";

/// 浏览器配置
#[derive(Clone, Debug)]
pub struct BrowserSettings {
    /// 是否无头运行（调试时可设为 false）
    pub headless: bool,
    /// 浏览器可执行文件，未指定时自动查找
    pub chrome_executable: Option<PathBuf>,
    /// 已运行浏览器的调试端口，设置后连接而不是启动
    pub debug_port: Option<u16>,
    pub user_agent: String,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            debug_port: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// 报表会话的节奏配置
#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub time_between_steps: Duration,
    pub download_timeout: Duration,
    pub step_timeout: Duration,
    /// 调试截图目录
    pub screenshot_dir: Option<PathBuf>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            time_between_steps: DEFAULT_TIME_BETWEEN_STEPS,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            step_timeout: STEP_TIMEOUT,
            screenshot_dir: None,
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 原始月份（校验在 `crawl_request` 中完成）
    pub month: String,
    /// 原始年份
    pub year: String,
    pub output_folder: PathBuf,
    pub general_timeout: Duration,
    pub session: SessionSettings,
    pub browser: BrowserSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            month: String::new(),
            year: String::new(),
            output_folder: PathBuf::from(DEFAULT_OUTPUT_FOLDER),
            general_timeout: DEFAULT_GENERAL_TIMEOUT,
            session: SessionSettings::default(),
            browser: BrowserSettings::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> CrawlResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置，空字符串视为未设置
    pub fn from_lookup<F>(lookup: F) -> CrawlResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let default = Self::default();

        let month = var("MONTH").ok_or_else(|| missing("MONTH"))?;
        let year = var("YEAR").ok_or_else(|| missing("YEAR"))?;

        let duration = |key: &str, fallback: Duration| -> CrawlResult<Duration> {
            match var(key) {
                Some(raw) => parse_duration(&raw)
                    .ok_or_else(|| CrawlError::invalid_input(key, raw, "无法解析为时长（例如 4m、5s、1m30s）")),
                None => Ok(fallback),
            }
        };

        let headless = match var("HEADLESS") {
            Some(raw) => raw
                .parse::<bool>()
                .map_err(|_| CrawlError::invalid_input("HEADLESS", raw, "应为 true 或 false"))?,
            None => default.browser.headless,
        };

        let debug_port = match var("BROWSER_DEBUG_PORT") {
            Some(raw) => Some(raw.parse::<u16>().map_err(|_| {
                CrawlError::invalid_input("BROWSER_DEBUG_PORT", raw, "应为端口号")
            })?),
            None => None,
        };

        Ok(Self {
            month,
            year,
            output_folder: var("OUTPUT_FOLDER")
                .map(PathBuf::from)
                .unwrap_or(default.output_folder),
            general_timeout: duration("GENERAL_TIMEOUT", default.general_timeout)?,
            session: SessionSettings {
                time_between_steps: duration(
                    "TIME_BETWEEN_STEPS",
                    default.session.time_between_steps,
                )?,
                download_timeout: duration("DOWNLOAD_TIMEOUT", default.session.download_timeout)?,
                step_timeout: default.session.step_timeout,
                screenshot_dir: var("SCREENSHOT_DIR").map(PathBuf::from),
            },
            browser: BrowserSettings {
                headless,
                chrome_executable: var("CHROME_EXECUTABLE").map(PathBuf::from),
                debug_port,
                user_agent: var("USER_AGENT").unwrap_or(default.browser.user_agent),
            },
        })
    }

    /// 校验月份和年份，得到只读的采集请求
    pub fn crawl_request(&self) -> CrawlResult<CrawlRequest> {
        CrawlRequest::parse(&self.year, &self.month, &self.output_folder)
    }
}

fn missing(key: &str) -> CrawlError {
    CrawlError::invalid_input(key, "", "必须设置该环境变量")
}

static DURATION_WHOLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:\d+(?:\.\d*)?|\.\d+)(?:ns|us|µs|μs|ms|s|m|h))+$")
        .expect("时长整体格式正则无效")
});

static DURATION_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d*)?|\.\d+)(ns|us|µs|μs|ms|s|m|h)").expect("时长分段正则无效")
});

/// 解析 `4m`、`1m30s`、`500ms`、`1.5h` 形式的时长，`0` 表示零
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw == "0" {
        return Some(Duration::ZERO);
    }

    if !DURATION_WHOLE.is_match(raw) {
        return None;
    }

    let mut total = 0f64;
    for caps in DURATION_PART.captures_iter(raw) {
        let value: f64 = caps[1].parse().ok()?;
        let unit = match &caps[2] {
            "ns" => 1e-9,
            "us" | "µs" | "μs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        total += value * unit;
    }

    Duration::try_from_secs_f64(total).ok()
}
