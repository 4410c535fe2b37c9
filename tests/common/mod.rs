//! 测试用的假门户：记录每次调用，点击下载按钮时往下载目录写入一个以 GUID 命名的文件

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use anyhow::{bail, Result};
use async_trait::async_trait;
use mpt_payroll_crawler::browser::{PortalDriver, Readiness};
use mpt_payroll_crawler::config::{Config, SessionSettings};

/// 调用记录，测试持有一份克隆
pub type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
struct DownloadState {
    dir: Option<PathBuf>,
    pending: Option<String>,
    count: u64,
}

pub struct FakePortal {
    log: CallLog,
    /// 包含这些片段的选择器在等待就绪时失败
    fail_on: Vec<String>,
    /// 包含这些片段的下载按钮不存在（门户没有该期数据）
    no_data: Vec<String>,
    /// 包含这些片段的下载按钮可以点击，但什么也不下载
    empty_download: Vec<String>,
    /// 是否上报下载完成事件
    emit_events: bool,
    state: Mutex<DownloadState>,
}

impl FakePortal {
    pub fn new() -> (Self, CallLog) {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let portal = Self {
            log: log.clone(),
            fail_on: Vec::new(),
            no_data: Vec::new(),
            empty_download: Vec::new(),
            emit_events: true,
            state: Mutex::new(DownloadState::default()),
        };
        (portal, log)
    }

    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.fail_on.push(fragment.to_string());
        self
    }

    pub fn without_data_for(mut self, fragment: &str) -> Self {
        self.no_data.push(fragment.to_string());
        self
    }

    pub fn with_empty_download_for(mut self, fragment: &str) -> Self {
        self.empty_download.push(fragment.to_string());
        self
    }

    pub fn without_events(mut self) -> Self {
        self.emit_events = false;
        self
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn matches(fragments: &[String], selector: &str) -> bool {
        fragments.iter().any(|f| selector.contains(f.as_str()))
    }

    /// 模拟浏览器落地一个下载文件，修改时间逐个递增
    fn land_download(&self, selector: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let Some(dir) = state.dir.clone() else {
            bail!("下载目录未设置");
        };
        state.count += 1;
        let guid = format!("9b1f0c3e-{:04}", state.count);
        let path = dir.join(&guid);

        let mut file = File::create(&path)?;
        writeln!(file, "{} #{}", selector, state.count)?;
        file.set_modified(SystemTime::now() + Duration::from_secs(state.count * 10))?;

        state.pending = Some(guid);
        Ok(())
    }
}

#[async_trait]
impl PortalDriver for FakePortal {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.record(format!("navigate {}", url));
        Ok(())
    }

    async fn wait_for(&self, selector: &str, readiness: Readiness, _limit: Duration) -> Result<()> {
        self.record(format!("wait {:?} {}", readiness, selector));
        if Self::matches(&self.fail_on, selector) {
            bail!("等待元素超时: {}", selector);
        }
        if Self::matches(&self.no_data, selector) {
            bail!("未找到下载按钮: {}", selector);
        }
        Ok(())
    }

    async fn set_field_value(&self, selector: &str, value: &str) -> Result<()> {
        self.record(format!("fill {}={}", selector, value));
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.record(format!("click {}", selector));
        if selector.contains("tabela") && !Self::matches(&self.empty_download, selector) {
            self.land_download(selector)?;
        }
        Ok(())
    }

    async fn double_click(&self, selector: &str) -> Result<()> {
        self.record(format!("dblclick {}", selector));
        Ok(())
    }

    async fn configure_downloads(&self, dir: &Path) -> Result<()> {
        self.record(format!("downloads {}", dir.display()));
        self.state.lock().unwrap().dir = Some(dir.to_path_buf());
        Ok(())
    }

    async fn wait_download(&self, _limit: Duration) -> Result<Option<String>> {
        let pending = self.state.lock().unwrap().pending.take();
        if self.emit_events {
            Ok(pending)
        } else {
            Ok(None)
        }
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.record("screenshot".to_string());
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

/// 测试配置：不等待，超时很短
pub fn fast_config() -> Config {
    Config {
        general_timeout: Duration::from_secs(10),
        session: SessionSettings {
            time_between_steps: Duration::ZERO,
            download_timeout: Duration::from_millis(20),
            step_timeout: Duration::from_secs(1),
            screenshot_dir: None,
        },
        ..Config::default()
    }
}

pub fn log_contains(log: &CallLog, fragment: &str) -> bool {
    log.lock().unwrap().iter().any(|entry| entry.contains(fragment))
}
