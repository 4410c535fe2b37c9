//! 浏览器层
//!
//! - `headless` / `connection`：启动无头浏览器或连接已运行的浏览器
//! - `driver`：门户操作能力（`PortalDriver`）及其 Chromium 实现

pub mod connection;
pub mod driver;
pub mod headless;

pub use connection::connect_to_browser_and_page;
pub use driver::{ChromePortal, PortalDriver, Readiness};
pub use headless::launch_headless_browser;

use anyhow::Result;
use chromiumoxide::{Browser, Page};
use tokio::task::JoinHandle;

use crate::config::BrowserSettings;

/// 已打开的浏览器及其事件处理任务
pub struct BrowserHandle {
    pub browser: Browser,
    pub handler: JoinHandle<()>,
    /// 由本进程启动（连接到已运行的浏览器时不负责关闭它）
    pub launched: bool,
}

impl BrowserHandle {
    /// 关闭浏览器并结束事件处理任务
    pub async fn shutdown(mut self) {
        if self.launched {
            if let Err(e) = self.browser.close().await {
                tracing::warn!("关闭浏览器失败: {}", e);
            }
            match self.browser.wait().await {
                Ok(status) => tracing::debug!("浏览器进程已退出: {:?}", status),
                Err(e) => tracing::debug!("等待浏览器进程退出失败: {}", e),
            }
        }
        self.handler.abort();
    }
}

/// 按配置启动或连接浏览器
pub async fn open(settings: &BrowserSettings) -> Result<(BrowserHandle, Page)> {
    match settings.debug_port {
        Some(port) => connect_to_browser_and_page(port).await,
        None => launch_headless_browser(settings).await,
    }
}
