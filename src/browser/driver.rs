//! 门户操作能力
//!
//! `ReportSession` 只通过 `PortalDriver` 操作浏览器，测试时可以替换成假实现。

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::{
    DownloadProgressState, EventDownloadProgress, SetDownloadBehaviorBehavior,
    SetDownloadBehaviorParams,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, warn};

use crate::infrastructure::JsExecutor;

/// 就绪轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 元素就绪条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// 节点存在于 DOM 中
    Present,
    /// 节点存在且可见
    Visible,
}

/// 门户操作能力（浏览器自动化边界）
///
/// 选择器均为 XPath。
#[async_trait]
pub trait PortalDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    /// 轮询直到元素满足就绪条件，超过 `limit` 返回错误
    async fn wait_for(&self, selector: &str, readiness: Readiness, limit: Duration) -> Result<()>;

    async fn set_field_value(&self, selector: &str, value: &str) -> Result<()>;

    async fn click(&self, selector: &str) -> Result<()>;

    async fn double_click(&self, selector: &str) -> Result<()>;

    /// 让浏览器把下载保存到 `dir`，文件名由浏览器决定
    async fn configure_downloads(&self, dir: &Path) -> Result<()>;

    /// 等待下一个完成的下载，返回浏览器在下载目录中使用的文件名；
    /// `limit` 内没有完成事件时返回 `None`
    async fn wait_download(&self, limit: Duration) -> Result<Option<String>>;

    /// 整页截图（PNG）
    async fn screenshot(&self) -> Result<Vec<u8>>;
}

/// 基于 chromiumoxide 的实现
pub struct ChromePortal {
    executor: JsExecutor,
    /// 下载完成事件（文件名 = 下载 GUID）
    downloads: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
}

impl ChromePortal {
    pub fn new(page: Page) -> Self {
        Self {
            executor: JsExecutor::new(page),
            downloads: Mutex::new(None),
        }
    }

    fn page(&self) -> &Page {
        self.executor.page()
    }

    /// 订阅下载进度事件，只订阅一次
    async fn watch_downloads(&self) -> Result<()> {
        let mut downloads = self.downloads.lock().await;
        if downloads.is_some() {
            return Ok(());
        }

        let mut events = self
            .page()
            .event_listener::<EventDownloadProgress>()
            .await
            .context("订阅下载事件失败")?;
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if event.state == DownloadProgressState::Completed {
                    debug!("下载完成事件: {}", event.guid);
                    if tx.send(event.guid.clone()).is_err() {
                        break;
                    }
                }
            }
        });

        *downloads = Some(rx);
        Ok(())
    }
}

/// 清空已排队的下载完成事件，返回丢弃的数量
fn drain_stale(rx: &mut mpsc::UnboundedReceiver<String>) -> usize {
    let mut dropped = 0;
    while let Ok(guid) = rx.try_recv() {
        debug!("过期下载事件: {}", guid);
        dropped += 1;
    }
    dropped
}

#[async_trait]
impl PortalDriver for ChromePortal {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page()
            .goto(url)
            .await
            .with_context(|| format!("导航到 {} 失败", url))?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, readiness: Readiness, limit: Duration) -> Result<()> {
        let deadline = Instant::now() + limit;
        loop {
            let ready = match readiness {
                Readiness::Present => self.executor.xpath_present(selector).await,
                Readiness::Visible => self.executor.xpath_visible(selector).await,
            };
            match ready {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                // 页面跳转期间脚本可能执行失败，继续轮询
                Err(e) => debug!("就绪检查失败 {}: {}", selector, e),
            }
            if Instant::now() >= deadline {
                bail!("等待元素超时 ({:?}, {:?}): {}", readiness, limit, selector);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn set_field_value(&self, selector: &str, value: &str) -> Result<()> {
        if !self.executor.set_value(selector, value).await? {
            bail!("未找到输入框: {}", selector);
        }
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page()
            .find_xpath(selector)
            .await
            .with_context(|| format!("未找到元素: {}", selector))?;
        element
            .click()
            .await
            .with_context(|| format!("点击失败: {}", selector))?;
        Ok(())
    }

    async fn double_click(&self, selector: &str) -> Result<()> {
        // 与真实双击一致：两次 click 之后再派发 dblclick
        self.click(selector).await?;
        self.click(selector).await?;
        if !self.executor.dispatch_double_click(selector).await? {
            bail!("未找到元素: {}", selector);
        }
        Ok(())
    }

    async fn configure_downloads(&self, dir: &Path) -> Result<()> {
        let params = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::AllowAndName)
            .download_path(dir.to_string_lossy().to_string())
            .events_enabled(true)
            .build()
            .map_err(|e| anyhow::anyhow!("构建下载配置失败: {}", e))?;
        self.page()
            .execute(params)
            .await
            .context("设置下载目录失败")?;

        if let Err(e) = self.watch_downloads().await {
            warn!("无法监听下载事件，将使用最新文件识别下载: {}", e);
        }

        // 上一次下载超时后才到达的完成事件不能算到这次点击上
        if let Some(rx) = self.downloads.lock().await.as_mut() {
            let stale = drain_stale(rx);
            if stale > 0 {
                debug!("丢弃 {} 个过期的下载完成事件", stale);
            }
        }
        Ok(())
    }

    async fn wait_download(&self, limit: Duration) -> Result<Option<String>> {
        let mut downloads = self.downloads.lock().await;
        let Some(rx) = downloads.as_mut() else {
            sleep(limit).await;
            return Ok(None);
        };
        let deadline = Instant::now() + limit;
        let received = tokio::time::timeout_at(deadline, rx.recv()).await;
        match received {
            Ok(Some(guid)) => Ok(Some(guid)),
            Ok(None) => {
                // 事件任务已结束，仍然等满下载时长
                *downloads = None;
                sleep_until(deadline).await;
                Ok(None)
            }
            Err(_) => Ok(None),
        }
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder().full_page(true).build();
        let bytes = self.page().screenshot(params).await.context("截图失败")?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_stale_discards_late_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send("guid-contracheques".to_string()).unwrap();
        tx.send("guid-atrasado".to_string()).unwrap();

        assert_eq!(drain_stale(&mut rx), 2);
        assert_eq!(drain_stale(&mut rx), 0);

        // 清空后到达的事件属于本次下载
        tx.send("guid-indenizacoes".to_string()).unwrap();
        assert_eq!(rx.try_recv().unwrap(), "guid-indenizacoes");
    }
}
