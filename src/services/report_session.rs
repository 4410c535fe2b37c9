//! 报表会话 - 业务能力层
//!
//! 一个会话持有一个浏览器上下文，提供两种能力：
//! - 为某个类别导航并按年份筛选
//! - 触发某月的下载并把文件落到目标路径
//!
//! 每一步都是先等待元素就绪、执行交互，再固定等待 `time_between_steps`。
//! 失败不重试，直接返回。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::browser::{PortalDriver, Readiness};
use crate::config::SessionSettings;
use crate::error::{CrawlError, CrawlResult};
use crate::models::{Month, ReportCategory, UiStep, Year};
use crate::services::download_resolver::DownloadResolver;
use crate::workflow::{CategoryCtx, ExtractionStage};

/// 报表会话
pub struct ReportSession<D: PortalDriver> {
    driver: D,
    output_dir: PathBuf,
    settings: SessionSettings,
    resolver: DownloadResolver,
    stages: HashMap<ReportCategory, ExtractionStage>,
    screenshot_seq: usize,
}

impl<D: PortalDriver> ReportSession<D> {
    pub fn new(driver: D, output_dir: impl Into<PathBuf>, settings: SessionSettings) -> Self {
        let output_dir = output_dir.into();
        Self {
            driver,
            resolver: DownloadResolver::new(&output_dir),
            output_dir,
            settings,
            stages: HashMap::new(),
            screenshot_seq: 0,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// 类别当前所处阶段
    pub fn stage(&self, category: ReportCategory) -> ExtractionStage {
        self.stages.get(&category).copied().unwrap_or_default()
    }

    /// 打开工资报表页面并按年份查询
    pub async fn select_payroll_filter(&mut self, year: &Year) -> CrawlResult<()> {
        self.select_filter(ReportCategory::Payroll, year).await
    }

    /// 通过报表类别子菜单打开补偿标签页并按年份查询
    pub async fn select_indemnities_filter(&mut self, year: &Year) -> CrawlResult<()> {
        self.select_filter(ReportCategory::Indemnities, year).await
    }

    /// 按布局表执行导航与筛选步骤
    pub async fn select_filter(&mut self, category: ReportCategory, year: &Year) -> CrawlResult<()> {
        let ctx = CategoryCtx::filter(category, year);
        let layout = category.layout();

        info!("{} 正在导航...", ctx);
        for step in layout.navigation {
            self.run_step(&ctx, step, year).await?;
        }
        self.advance(&ctx, ExtractionStage::Navigated)?;

        info!("{} 正在筛选年份...", ctx);
        for step in layout.filter {
            self.run_step(&ctx, step, year).await?;
        }
        self.advance(&ctx, ExtractionStage::FilterApplied)?;

        info!("{} ✓ 筛选完成", ctx);
        Ok(())
    }

    /// 下载指定月份的报表并重命名为 `target`
    ///
    /// 点击失败或超时视为该期没有数据（`DataUnavailable`）。
    pub async fn download_month(
        &mut self,
        category: ReportCategory,
        year: &Year,
        month: &Month,
        target: &Path,
    ) -> CrawlResult<PathBuf> {
        let ctx = CategoryCtx::download(category, year, month);
        let current = self.stage(category);
        if current != ExtractionStage::FilterApplied {
            return Err(CrawlError::output(
                format!("{} 下载", ctx),
                format!("尚未完成筛选（当前阶段: {}）", current),
            ));
        }

        self.driver
            .configure_downloads(&self.output_dir)
            .await
            .map_err(|e| CrawlError::output(format!("{} 设置下载目录", ctx), e))?;

        // 点击前的目录状态，之后只认新出现的文件
        let before = self.resolver.snapshot(None)?;

        let selector = category.download_selector(month);
        info!("{} 点击下载: {}", ctx, selector);
        let step_timeout = self.settings.step_timeout;
        let trigger = async {
            self.driver
                .wait_for(&selector, Readiness::Visible, step_timeout)
                .await?;
            self.driver.click(&selector).await
        };
        match tokio::time::timeout(step_timeout, trigger).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(CrawlError::data_unavailable(
                    format!("{} 点击下载", ctx),
                    target,
                    Some(e.into()),
                ))
            }
            Err(elapsed) => {
                return Err(CrawlError::data_unavailable(
                    format!("{} 点击下载", ctx),
                    target,
                    Some(Box::new(elapsed)),
                ))
            }
        }
        self.advance(&ctx, ExtractionStage::DownloadTriggered)?;

        let completed = match self.driver.wait_download(self.settings.download_timeout).await {
            Ok(name) => name,
            Err(e) => {
                warn!("{} 等待下载事件失败: {}", ctx, e);
                None
            }
        };
        match completed {
            Some(name) => {
                info!("{} 下载完成: {}", ctx, name);
                self.resolver
                    .finalize(&self.output_dir.join(&name), target)?;
            }
            None => {
                info!("{} 未收到下载完成事件，按最新文件识别", ctx);
                self.resolver.resolve(target, &before)?;
            }
        }

        if !target.exists() {
            return Err(CrawlError::system(
                format!("{} 校验下载文件", ctx),
                target,
                std::io::Error::new(std::io::ErrorKind::NotFound, "重命名后目标文件不存在"),
            ));
        }
        self.advance(&ctx, ExtractionStage::Verified)?;

        info!("{} ✓ 下载完成", ctx);
        Ok(target.to_path_buf())
    }

    /// 执行一个交互步骤：等待就绪 → 交互 → 固定等待
    async fn run_step(&mut self, ctx: &CategoryCtx, step: &UiStep, year: &Year) -> CrawlResult<()> {
        let limit = self.settings.step_timeout;
        let result = match *step {
            UiStep::Navigate(url) => self.driver.navigate(url).await,
            UiStep::Click(selector) => {
                self.wait_then(ctx, selector, Readiness::Visible, limit).await?;
                self.driver.click(selector).await
            }
            UiStep::DoubleClick(selector) => {
                self.wait_then(ctx, selector, Readiness::Visible, limit).await?;
                self.driver.double_click(selector).await
            }
            UiStep::FillYear(selector) => {
                self.wait_then(ctx, selector, Readiness::Present, limit).await?;
                self.driver.set_field_value(selector, year.as_str()).await
            }
        };
        result.map_err(|e| CrawlError::output(format!("{} {}", ctx, step.describe()), e))?;

        self.settle().await;
        self.capture(ctx).await;
        Ok(())
    }

    async fn wait_then(
        &self,
        ctx: &CategoryCtx,
        selector: &str,
        readiness: Readiness,
        limit: Duration,
    ) -> CrawlResult<()> {
        self.driver
            .wait_for(selector, readiness, limit)
            .await
            .map_err(|e| CrawlError::output(format!("{} 等待元素 {}", ctx, selector), e))
    }

    async fn settle(&self) {
        if !self.settings.time_between_steps.is_zero() {
            sleep(self.settings.time_between_steps).await;
        }
    }

    /// 调试截图，失败只记录警告
    async fn capture(&mut self, ctx: &CategoryCtx) {
        let Some(dir) = self.settings.screenshot_dir.clone() else {
            return;
        };
        if ctx.category != ReportCategory::Indemnities {
            return;
        }
        self.screenshot_seq += 1;
        let path = dir.join(format!("etapa-{}-{}.png", self.screenshot_seq, ctx.category));

        let result = async {
            let bytes = self.driver.screenshot().await?;
            tokio::fs::create_dir_all(&dir).await?;
            tokio::fs::write(&path, bytes).await?;
            anyhow::Ok(())
        }
        .await;
        match result {
            Ok(()) => info!("{} 截图已保存: {}", ctx, path.display()),
            Err(e) => warn!("{} 截图失败 {}: {}", ctx, path.display(), e),
        }
    }

    fn advance(&mut self, ctx: &CategoryCtx, next: ExtractionStage) -> CrawlResult<()> {
        let current = self.stage(ctx.category);
        let stage = current.advance(next).map_err(|current| {
            CrawlError::output(
                format!("{} 阶段切换", ctx),
                format!("不能从 {} 进入 {}", current, next),
            )
        })?;
        self.stages.insert(ctx.category, stage);
        Ok(())
    }
}
