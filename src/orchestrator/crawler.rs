//! 采集编排器
//!
//! 严格按顺序处理两个类别，不并发、不重试、不保留部分结果：
//!
//! ```text
//! 工资筛选 → 工资下载 → 补偿筛选 → 补偿下载
//! ```
//!
//! 整个过程受 `general_timeout` 约束，超时即放弃浏览器上下文。

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::browser::{self, ChromePortal, PortalDriver};
use crate::config::Config;
use crate::error::{CrawlError, CrawlResult};
use crate::models::{CrawlRequest, DownloadTarget, ReportCategory};
use crate::services::ReportSession;

/// 采集编排器
pub struct Crawler {
    config: Config,
}

impl Crawler {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 启动（或连接）浏览器并完成一次采集
    ///
    /// 返回 [工资文件, 补偿文件]。
    pub async fn crawl(&self, request: &CrawlRequest) -> CrawlResult<[PathBuf; 2]> {
        let run = async {
            let (handle, page) = browser::open(&self.config.browser)
                .await
                .map_err(|e| CrawlError::output("打开浏览器", e))?;
            let driver = ChromePortal::new(page);

            let result = self.run_categories(driver, request).await;
            handle.shutdown().await;
            result
        };
        with_deadline(self.config.general_timeout, run).await
    }

    /// 使用给定的门户实现完成一次采集
    pub async fn crawl_with<D: PortalDriver>(
        &self,
        driver: D,
        request: &CrawlRequest,
    ) -> CrawlResult<[PathBuf; 2]> {
        with_deadline(
            self.config.general_timeout,
            self.run_categories(driver, request),
        )
        .await
    }

    async fn run_categories<D: PortalDriver>(
        &self,
        driver: D,
        request: &CrawlRequest,
    ) -> CrawlResult<[PathBuf; 2]> {
        let mut session = ReportSession::new(
            driver,
            &request.output_dir,
            self.config.session.clone(),
        );

        info!("📊 正在选择 - 工资单 ({})...", request.year);
        session.select_payroll_filter(&request.year).await?;
        let payroll = DownloadTarget::new(ReportCategory::Payroll, request).path();
        info!("⬇️ 正在下载 ({}/{})...", request.month, request.year);
        let payroll = session
            .download_month(ReportCategory::Payroll, &request.year, &request.month, &payroll)
            .await?;

        info!("📊 正在选择 - 补偿 ({})...", request.year);
        session.select_indemnities_filter(&request.year).await?;
        let indemnities = DownloadTarget::new(ReportCategory::Indemnities, request).path();
        info!("⬇️ 正在下载 ({}/{})...", request.month, request.year);
        let indemnities = session
            .download_month(
                ReportCategory::Indemnities,
                &request.year,
                &request.month,
                &indemnities,
            )
            .await?;

        Ok([payroll, indemnities])
    }
}

async fn with_deadline<F>(limit: Duration, run: F) -> CrawlResult<[PathBuf; 2]>
where
    F: std::future::Future<Output = CrawlResult<[PathBuf; 2]>>,
{
    match tokio::time::timeout(limit, run).await {
        Ok(result) => result,
        Err(elapsed) => Err(CrawlError::output(
            format!("采集超过总时长 {:?}", limit),
            elapsed,
        )),
    }
}

/// 下游解析器期望的输出：每行一个文件路径
pub fn render_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_paths() {
        let paths = [
            PathBuf::from("/tmp/out/membros-ativos-contracheques-08-2021.xls"),
            PathBuf::from("/tmp/out/membros-ativos-indenizacoes-08-2021.ods"),
        ];
        assert_eq!(
            render_paths(&paths),
            "/tmp/out/membros-ativos-contracheques-08-2021.xls\n/tmp/out/membros-ativos-indenizacoes-08-2021.ods"
        );
    }

    #[tokio::test]
    async fn test_deadline_exceeded_is_output_error() {
        let result = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok([PathBuf::new(), PathBuf::new()])
        })
        .await;

        assert_eq!(
            result.unwrap_err().kind(),
            crate::error::ErrorKind::OutputError
        );
    }
}
