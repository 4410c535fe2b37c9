use mpt_payroll_crawler::browser::{self, ChromePortal, PortalDriver, Readiness};
use mpt_payroll_crawler::config::{BrowserSettings, Config};
use mpt_payroll_crawler::models::category::PAYROLL_URL;
use mpt_payroll_crawler::utils::logging;
use mpt_payroll_crawler::{CrawlRequest, Crawler};
use std::time::Duration;

#[tokio::test]
#[ignore] // 默认忽略，需要本机浏览器和网络：cargo test -- --ignored
async fn test_crawl_real_portal() {
    // 初始化日志
    logging::init();

    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        month: "08".to_string(),
        year: "2021".to_string(),
        output_folder: dir.path().to_path_buf(),
        ..Config::default()
    };
    let request = config.crawl_request().expect("请求无效");

    let paths = Crawler::new(config)
        .crawl(&request)
        .await
        .expect("采集失败");

    for path in &paths {
        assert!(path.exists(), "文件应该存在: {}", path.display());
    }
}

#[tokio::test]
#[ignore]
async fn test_payroll_page_has_year_filter() {
    logging::init();

    let (handle, page) = browser::open(&BrowserSettings::default())
        .await
        .expect("启动浏览器失败");
    let portal = ChromePortal::new(page);

    portal.navigate(PAYROLL_URL).await.expect("导航失败");
    let result = portal
        .wait_for(
            r#"//*[@id="j_idt136"]"#,
            Readiness::Present,
            Duration::from_secs(30),
        )
        .await;
    handle.shutdown().await;

    assert!(result.is_ok(), "年份输入框应该存在");
}

#[test]
fn test_invalid_month_never_reaches_browser() {
    let config = Config {
        month: "13".to_string(),
        year: "2021".to_string(),
        ..Config::default()
    };
    assert!(config.crawl_request().is_err());

    // 合法请求用于对照
    assert!(CrawlRequest::parse("2021", "12", &config.output_folder).is_ok());
}
