/// 日志工具模块
///
/// 日志统一写到 stderr，stdout 只留给下载文件路径（下游解析器按行读取）。
use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::CrawlRequest;

/// 初始化日志，`RUST_LOG` 未设置时使用 info 级别
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, request: &CrawlRequest) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 采集启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📅 期间: {}/{}", request.month, request.year);
    info!("📁 输出目录: {}", request.output_dir.display());
    info!(
        "⏱️ 总超时: {:?} | 步骤间隔: {:?} | 下载等待: {:?}",
        config.general_timeout, config.session.time_between_steps, config.session.download_timeout
    );
    info!("{}", "=".repeat(60));
}

/// 记录采集完成信息
pub fn log_crawl_complete(paths: &[PathBuf]) {
    info!("\n{}", "─".repeat(60));
    info!("✅ 采集完成，共 {} 个文件", paths.len());
    for path in paths {
        info!("  {}", path.display());
    }
    info!("{}", "─".repeat(60));
}
