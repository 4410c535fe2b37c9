use std::path::PathBuf;

use mpt_payroll_crawler::config::Config;
use mpt_payroll_crawler::error::{CrawlError, CrawlResult};
use mpt_payroll_crawler::models::CrawlRequest;
use mpt_payroll_crawler::orchestrator::{render_paths, Crawler};
use mpt_payroll_crawler::utils::logging;
use tracing::error;

#[tokio::main]
async fn main() {
    // 初始化日志（stderr）
    logging::init();

    match run().await {
        Ok(paths) => {
            logging::log_crawl_complete(&paths);
            // 下游解析器按 \n 切分文件列表，格式变动需同步修改解析器
            println!("{}", render_paths(&paths));
        }
        Err((err, prefix)) => {
            let status = err.status_line(&prefix);
            error!("❌ {}", status.message);
            eprintln!("{}", status.to_json());
            std::process::exit(status.kind.exit_code());
        }
    }
}

async fn run() -> Result<[PathBuf; 2], (CrawlError, String)> {
    // 加载并校验配置（在打开浏览器之前）
    let config = Config::from_env().map_err(|e| (e, String::new()))?;
    let request = config.crawl_request().map_err(|e| (e, String::new()))?;
    prepare_output_dir(&request).map_err(|e| (e, String::new()))?;

    logging::log_startup(&config, &request);

    Crawler::new(config)
        .crawl(&request)
        .await
        .map_err(|e| {
            let prefix = format!(
                "({}, {}, {})",
                request.year,
                request.month,
                request.output_dir.display()
            );
            (e, prefix)
        })
}

fn prepare_output_dir(request: &CrawlRequest) -> CrawlResult<()> {
    std::fs::create_dir_all(&request.output_dir)
        .map_err(|e| CrawlError::system("创建输出目录", &request.output_dir, e))
}
