//! # MPT Payroll Crawler
//!
//! 通过无头浏览器从 MPT 透明度门户下载在职成员的工资单（contracheques, xls）
//! 和补偿报表（indenizacoes, ods），并以固定文件名保存到输出目录。
//!
//! ## 架构设计
//!
//! ### ① 浏览器层（Browser / Infrastructure）
//! - `browser/` - 启动或连接浏览器；`PortalDriver` 门户操作能力
//! - `infrastructure/` - `JsExecutor`，唯一的 page owner，负责 XPath 脚本
//!
//! ### ② 业务能力层（Services）
//! - `DownloadResolver` - 识别刚下载完成的文件并重命名
//! - `ReportSession` - 单个类别的导航、筛选、下载
//!
//! ### ③ 流程层（Workflow）
//! - `ExtractionStage` - 类别的提取阶段（只进不退）
//! - `CategoryCtx` - 日志上下文（类别 + 期间）
//!
//! ### ④ 编排层（Orchestration）
//! - `Crawler` - 顺序处理两个类别，受总超时约束
//!
//! ## 输出约定
//!
//! 成功时 stdout 输出两行：工资文件路径、补偿文件路径。日志只写 stderr。

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{PortalDriver, Readiness};
pub use config::Config;
pub use error::{CrawlError, CrawlResult, ErrorKind};
pub use infrastructure::JsExecutor;
pub use models::{CrawlRequest, DownloadTarget, Month, ReportCategory, Year};
pub use orchestrator::{render_paths, Crawler};
pub use services::{DownloadResolver, ReportSession};
pub use workflow::{CategoryCtx, ExtractionStage};
