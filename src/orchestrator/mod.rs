//! 编排层（Orchestration Layer）
//!
//! ```text
//! orchestrator::Crawler (两个类别，顺序执行)
//!     ↓
//! services::ReportSession (单个类别：筛选 / 下载)
//!     ↓
//! services::DownloadResolver (识别并重命名下载文件)
//!     ↓
//! browser::PortalDriver (浏览器能力)
//! ```
//!
//! 只有编排层负责浏览器的打开与关闭。

pub mod crawler;

pub use crawler::{render_paths, Crawler};
