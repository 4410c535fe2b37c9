//! 下载文件识别服务 - 业务能力层
//!
//! 浏览器不允许脚本指定下载文件名，这里根据目录状态推断刚下载完成的文件，
//! 并把它重命名为目标文件名。
//!
//! 点击下载前先取一次快照，识别时只考虑快照之后新出现或修改时间变化的文件，
//! 同一次采集中已经落地的其他目标文件不会被误认。
//! 目录中若有并发写入仍可能选错文件，因此同一输出目录同一时间只能运行一次采集。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::error::{CrawlError, CrawlResult};

/// Chromium 下载未完成时的临时文件后缀
const PARTIAL_SUFFIX: &str = ".crdownload";

/// 目录快照中的一个文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// 选出修改时间最新的文件；时间相同时取文件名字典序最大者
pub fn pick_newest(entries: &[FileSnapshot]) -> Option<&FileSnapshot> {
    entries
        .iter()
        .max_by(|a, b| {
            a.modified
                .cmp(&b.modified)
                .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
        })
}

/// 下载文件识别服务
///
/// 职责：
/// - 列出下载目录中的候选文件
/// - 找出最新文件并重命名为目标路径
/// - 不关心浏览器，也不关心报表类别
#[derive(Debug, Clone)]
pub struct DownloadResolver {
    dir: PathBuf,
}

impl DownloadResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 目录快照：只包含普通文件，跳过未完成的下载和 `exclude`
    pub fn snapshot(&self, exclude: Option<&Path>) -> CrawlResult<Vec<FileSnapshot>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| CrawlError::system("读取下载目录", &self.dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CrawlError::system("读取下载目录", &self.dir, e))?;
            let path = entry.path();

            let metadata = fs::metadata(&path)
                .map_err(|e| CrawlError::system("读取文件信息", &path, e))?;
            if !metadata.is_file() {
                continue;
            }
            if path.to_string_lossy().ends_with(PARTIAL_SUFFIX) {
                debug!("跳过未完成的下载: {}", path.display());
                continue;
            }
            if exclude == Some(path.as_path()) {
                continue;
            }

            let modified = metadata
                .modified()
                .map_err(|e| CrawlError::system("读取修改时间", &path, e))?;
            files.push(FileSnapshot { path, modified });
        }

        Ok(files)
    }

    /// 将 `before` 之后出现的最新文件重命名为 `target`，返回被重命名的原文件路径
    ///
    /// 路径和修改时间都与 `before` 中某项相同的文件视为旧文件。
    pub fn resolve(&self, target: &Path, before: &[FileSnapshot]) -> CrawlResult<PathBuf> {
        let candidates: Vec<FileSnapshot> = self
            .snapshot(Some(target))?
            .into_iter()
            .filter(|file| !before.contains(file))
            .collect();
        debug!(
            "下载目录 {} 中有 {} 个新文件（快照 {} 个）",
            self.dir.display(),
            candidates.len(),
            before.len()
        );

        let newest = pick_newest(&candidates).ok_or_else(|| {
            CrawlError::data_unavailable("识别下载文件: 下载目录中没有新文件", target, None)
        })?;

        info!(
            "最新文件: {} (修改于 {})",
            newest.path.display(),
            DateTime::<Local>::from(newest.modified).format("%Y-%m-%d %H:%M:%S%.3f")
        );

        self.finalize(&newest.path, target)?;
        Ok(newest.path.clone())
    }

    /// 将已知的下载文件重命名为 `target`（目标已存在时覆盖）
    pub fn finalize(&self, source: &Path, target: &Path) -> CrawlResult<()> {
        fs::rename(source, target).map_err(|e| {
            CrawlError::data_unavailable(
                format!("重命名下载文件 {} -> {}", source.display(), target.display()),
                target,
                Some(Box::new(e)),
            )
        })?;
        info!("✓ 已保存: {}", target.display());
        Ok(())
    }
}
