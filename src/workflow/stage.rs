//! 单个类别的提取阶段
//!
//! ```text
//! Unvisited → Navigated → FilterApplied → DownloadTriggered → Verified
//! ```
//!
//! 阶段只向前推进；失败不回退，直接向上返回错误。
//! `Verified` 之后允许重新导航（同一会话内再次采集该类别）。

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionStage {
    #[default]
    Unvisited,
    Navigated,
    FilterApplied,
    DownloadTriggered,
    Verified,
}

impl ExtractionStage {
    /// 下一阶段是否合法
    pub fn can_advance_to(self, next: ExtractionStage) -> bool {
        use ExtractionStage::*;
        matches!(
            (self, next),
            (Unvisited, Navigated)
                | (Verified, Navigated)
                | (Navigated, FilterApplied)
                | (FilterApplied, DownloadTriggered)
                | (DownloadTriggered, Verified)
        )
    }

    /// 推进到下一阶段，不合法时返回当前阶段
    pub fn advance(self, next: ExtractionStage) -> Result<ExtractionStage, ExtractionStage> {
        if self.can_advance_to(next) {
            Ok(next)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtractionStage::Unvisited => "未访问",
            ExtractionStage::Navigated => "已导航",
            ExtractionStage::FilterApplied => "已筛选",
            ExtractionStage::DownloadTriggered => "已触发下载",
            ExtractionStage::Verified => "已验证",
        };
        f.write_str(name)
    }
}
