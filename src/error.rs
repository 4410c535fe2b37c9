//! 错误类型
//!
//! 采集过程中的所有失败都归入四种类型之一，由进程边界统一输出并退出。

use std::path::PathBuf;

use serde::Serialize;

/// 可装箱的底层错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 错误类别（进程边界输出的 `kind` 字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// 参数或配置不合法，在打开浏览器之前发现
    InvalidInput,
    /// 门户没有发布该期数据（下载交互失败或没有文件落地）
    DataUnavailable,
    /// 本地 I/O 失败
    SystemError,
    /// 其他未分类的采集失败
    OutputError,
}

impl ErrorKind {
    /// 进程退出码
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::InvalidInput => 1,
            ErrorKind::SystemError => 2,
            ErrorKind::DataUnavailable => 3,
            ErrorKind::OutputError => 4,
        }
    }
}

/// 采集错误
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("参数无效 {field}=\"{value}\": {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("数据不可用 ({operation}, {}){}", .path.display(), describe(.source))]
    DataUnavailable {
        operation: String,
        path: PathBuf,
        #[source]
        source: Option<BoxError>,
    },

    #[error("系统错误 ({operation}, {}): {source}", .path.display())]
    System {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("采集失败 ({context}): {source}")]
    Output {
        context: String,
        #[source]
        source: BoxError,
    },
}

fn describe(source: &Option<BoxError>) -> String {
    match source {
        Some(e) => format!(": {}", e),
        None => String::new(),
    }
}

impl CrawlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CrawlError::InvalidInput { .. } => ErrorKind::InvalidInput,
            CrawlError::DataUnavailable { .. } => ErrorKind::DataUnavailable,
            CrawlError::System { .. } => ErrorKind::SystemError,
            CrawlError::Output { .. } => ErrorKind::OutputError,
        }
    }

    // ========== 便捷构造函数 ==========

    /// 创建参数无效错误
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CrawlError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 创建数据不可用错误
    pub fn data_unavailable(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: Option<BoxError>,
    ) -> Self {
        CrawlError::DataUnavailable {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// 创建本地 I/O 错误
    pub fn system(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        CrawlError::System {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// 包装浏览器层或其他未分类错误
    pub fn output(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        CrawlError::Output {
            context: context.into(),
            source: source.into(),
        }
    }

    /// 在进程边界输出的结构化错误行
    pub fn status_line(&self, prefix: &str) -> StatusLine {
        let message = if prefix.is_empty() {
            self.to_string()
        } else {
            format!("{}: {}", prefix, self)
        };
        StatusLine {
            kind: self.kind(),
            message,
        }
    }
}

/// 结构化错误行 `{"kind": ..., "message": ...}`
#[derive(Debug, Clone, Serialize)]
pub struct StatusLine {
    pub kind: ErrorKind,
    pub message: String,
}

impl StatusLine {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!("{{\"kind\":\"{:?}\",\"message\":\"\"}}", self.kind)
        })
    }
}

/// 采集结果类型
pub type CrawlResult<T> = Result<T, CrawlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_exit_code() {
        let err = CrawlError::invalid_input("MONTH", "13", "月份必须是 01-12");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.kind().exit_code(), 1);

        let err = CrawlError::data_unavailable("下载", "/tmp/out", None);
        assert_eq!(err.kind(), ErrorKind::DataUnavailable);
        assert_ne!(err.kind().exit_code(), 0);
    }

    #[test]
    fn test_status_line_json() {
        let err = CrawlError::invalid_input("YEAR", "20x1", "年份必须是四位数字");
        let line = err.status_line("").to_json();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["kind"], "InvalidInput");
        assert!(value["message"].as_str().unwrap().contains("YEAR"));
    }

    #[test]
    fn test_status_line_prefix() {
        let err = CrawlError::output("打开浏览器", anyhow::anyhow!("boom"));
        let line = err.status_line("(2021, 08, /tmp/out)");

        assert_eq!(line.kind, ErrorKind::OutputError);
        assert!(line.message.starts_with("(2021, 08, /tmp/out): "));
        assert!(line.message.contains("boom"));
    }
}
