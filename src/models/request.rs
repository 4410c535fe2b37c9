//! 采集请求
//!
//! 月份和年份都以字符串保存：它们原样写入门户表单和文件名，不参与运算。

use std::fmt;
use std::path::{Path, PathBuf};

use phf::phf_map;

use crate::error::{CrawlError, CrawlResult};

/// 月份代码到下载表格行号的映射
static MONTH_ROWS: phf::Map<&'static str, usize> = phf_map! {
    "01" => 0,
    "02" => 1,
    "03" => 2,
    "04" => 3,
    "05" => 4,
    "06" => 5,
    "07" => 6,
    "08" => 7,
    "09" => 8,
    "10" => 9,
    "11" => 10,
    "12" => 11,
};

/// 两位月份代码（"01"-"12"）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Month(String);

impl Month {
    pub fn parse(value: &str) -> CrawlResult<Self> {
        if MONTH_ROWS.contains_key(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(CrawlError::invalid_input(
                "MONTH",
                value,
                "月份必须是 01 到 12 之间的两位数字",
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 该月在门户下载表格中的行号（从 0 开始）
    pub fn row_index(&self) -> usize {
        MONTH_ROWS.get(self.0.as_str()).copied().unwrap_or_default()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 四位年份
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Year(String);

impl Year {
    pub fn parse(value: &str) -> CrawlResult<Self> {
        if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(value.to_string()))
        } else {
            Err(CrawlError::invalid_input(
                "YEAR",
                value,
                "年份必须是四位数字",
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 一次采集的请求，创建后只读
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub year: Year,
    pub month: Month,
    pub output_dir: PathBuf,
}

impl CrawlRequest {
    pub fn new(year: Year, month: Month, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            year,
            month,
            output_dir: output_dir.into(),
        }
    }

    /// 从原始字符串校验并构建
    pub fn parse(year: &str, month: &str, output_dir: &Path) -> CrawlResult<Self> {
        Ok(Self::new(
            Year::parse(year)?,
            Month::parse(month)?,
            output_dir,
        ))
    }
}

impl fmt::Display for CrawlRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} -> {}",
            self.month,
            self.year,
            self.output_dir.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_month_accepts_twelve_codes() {
        for (i, code) in [
            "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12",
        ]
        .iter()
        .enumerate()
        {
            let month = Month::parse(code).unwrap();
            assert_eq!(month.row_index(), i);
            assert_eq!(month.as_str(), *code);
        }
    }

    #[test]
    fn test_month_rejects_everything_else() {
        for bad in ["13", "00", "1", "8", "001", "", "ab", " 08"] {
            let err = Month::parse(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "输入: {:?}", bad);
        }
    }

    #[test]
    fn test_year_validation() {
        assert_eq!(Year::parse("2021").unwrap().as_str(), "2021");

        for bad in ["21", "20211", "20a1", "", "-202"] {
            assert_eq!(
                Year::parse(bad).unwrap_err().kind(),
                ErrorKind::InvalidInput
            );
        }
    }

    #[test]
    fn test_request_parse() {
        let request = CrawlRequest::parse("2021", "08", Path::new("/tmp/out")).unwrap();

        assert_eq!(request.year.as_str(), "2021");
        assert_eq!(request.month.as_str(), "08");
        assert_eq!(request.to_string(), "08/2021 -> /tmp/out");
    }
}
