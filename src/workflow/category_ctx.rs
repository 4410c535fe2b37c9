//! 类别处理上下文
//!
//! 封装"我正在处理哪个类别的哪一期"这一信息，用作日志前缀

use std::fmt::Display;

use crate::models::{Month, ReportCategory, Year};

/// 类别处理上下文
#[derive(Debug, Clone)]
pub struct CategoryCtx {
    pub category: ReportCategory,
    pub year: Year,
    /// 筛选阶段还不涉及月份
    pub month: Option<Month>,
}

impl CategoryCtx {
    pub fn filter(category: ReportCategory, year: &Year) -> Self {
        Self {
            category,
            year: year.clone(),
            month: None,
        }
    }

    pub fn download(category: ReportCategory, year: &Year, month: &Month) -> Self {
        Self {
            category,
            year: year.clone(),
            month: Some(month.clone()),
        }
    }
}

impl Display for CategoryCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.month {
            Some(month) => write!(f, "[{} {}/{}]", self.category, month, self.year),
            None => write!(f, "[{} {}]", self.category, self.year),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let year = Year::parse("2021").unwrap();
        let month = Month::parse("08").unwrap();

        assert_eq!(
            CategoryCtx::filter(ReportCategory::Payroll, &year).to_string(),
            "[contracheques 2021]"
        );
        assert_eq!(
            CategoryCtx::download(ReportCategory::Indemnities, &year, &month).to_string(),
            "[indenizacoes 08/2021]"
        );
    }
}
