use std::path::PathBuf;

use crate::models::category::ReportCategory;
use crate::models::request::CrawlRequest;

/// 一次下载的目标：类别 + 请求，决定下载文件最终落地的路径
#[derive(Debug, Clone, Copy)]
pub struct DownloadTarget<'a> {
    pub category: ReportCategory,
    pub request: &'a CrawlRequest,
}

impl<'a> DownloadTarget<'a> {
    pub fn new(category: ReportCategory, request: &'a CrawlRequest) -> Self {
        Self { category, request }
    }

    /// `membros-ativos-<类别>-<MM>-<YYYY>.<扩展名>`
    ///
    /// 下游解析器依赖这个文件名格式。
    pub fn file_name(&self) -> String {
        format!(
            "membros-ativos-{}-{}-{}.{}",
            self.category.prefix(),
            self.request.month,
            self.request.year,
            self.category.extension()
        )
    }

    pub fn path(&self) -> PathBuf {
        self.request.output_dir.join(self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_payroll_path() {
        let request = CrawlRequest::parse("2021", "08", Path::new("/tmp/out")).unwrap();
        let target = DownloadTarget::new(ReportCategory::Payroll, &request);

        assert_eq!(
            target.path(),
            PathBuf::from("/tmp/out/membros-ativos-contracheques-08-2021.xls")
        );
    }

    #[test]
    fn test_indemnities_path() {
        let request = CrawlRequest::parse("2019", "12", Path::new("/output")).unwrap();
        let target = DownloadTarget::new(ReportCategory::Indemnities, &request);

        assert_eq!(
            target.path(),
            PathBuf::from("/output/membros-ativos-indenizacoes-12-2019.ods")
        );
    }

    #[test]
    fn test_month_and_year_verbatim() {
        let request = CrawlRequest::parse("2020", "01", Path::new("out")).unwrap();

        for category in ReportCategory::ALL {
            let name = DownloadTarget::new(category, &request).file_name();
            assert!(name.contains("-01-2020."));
            assert!(name.ends_with(category.extension()));
        }
    }
}
