//! 报表类别与门户页面布局
//!
//! 门户标记变动时只需修改本文件中的布局表。

use std::fmt;

use crate::models::request::Month;

/// 工资报表页面
pub const PAYROLL_URL: &str =
    "https://mpt.mp.br/MPTransparencia/pages/portal/remuneracaoMembrosAtivos.xhtml";

/// 页面上的单个交互步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiStep {
    /// 打开页面
    Navigate(&'static str),
    /// 单击元素
    Click(&'static str),
    /// 双击元素
    DoubleClick(&'static str),
    /// 将年份写入输入框
    FillYear(&'static str),
}

impl UiStep {
    /// 用于日志的简短描述
    pub fn describe(&self) -> String {
        match self {
            UiStep::Navigate(url) => format!("打开 {}", url),
            UiStep::Click(selector) => format!("单击 {}", selector),
            UiStep::DoubleClick(selector) => format!("双击 {}", selector),
            UiStep::FillYear(selector) => format!("填写年份 {}", selector),
        }
    }
}

/// 一个类别在门户上的布局：如何到达下载表格、如何过滤、如何定位月份下载按钮
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalLayout {
    /// 到达该类别页面的步骤
    pub navigation: &'static [UiStep],
    /// 过滤年份并查询的步骤
    pub filter: &'static [UiStep],
    /// 月份下载按钮的 XPath 模板，`{row}` 替换为月份行号
    pub download_template: &'static str,
}

static PAYROLL_LAYOUT: PortalLayout = PortalLayout {
    navigation: &[UiStep::Navigate(PAYROLL_URL)],
    filter: &[
        UiStep::FillYear(r#"//*[@id="j_idt136"]"#),
        UiStep::Click(r#"//*[@id="j_idt139"]"#),
    ],
    download_template: r#"//*[@id="tabelaRemuneracao:{row}:j_idt158"]/span"#,
};

// 补偿报表位于报表类别子菜单下，双击打开对应标签页
static INDEMNITIES_LAYOUT: PortalLayout = PortalLayout {
    navigation: &[UiStep::DoubleClick(r#"//*[@id="j_idt95"]"#)],
    filter: &[
        UiStep::FillYear(r#"//*[@id="j_idt142"]"#),
        UiStep::Click(r#"//*[@id="consultaForm"]/div[2]/div/input"#),
    ],
    download_template: r#"//*[@id="tabelaMeses:{row}:linkArq"]/span"#,
};

/// 报表类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportCategory {
    /// 在职成员工资单（contracheques）
    Payroll,
    /// 补偿及临时报酬（indenizacoes）
    Indemnities,
}

impl ReportCategory {
    /// 采集顺序
    pub const ALL: [ReportCategory; 2] = [ReportCategory::Payroll, ReportCategory::Indemnities];

    /// 文件名中的类别前缀
    pub fn prefix(self) -> &'static str {
        match self {
            ReportCategory::Payroll => "contracheques",
            ReportCategory::Indemnities => "indenizacoes",
        }
    }

    /// 门户导出格式的扩展名
    pub fn extension(self) -> &'static str {
        match self {
            ReportCategory::Payroll => "xls",
            ReportCategory::Indemnities => "ods",
        }
    }

    pub fn layout(self) -> &'static PortalLayout {
        match self {
            ReportCategory::Payroll => &PAYROLL_LAYOUT,
            ReportCategory::Indemnities => &INDEMNITIES_LAYOUT,
        }
    }

    /// 指定月份的下载按钮选择器
    pub fn download_selector(self, month: &Month) -> String {
        self.layout()
            .download_template
            .replace("{row}", &month.row_index().to_string())
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_selector_per_category() {
        let august = Month::parse("08").unwrap();

        assert_eq!(
            ReportCategory::Payroll.download_selector(&august),
            r#"//*[@id="tabelaRemuneracao:7:j_idt158"]/span"#
        );
        assert_eq!(
            ReportCategory::Indemnities.download_selector(&august),
            r#"//*[@id="tabelaMeses:7:linkArq"]/span"#
        );
    }

    #[test]
    fn test_january_is_first_row() {
        let january = Month::parse("01").unwrap();
        assert!(ReportCategory::Payroll
            .download_selector(&january)
            .contains("tabelaRemuneracao:0:"));
    }

    #[test]
    fn test_layout_shape() {
        let payroll = ReportCategory::Payroll.layout();
        assert_eq!(payroll.navigation, &[UiStep::Navigate(PAYROLL_URL)]);
        assert!(matches!(payroll.filter[0], UiStep::FillYear(_)));

        let indemnities = ReportCategory::Indemnities.layout();
        assert!(matches!(indemnities.navigation[0], UiStep::DoubleClick(_)));
        assert!(matches!(indemnities.filter.last(), Some(UiStep::Click(_))));
    }

    #[test]
    fn test_prefix_and_extension() {
        assert_eq!(ReportCategory::Payroll.extension(), "xls");
        assert_eq!(ReportCategory::Indemnities.extension(), "ods");
        assert_eq!(ReportCategory::ALL[0], ReportCategory::Payroll);
    }
}
