//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力。
//! 门户的选择器都是 XPath，这里负责把它们翻译成 `document.evaluate` 脚本。

use anyhow::Result;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 不认识报表类别 / 月份
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于导航、点击、截图等）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 节点是否存在
    pub async fn xpath_present(&self, xpath: &str) -> Result<bool> {
        self.eval_as(format!("(() => {} !== null)()", lookup(xpath)?))
            .await
    }

    /// 节点是否存在且可见（有布局尺寸）
    pub async fn xpath_visible(&self, xpath: &str) -> Result<bool> {
        self.eval_as(format!(
            r#"(() => {{
                const node = {};
                return !!node && !!(node.offsetWidth || node.offsetHeight || node.getClientRects().length);
            }})()"#,
            lookup(xpath)?
        ))
        .await
    }

    /// 设置输入框的值并触发 input/change 事件，返回节点是否存在
    pub async fn set_value(&self, xpath: &str, value: &str) -> Result<bool> {
        self.eval_as(format!(
            r#"(() => {{
                const node = {};
                if (!node) return false;
                node.value = {};
                node.dispatchEvent(new Event('input', {{ bubbles: true }}));
                node.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            lookup(xpath)?,
            serde_json::to_string(value)?
        ))
        .await
    }

    /// 派发 dblclick 事件，返回节点是否存在
    pub async fn dispatch_double_click(&self, xpath: &str) -> Result<bool> {
        self.eval_as(format!(
            r#"(() => {{
                const node = {};
                if (!node) return false;
                node.dispatchEvent(new MouseEvent('dblclick', {{ bubbles: true, cancelable: true, view: window }}));
                return true;
            }})()"#,
            lookup(xpath)?
        ))
        .await
    }
}

/// XPath 查询表达式
fn lookup(xpath: &str) -> Result<String> {
    Ok(format!(
        "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
        serde_json::to_string(xpath)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_escapes_quotes() {
        let js = lookup(r#"//*[@id="j_idt136"]"#).unwrap();
        assert!(js.starts_with(r#"document.evaluate("//*[@id=\"j_idt136\"]""#));
        assert!(js.ends_with(".singleNodeValue"));
    }
}
