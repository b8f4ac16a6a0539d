use crate::variable::resolver::VariableResolver;
use serde::Serialize;

/// 变量更新表达式
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum UpdateExpression {
    /// 从响应 Body 提取（JSONPath）
    /// 示例: $.token, $.data[0].id
    JsonPath(String),

    /// 复制已有变量
    /// 示例: {{token}}
    Reference(String),

    /// 包含占位符的模板
    /// 示例: Bearer {{token}}
    Template(String),

    /// 布尔字面量（大小写不敏感）
    Bool(bool),

    /// 双引号字符串，去掉引号后原样保存
    Quoted(String),

    /// 其它：能解析为数字则为数字，否则为字符串
    Literal(String),
}

impl UpdateExpression {
    /// 解析表达式
    ///
    /// 规则按顺序匹配，先匹配者生效
    pub fn parse(raw: &str) -> Self {
        let expr = raw.trim();

        if expr.starts_with("$.") || expr.starts_with("$[") {
            return UpdateExpression::JsonPath(expr.to_string());
        }

        if let Some(name) = VariableResolver::single_placeholder(expr) {
            return UpdateExpression::Reference(name.to_string());
        }

        if expr.contains("{{") {
            return UpdateExpression::Template(expr.to_string());
        }

        if expr.eq_ignore_ascii_case("true") {
            return UpdateExpression::Bool(true);
        }
        if expr.eq_ignore_ascii_case("false") {
            return UpdateExpression::Bool(false);
        }

        if expr.len() >= 2 && expr.starts_with('"') && expr.ends_with('"') {
            return UpdateExpression::Quoted(expr[1..expr.len() - 1].to_string());
        }

        UpdateExpression::Literal(expr.to_string())
    }
}

/// 请求内的变量更新规则，在该请求的响应到达后执行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableUpdate {
    /// 变量名称
    pub key: String,

    /// 原始表达式
    pub expression: String,
}

impl VariableUpdate {
    pub fn new(key: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expression: expression.into(),
        }
    }

    pub fn parsed(&self) -> UpdateExpression {
        UpdateExpression::parse(&self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_path() {
        assert_eq!(
            UpdateExpression::parse("$.data.token"),
            UpdateExpression::JsonPath("$.data.token".to_string())
        );
        assert_eq!(
            UpdateExpression::parse("$[0].id"),
            UpdateExpression::JsonPath("$[0].id".to_string())
        );
    }

    #[test]
    fn test_parse_reference_and_template() {
        assert_eq!(
            UpdateExpression::parse("{{ token }}"),
            UpdateExpression::Reference("token".to_string())
        );
        assert_eq!(
            UpdateExpression::parse("Bearer {{token}}"),
            UpdateExpression::Template("Bearer {{token}}".to_string())
        );
    }

    #[test]
    fn test_parse_bool_case_insensitive() {
        assert_eq!(UpdateExpression::parse("TRUE"), UpdateExpression::Bool(true));
        assert_eq!(UpdateExpression::parse("False"), UpdateExpression::Bool(false));
    }

    #[test]
    fn test_parse_quoted() {
        assert_eq!(
            UpdateExpression::parse("\"hello world\""),
            UpdateExpression::Quoted("hello world".to_string())
        );
        // 单个引号不是合法的引号字符串
        assert_eq!(
            UpdateExpression::parse("\""),
            UpdateExpression::Literal("\"".to_string())
        );
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(
            UpdateExpression::parse("42"),
            UpdateExpression::Literal("42".to_string())
        );
        assert_eq!(
            UpdateExpression::parse("plain"),
            UpdateExpression::Literal("plain".to_string())
        );
    }

    #[test]
    fn test_variable_update_parsed() {
        let update = VariableUpdate::new("id", "$.id");
        assert_eq!(update.parsed(), UpdateExpression::JsonPath("$.id".to_string()));
    }
}
