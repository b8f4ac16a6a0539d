use serde::Serialize;
use serde_json::{Number, Value};
use std::fmt;

/// 变量值（标量）
///
/// 数字使用 `serde_json::Number` 保存，整数不会丢失精度
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VariableValue {
    String(String),
    Number(Number),
    Bool(bool),
}

impl VariableValue {
    /// 将 JSON 值转换为变量值
    ///
    /// `null`、数组和对象保存为其 JSON 文本
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => VariableValue::String(s.clone()),
            Value::Number(n) => VariableValue::Number(n.clone()),
            Value::Bool(b) => VariableValue::Bool(*b),
            other => VariableValue::String(other.to_string()),
        }
    }

    /// 可解析为数字则为数字，否则为字符串
    pub fn number_or_string(raw: &str) -> Self {
        match parse_number(raw) {
            Some(n) => VariableValue::Number(n),
            None => VariableValue::String(raw.to_string()),
        }
    }
}

/// 解析数字：先尝试整数，再尝试有限浮点数
pub fn parse_number(raw: &str) -> Option<Number> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Some(Number::from(i));
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::String(s) => write!(f, "{}", s),
            VariableValue::Number(n) => write!(f, "{}", n),
            VariableValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::String(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        VariableValue::String(value)
    }
}

impl From<bool> for VariableValue {
    fn from(value: bool) -> Self {
        VariableValue::Bool(value)
    }
}

impl From<i64> for VariableValue {
    fn from(value: i64) -> Self {
        VariableValue::Number(Number::from(value))
    }
}
