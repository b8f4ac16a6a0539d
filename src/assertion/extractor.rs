use crate::assertion::types::AssertError;
use crate::variable::types::parse_number;
use serde_json::Value;

/// 根节点调整：`$[<index>]rest` 在根不是数组时改写为 `$rest`
///
/// 尽力而为，只处理数字下标
pub fn adjust_json_path(path: &str, root: &Value) -> String {
    if root.is_array() {
        return path.to_string();
    }

    let Some(rest) = path.strip_prefix("$[") else {
        return path.to_string();
    };
    let Some((index, tail)) = rest.split_once(']') else {
        return path.to_string();
    };

    if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
        let adjusted = format!("${}", tail);
        tracing::debug!("Adjusted JSONPath {} -> {}", path, adjusted);
        adjusted
    } else {
        path.to_string()
    }
}

/// 执行 JSONPath，返回第一个匹配
pub fn select_first(root: &Value, path: &str) -> Result<Value, AssertError> {
    let matches = jsonpath_lib::select(root, path).map_err(|e| AssertError::InvalidPath {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    matches
        .first()
        .map(|value| (*value).clone())
        .ok_or_else(|| AssertError::PathNotFound(path.to_string()))
}

/// 将断言中的期望值文本转换为 JSON 值
///
/// `null`、JSON 数组/对象、布尔（大小写不敏感）、`"引号字符串"`、数字，其余为字符串
pub fn coerce_expected(raw: &str) -> Value {
    let raw = raw.trim();

    if raw == "null" {
        return Value::Null;
    }

    if raw.starts_with('[') || raw.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<Value>(raw) {
            return value;
        }
    }

    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Value::String(raw[1..raw.len() - 1].to_string());
    }

    match parse_number(raw) {
        Some(number) => Value::Number(number),
        None => Value::String(raw.to_string()),
    }
}

/// 深度比较：数组按长度和逐项，对象按键集合和逐项，数字按数值
pub fn deep_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| deep_equal(x, y)))
        }
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        },
        _ => actual == expected,
    }
}
