use crate::config::ConfigError;
use crate::variable::types::VariableValue;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 变量文件加载器（JSON 对象：变量名 → 标量）
pub struct VariablesLoader;

impl VariablesLoader {
    /// 默认变量文件名，与请求文件放在同一目录
    pub const DEFAULT_FILE: &'static str = "variables.json";

    /// 从指定路径加载变量文件
    pub fn load_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<HashMap<String, VariableValue>, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    /// 解析变量文件内容
    pub fn parse(content: &str) -> Result<HashMap<String, VariableValue>, String> {
        let json: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;

        match json {
            Value::Object(map) => Ok(map
                .iter()
                .map(|(key, value)| (key.clone(), VariableValue::from_json(value)))
                .collect()),
            other => Err(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            )),
        }
    }

    /// 请求文件旁的默认变量文件（存在时）
    pub fn default_for(request_file: &Path) -> Option<PathBuf> {
        let dir = request_file.parent().unwrap_or_else(|| Path::new("."));
        let candidate = dir.join(Self::DEFAULT_FILE);
        candidate.is_file().then_some(candidate)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_scalars() {
        let vars =
            VariablesLoader::parse(r#"{"base_url":"http://x","retries":3,"debug":false}"#).unwrap();
        assert_eq!(vars.len(), 3);
        assert_eq!(vars["base_url"], VariableValue::from("http://x"));
        assert_eq!(vars["retries"], VariableValue::from(3));
        assert_eq!(vars["debug"], VariableValue::Bool(false));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = VariablesLoader::parse("[1, 2]").unwrap_err();
        assert!(err.contains("an array"));
        assert!(VariablesLoader::parse("{broken").is_err());
    }

    #[test]
    fn test_default_for() {
        let temp_dir = TempDir::new().unwrap();
        let request_file = temp_dir.path().join("api.http");

        assert!(VariablesLoader::default_for(&request_file).is_none());

        fs::write(temp_dir.path().join("variables.json"), "{}").unwrap();
        assert_eq!(
            VariablesLoader::default_for(&request_file),
            Some(temp_dir.path().join("variables.json"))
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = VariablesLoader::load_from_path("/nonexistent/variables.json");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
