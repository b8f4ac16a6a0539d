use crate::variable::types::VariableValue;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// 变量替换器
pub struct VariableResolver;

impl VariableResolver {
    fn placeholder_regex() -> &'static Regex {
        static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
        VAR_REGEX.get_or_init(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").unwrap())
    }

    /// 替换文本中的所有 {{variable}} 占位符
    ///
    /// 未定义的变量保持原样，由后续的请求或断言暴露问题
    pub fn substitute(text: &str, variables: &HashMap<String, VariableValue>) -> String {
        Self::placeholder_regex()
            .replace_all(text, |caps: &Captures| {
                let var_name = &caps[1];
                match variables.get(var_name) {
                    Some(value) => {
                        tracing::trace!("Replacing variable: {{{{{}}}}} with {}", var_name, value);
                        value.to_string()
                    }
                    None => caps[0].to_string(),
                }
            })
            .to_string()
    }

    /// 如果文本恰好是一个占位符，返回变量名
    pub fn single_placeholder(text: &str) -> Option<&str> {
        let caps = Self::placeholder_regex().captures(text)?;
        let whole = caps.get(0)?;
        if whole.start() == 0 && whole.end() == text.len() {
            caps.get(1).map(|m| m.as_str())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, VariableValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), VariableValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_substitute_simple() {
        let ctx = vars(&[("base_url", "http://localhost:8080")]);
        let output = VariableResolver::substitute("{{base_url}}/api/users", &ctx);
        assert_eq!(output, "http://localhost:8080/api/users");
    }

    #[test]
    fn test_substitute_multiple() {
        let ctx = vars(&[("host", "example.com"), ("port", "8080"), ("path", "api")]);
        let output = VariableResolver::substitute("https://{{host}}:{{port}}/{{path}}/users", &ctx);
        assert_eq!(output, "https://example.com:8080/api/users");
    }

    #[test]
    fn test_substitute_with_spaces() {
        let ctx = vars(&[("token", "abc")]);
        let output = VariableResolver::substitute("Bearer {{ token }}", &ctx);
        assert_eq!(output, "Bearer abc");
    }

    #[test]
    fn test_substitute_missing_variable() {
        let ctx = HashMap::new();
        // 未找到的变量保持原样
        assert_eq!(VariableResolver::substitute("{{missing}}/path", &ctx), "{{missing}}/path");
        assert_eq!(VariableResolver::substitute("{{ missing }}", &ctx), "{{ missing }}");
    }

    #[test]
    fn test_substitute_typed_values() {
        let mut ctx = HashMap::new();
        ctx.insert("id".to_string(), VariableValue::from(42));
        ctx.insert("active".to_string(), VariableValue::Bool(true));
        let output = VariableResolver::substitute("/users/{{id}}?active={{active}}", &ctx);
        assert_eq!(output, "/users/42?active=true");
    }

    #[test]
    fn test_single_placeholder() {
        assert_eq!(VariableResolver::single_placeholder("{{token}}"), Some("token"));
        assert_eq!(VariableResolver::single_placeholder("{{ token }}"), Some("token"));
        assert_eq!(VariableResolver::single_placeholder("Bearer {{token}}"), None);
        assert_eq!(VariableResolver::single_placeholder("token"), None);
    }
}
