use crate::http::types::Status;
use reqwest::header::HeaderMap;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::time::Duration;

/// 规范化后的响应，下游只读
#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,
    /// Header 名称统一为小写，多值以 ", " 连接
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub duration: Duration,
}

impl Response {
    pub fn new(
        status: u16,
        headers: BTreeMap<String, String>,
        body: String,
        duration: Duration,
    ) -> Self {
        let headers = headers
            .into_iter()
            .map(|(key, value)| (key.to_ascii_lowercase(), value))
            .collect();
        Self {
            status: Status::new(status),
            headers,
            body,
            duration,
        }
    }

    /// 将 reqwest 的 HeaderMap 转换为有序的小写映射
    pub fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
        let mut collected: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in headers {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            collected
                .entry(name.as_str().to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        collected
    }

    /// 获取 Header（名称大小写不敏感）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// 将 Body 解析为 JSON
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// 传给自定义校验器的响应视图
    ///
    /// `data` 为解析后的 JSON Body，无法解析时为 null
    pub fn to_validator_json(&self) -> Value {
        json!({
            "status": self.status.code(),
            "headers": self.headers,
            "body": self.body,
            "data": self.json().unwrap_or(Value::Null),
        })
    }
}
