use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::http::types::{Method, RequestError};
use crate::parser::FormPart;

/// 待发送的请求体
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    Empty,
    Text(String),
    /// 发送时按 application/x-www-form-urlencoded 编码
    Form(Vec<(String, String)>),
    /// 发送时构建 multipart 表单，boundary 由生成的表单决定
    Multipart(Vec<FormPart>),
}

/// 完成变量替换、校验后的请求
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: url::Url,
    pub headers: HeaderMap,
    pub body: Payload,
}

impl Request {
    /// 创建请求，只接受 http/https URL
    pub fn new(method: Method, url: &str) -> Result<Self, RequestError> {
        let url = url.trim();
        let parsed = url::Url::parse(url).map_err(|e| RequestError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RequestError::InvalidUrl {
                url: url.to_string(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(RequestError::InvalidUrl {
                url: url.to_string(),
                message: "missing host".to_string(),
            });
        }

        Ok(Self {
            method,
            url: parsed,
            headers: HeaderMap::new(),
            body: Payload::Empty,
        })
    }

    /// 添加 Header，同名 Header 被覆盖
    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self, RequestError> {
        let name: HeaderName = key.parse().map_err(|_| RequestError::InvalidHeader {
            name: key.to_string(),
            message: "invalid header name".to_string(),
        })?;
        let value: HeaderValue = value.parse().map_err(|_| RequestError::InvalidHeader {
            name: key.to_string(),
            message: format!("invalid header value '{}'", value),
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn with_body(mut self, body: Payload) -> Self {
        self.body = body;
        self
    }

    /// 服务器源地址，例如 http://localhost:8080/
    pub fn origin(&self) -> String {
        let mut origin = self.url.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        origin.to_string()
    }
}
