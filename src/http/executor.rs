use crate::config::Settings;
use crate::http::client::Client;
use crate::http::request::{Payload, Request};
use crate::http::response::Response;
use crate::http::types::RequestError;
use crate::parser::ParsedRequest;
use crate::parser::converter::to_request;
use crate::variable::VariableManager;

/// 请求执行器：替换变量、校验、探测可达性、发送
pub struct RequestExecutor {
    client: Client,
    probe: bool,
}

impl RequestExecutor {
    pub fn new(settings: &Settings) -> Result<Self, RequestError> {
        Ok(Self {
            client: Client::new(settings)?,
            probe: settings.probe,
        })
    }

    pub fn timeout(&self) -> std::time::Duration {
        self.client.timeout()
    }

    /// 第二遍变量替换并构建请求（URL、Header 在此校验）
    pub fn prepare(
        &self,
        parsed: &ParsedRequest,
        variables: &VariableManager,
    ) -> Result<Request, RequestError> {
        let request = to_request(parsed, variables)?;

        if let Payload::Text(text) = &request.body {
            let is_json = request
                .headers
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));
            if is_json && serde_json::from_str::<serde_json::Value>(text).is_err() {
                tracing::warn!("Body of {} is not valid JSON, sending as-is", parsed.name);
            }
        }

        Ok(request)
    }

    /// 探测可达性后发送，4xx/5xx 也返回 Ok
    pub async fn dispatch(&self, request: Request) -> Result<Response, RequestError> {
        tracing::debug!("{} {}", request.method, request.url);

        if self.probe {
            self.client.probe(&request).await?;
        }

        self.client.send(request).await
    }

    pub async fn execute(
        &self,
        parsed: &ParsedRequest,
        variables: &VariableManager,
    ) -> Result<Response, RequestError> {
        let request = self.prepare(parsed, variables)?;
        self.dispatch(request).await
    }
}
