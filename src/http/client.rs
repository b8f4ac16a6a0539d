use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};

use crate::config::Settings;
use crate::http::request::{Payload, Request};
use crate::http::response::Response;
use crate::http::types::RequestError;
use crate::parser::{FormPart, PartKind};

/// reqwest 客户端封装
#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
    timeout: Duration,
    probe_timeout: Duration,
}

impl Client {
    pub fn new(settings: &Settings) -> Result<Self, RequestError> {
        let inner = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| RequestError::Client(e.to_string()))?;

        Ok(Self {
            inner,
            timeout: settings.timeout,
            probe_timeout: settings.probe_timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 可达性探测：向源地址发送 HEAD
    ///
    /// 只要收到任意 HTTP 响应即视为可达
    pub async fn probe(&self, request: &Request) -> Result<(), RequestError> {
        let origin = request.origin();
        tracing::debug!("Probing {}", origin);

        match self
            .inner
            .head(origin.as_str())
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => {
                tracing::debug!("Probe answered with {}", response.status());
                Ok(())
            }
            Err(e) => Err(RequestError::Unreachable {
                origin,
                message: describe(&e),
            }),
        }
    }

    /// 发送请求；任何 HTTP 响应（包括 4xx/5xx）都是 Ok
    pub async fn send(&self, request: Request) -> Result<Response, RequestError> {
        let url = request.url.to_string();
        let has_content_type = request.headers.contains_key(CONTENT_TYPE);
        let mut builder = self
            .inner
            .request(request.method.into(), request.url)
            .headers(request.headers);

        builder = match request.body {
            Payload::Empty => builder,
            Payload::Text(text) => builder.body(text),
            Payload::Form(pairs) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs.iter())
                    .finish();
                if !has_content_type {
                    builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
                }
                builder.body(encoded)
            }
            Payload::Multipart(parts) => builder.multipart(build_form(parts).await?),
        };

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| self.map_error(&url, e))?;

        let status = response.status().as_u16();
        let headers = Response::collect_headers(response.headers());
        let body = response.text().await.map_err(|e| self.map_error(&url, e))?;
        let duration = start.elapsed();

        tracing::debug!("{} answered {} in {}ms", url, status, duration.as_millis());
        Ok(Response::new(status, headers, body, duration))
    }

    fn map_error(&self, url: &str, error: reqwest::Error) -> RequestError {
        if error.is_timeout() {
            RequestError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            RequestError::Network(describe(&error))
        }
    }
}

// reqwest 的顶层错误信息很笼统，把底层原因一并带上
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// 由解析出的各部分构建 multipart 表单
async fn build_form(parts: Vec<FormPart>) -> Result<Form, RequestError> {
    let mut form = Form::new();

    for part in parts {
        let built = match part.kind {
            PartKind::Text { value } => Part::text(value),
            PartKind::Inline {
                filename,
                content_type,
                data,
            } => {
                let mime = content_type.unwrap_or_else(|| {
                    mime_guess::from_path(&filename)
                        .first_or_octet_stream()
                        .to_string()
                });
                with_mime(Part::bytes(data).file_name(filename), &mime)?
            }
            PartKind::File {
                path,
                filename,
                content_type,
            } => {
                let file = tokio::fs::File::open(&path).await.map_err(|e| {
                    RequestError::Body(format!("{}: {}", path.display(), e))
                })?;
                let length = file
                    .metadata()
                    .await
                    .map_err(|e| RequestError::Body(format!("{}: {}", path.display(), e)))?
                    .len();
                let mime = content_type.unwrap_or_else(|| {
                    mime_guess::from_path(&path)
                        .first_or_octet_stream()
                        .to_string()
                });
                let streamed =
                    Part::stream_with_length(reqwest::Body::from(file), length).file_name(filename);
                with_mime(streamed, &mime)?
            }
        };
        form = form.part(part.name, built);
    }

    Ok(form)
}

fn with_mime(part: Part, mime: &str) -> Result<Part, RequestError> {
    part.mime_str(mime)
        .map_err(|e| RequestError::Body(format!("Invalid MIME type '{}': {}", mime, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_build_form_missing_file() {
        let parts = vec![FormPart {
            name: "upload".to_string(),
            kind: PartKind::File {
                path: PathBuf::from("/nonexistent/file.bin"),
                filename: "file.bin".to_string(),
                content_type: None,
            },
        }];
        let result = build_form(parts).await;
        assert!(matches!(result, Err(RequestError::Body(_))));
    }

    #[tokio::test]
    async fn test_build_form_text_and_inline() {
        let parts = vec![
            FormPart {
                name: "title".to_string(),
                kind: PartKind::Text {
                    value: "hello".to_string(),
                },
            },
            FormPart {
                name: "file".to_string(),
                kind: PartKind::Inline {
                    filename: "a.txt".to_string(),
                    content_type: Some("text/plain".to_string()),
                    data: b"content".to_vec(),
                },
            },
        ];
        let form = build_form(parts).await.unwrap();
        assert!(!form.boundary().is_empty());
    }

    #[tokio::test]
    async fn test_build_form_rejects_bad_mime() {
        let parts = vec![FormPart {
            name: "file".to_string(),
            kind: PartKind::Inline {
                filename: "a.txt".to_string(),
                content_type: Some("not a mime".to_string()),
                data: Vec::new(),
            },
        }];
        assert!(matches!(build_form(parts).await, Err(RequestError::Body(_))));
    }
}
