use crate::http::{Payload, Request, Response};
use crate::parser::PartKind;
use colored::*;

pub enum PayloadFormat {
    Compact,
    Verbose,
}

/// 请求/响应的控制台输出格式化
pub struct PayloadFormatter {
    format: PayloadFormat,
    color: bool,
}

impl PayloadFormatter {
    pub fn new(format: PayloadFormat) -> Self {
        Self {
            format,
            color: true,
        }
    }

    /// 关闭颜色（测试与重定向输出时使用）
    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn format_request(&self, request: &Request) -> String {
        let mut output = vec![self.paint(
            format!("{} {}", request.method, request.url),
            |s| s.cyan().bold(),
        )];

        if let PayloadFormat::Compact = self.format {
            return output.join("\n");
        }

        for (key, value) in request.headers.iter() {
            let value = value.to_str().unwrap_or("<invalid utf-8>");
            output.push(format!("   {}: {}", key, value));
        }

        match &request.body {
            Payload::Empty => {}
            Payload::Text(text) => {
                output.push(String::new());
                output.push(try_format_json(text).unwrap_or_else(|| text.clone()));
            }
            Payload::Form(pairs) => {
                output.push(String::new());
                for (key, value) in pairs {
                    output.push(format!("   {}={}", key, value));
                }
            }
            Payload::Multipart(parts) => {
                output.push(String::new());
                for part in parts {
                    let line = match &part.kind {
                        PartKind::Text { value } => format!("   [{}] {}", part.name, value),
                        PartKind::Inline { filename, data, .. } => {
                            format!("   [{}] {} ({} bytes)", part.name, filename, data.len())
                        }
                        PartKind::File { path, .. } => {
                            format!("   [{}] < {}", part.name, path.display())
                        }
                    };
                    output.push(line);
                }
            }
        }

        output.join("\n")
    }

    pub fn format_response(&self, response: &Response) -> String {
        match self.format {
            PayloadFormat::Compact => self.format_compact(response),
            PayloadFormat::Verbose => self.format_verbose(response),
        }
    }

    fn format_compact(&self, response: &Response) -> String {
        let mut output = vec![self.status_line(response)];
        output.push(self.paint(format!("Time: {}ms", response.duration.as_millis()), |s| {
            s.cyan()
        }));

        let body = &response.body;
        if !body.is_empty() && body.len() < 200 {
            output.push(try_format_json(body).unwrap_or_else(|| body.to_string()));
        } else if !body.is_empty() {
            output.push(format!("Body: {} bytes", body.len()));
        }

        output.join("\n")
    }

    fn format_verbose(&self, response: &Response) -> String {
        let mut output = vec![self.status_line(response)];
        output.push(self.paint(format!("Time: {}ms", response.duration.as_millis()), |s| {
            s.cyan()
        }));

        output.push(String::new());
        output.push(self.paint("Headers:".to_string(), |s| s.blue().bold()));
        for (key, value) in &response.headers {
            output.push(self.paint(format!("   {}: {}", key, value), |s| s.blue()));
        }

        let body = &response.body;
        if !body.is_empty() {
            output.push(String::new());
            output.push(self.paint("Body:".to_string(), |s| s.blue().bold()));
            output.push(try_format_json(body).unwrap_or_else(|| body.to_string()));
        }

        output.join("\n")
    }

    fn status_line(&self, response: &Response) -> String {
        let line = format!("HTTP {}", response.status);
        let status = response.status;
        self.paint(line, |s| {
            if status.is_success() {
                s.green().bold()
            } else if status.is_client_error() {
                s.yellow().bold()
            } else {
                s.red().bold()
            }
        })
    }

    fn paint(&self, text: String, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(&text).to_string()
        } else {
            text
        }
    }
}

/// 尝试将 body 格式化为漂亮的 JSON，不是有效 JSON 时返回 None
fn try_format_json(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    serde_json::to_string_pretty(&value).ok()
}
