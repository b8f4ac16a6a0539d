use std::path::Path;

use crate::parser::multipart::{boundary_of, parse_parts};
use crate::parser::types::RequestBody;
use crate::variable::VariableManager;

/// 解释请求体时可用的上下文
pub struct BodyContext<'a> {
    pub content_type: &'a str,
    pub base_dir: &'a Path,
    pub variables: &'a VariableManager,
}

/// 按 Content-Type 选择的请求体解释策略
pub trait BodyStrategy: Sync {
    fn name(&self) -> &'static str;

    /// 将清理后的原始文本解释为请求体
    fn interpret(&self, raw: &str, ctx: &BodyContext<'_>) -> RequestBody;
}

/// application/json：替换变量后保留文本，由执行器校验
pub struct JsonBody;

/// multipart/form-data：逐行扫描各部分
pub struct MultipartBody;

/// application/x-www-form-urlencoded：按行拼接后解码为键值对
pub struct UrlEncodedBody;

/// application/xml、text/xml
pub struct XmlBody;

/// 其它类型：替换变量后原样发送
pub struct PlainTextBody;

impl BodyStrategy for JsonBody {
    fn name(&self) -> &'static str {
        "json"
    }

    fn interpret(&self, raw: &str, ctx: &BodyContext<'_>) -> RequestBody {
        RequestBody::Text(ctx.variables.replace_variables(raw))
    }
}

impl BodyStrategy for MultipartBody {
    fn name(&self) -> &'static str {
        "multipart"
    }

    fn interpret(&self, raw: &str, ctx: &BodyContext<'_>) -> RequestBody {
        match boundary_of(ctx.content_type) {
            Some(boundary) => RequestBody::Multipart(parse_parts(
                raw,
                &boundary,
                ctx.base_dir,
                ctx.variables,
            )),
            None => {
                tracing::warn!("multipart/form-data without boundary, sending body as text");
                PlainTextBody.interpret(raw, ctx)
            }
        }
    }
}

impl BodyStrategy for UrlEncodedBody {
    fn name(&self) -> &'static str {
        "urlencoded"
    }

    fn interpret(&self, raw: &str, ctx: &BodyContext<'_>) -> RequestBody {
        let joined = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("&");
        let substituted = ctx.variables.replace_variables(&joined);
        let pairs = url::form_urlencoded::parse(substituted.as_bytes())
            .into_owned()
            .collect();
        RequestBody::Form(pairs)
    }
}

impl BodyStrategy for XmlBody {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn interpret(&self, raw: &str, ctx: &BodyContext<'_>) -> RequestBody {
        RequestBody::Text(ctx.variables.replace_variables(raw))
    }
}

impl BodyStrategy for PlainTextBody {
    fn name(&self) -> &'static str {
        "text"
    }

    fn interpret(&self, raw: &str, ctx: &BodyContext<'_>) -> RequestBody {
        RequestBody::Text(ctx.variables.replace_variables(raw))
    }
}

/// 按 Content-Type 选择策略（缺省为纯文本）
pub fn strategy_for(content_type: Option<&str>) -> &'static dyn BodyStrategy {
    let media_type = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match media_type.as_str() {
        "application/json" => &JsonBody,
        "multipart/form-data" => &MultipartBody,
        "application/x-www-form-urlencoded" => &UrlEncodedBody,
        "application/xml" | "text/xml" => &XmlBody,
        _ if media_type.ends_with("+json") => &JsonBody,
        _ => &PlainTextBody,
    }
}

/// 清理请求体：去掉引号外的 `#` 注释，再整体 trim
pub fn clean_body(raw: &str) -> String {
    raw.lines()
        .map(|line| match comment_start(line) {
            Some(index) => line[..index].trim_end(),
            None => line.trim_end(),
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// 第一个不在双引号内的 `#` 的位置（`\"` 不切换引号状态）
fn comment_start(line: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut previous = None;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' if previous != Some('\\') => in_quotes = !in_quotes,
            '#' if !in_quotes => return Some(index),
            _ => {}
        }
        previous = Some(ch);
    }
    None
}
