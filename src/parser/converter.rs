use std::path::{Path, PathBuf};

use crate::http::request::{Payload, Request};
use crate::http::RequestError;
use crate::parser::types::{FormPart, ParsedRequest, PartKind, RequestBody};
use crate::variable::VariableManager;

/// 将 ParsedRequest 转换为可执行的 Request
///
/// 这是第二次变量替换：此前请求写入的变量只在这里可见
pub fn to_request(
    parsed: &ParsedRequest,
    variables: &VariableManager,
) -> Result<Request, RequestError> {
    // 1. URL
    let url = variables.replace_variables(&parsed.url);
    let mut request = Request::new(parsed.method, &url)?;

    // 2. Headers（multipart 的 Content-Type 由生成的表单决定）
    let is_multipart = matches!(parsed.body, RequestBody::Multipart(_));
    for (key, value) in &parsed.headers {
        if is_multipart && key.eq_ignore_ascii_case("content-type") {
            tracing::debug!("Dropping literal multipart Content-Type: {}", value);
            continue;
        }
        request = request.with_header(key, &variables.replace_variables(value))?;
    }

    // 3. Body
    let body = match &parsed.body {
        RequestBody::None => Payload::Empty,
        RequestBody::Text(text) => Payload::Text(variables.replace_variables(text)),
        RequestBody::Form(pairs) => Payload::Form(
            pairs
                .iter()
                .map(|(key, value)| {
                    (
                        variables.replace_variables(key),
                        variables.replace_variables(value),
                    )
                })
                .collect(),
        ),
        RequestBody::Multipart(parts) => Payload::Multipart(
            parts
                .iter()
                .map(|part| substitute_part(part, variables))
                .collect(),
        ),
    };

    Ok(request.with_body(body))
}

fn substitute_part(part: &FormPart, variables: &VariableManager) -> FormPart {
    match &part.kind {
        PartKind::Text { value } => FormPart {
            name: part.name.clone(),
            kind: PartKind::Text {
                value: variables.replace_variables(value),
            },
        },
        PartKind::File {
            path,
            filename,
            content_type,
        } => FormPart {
            name: part.name.clone(),
            kind: PartKind::File {
                path: substitute_path(path, variables),
                filename: variables.replace_variables(filename),
                content_type: content_type.clone(),
            },
        },
        PartKind::Inline { .. } => part.clone(),
    }
}

fn substitute_path(path: &Path, variables: &VariableManager) -> PathBuf {
    match path.to_str() {
        Some(raw) if raw.contains("{{") => PathBuf::from(variables.replace_variables(raw)),
        _ => path.to_path_buf(),
    }
}
