use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::parser::types::{FormPart, PartKind};
use crate::variable::VariableManager;

/// 从 Content-Type 中提取 boundary 参数
pub fn boundary_of(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("boundary") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn disposition_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)\b(name|filename)\s*=\s*"([^"]*)""#).unwrap())
}

#[derive(Default)]
struct RawPart {
    name: Option<String>,
    filename: Option<String>,
    content_type: Option<String>,
    content: Vec<String>,
    in_content: bool,
}

/// 按 boundary 逐行扫描 multipart 内容
///
/// 部分内容的解释：
/// - `< path`：磁盘文件，相对路径基于请求文件所在目录
/// - 有 `filename` 且内容为空：读取请求文件目录下同名的文件
/// - 有 `filename` 且有内容：内联文件
/// - 其余为文本字段
///
/// 文件路径中未解析的 `{{..}}` 在执行时再替换一次
pub fn parse_parts(
    body: &str,
    boundary: &str,
    base_dir: &Path,
    variables: &VariableManager,
) -> Vec<FormPart> {
    let delimiter = format!("--{}", boundary);
    let terminator = format!("--{}--", boundary);

    let mut raw_parts = Vec::new();
    let mut current: Option<RawPart> = None;

    for line in body.lines() {
        let trimmed = line.trim();

        if trimmed == terminator {
            raw_parts.extend(current.take());
            break;
        }
        if trimmed == delimiter {
            raw_parts.extend(current.take());
            current = Some(RawPart::default());
            continue;
        }

        // 第一个分隔符之前的内容被忽略
        let Some(part) = current.as_mut() else {
            continue;
        };

        if part.in_content {
            part.content.push(line.to_string());
            continue;
        }

        if trimmed.is_empty() {
            part.in_content = true;
            continue;
        }

        if let Some((header, value)) = trimmed.split_once(':') {
            let header = header.trim();
            if header.eq_ignore_ascii_case("content-disposition") {
                for caps in disposition_regex().captures_iter(value) {
                    let field = caps[2].to_string();
                    if caps[1].eq_ignore_ascii_case("name") {
                        part.name = Some(field);
                    } else {
                        part.filename = Some(field);
                    }
                }
            } else if header.eq_ignore_ascii_case("content-type") {
                part.content_type = Some(value.trim().to_string());
            }
        }
    }
    raw_parts.extend(current);

    raw_parts
        .into_iter()
        .filter_map(|raw| build_part(raw, base_dir, variables))
        .collect()
}

fn build_part(raw: RawPart, base_dir: &Path, variables: &VariableManager) -> Option<FormPart> {
    let Some(name) = raw.name else {
        tracing::warn!("Skipping multipart part without a name");
        return None;
    };

    let content = raw.content.join("\n");
    let content = content.trim();

    let kind = if let Some(path) = content.strip_prefix('<') {
        let path = base_dir.join(variables.replace_variables(path.trim()));
        let filename = raw.filename.clone().unwrap_or_else(|| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone())
        });
        PartKind::File {
            path,
            filename,
            content_type: raw.content_type,
        }
    } else if let Some(filename) = raw.filename {
        if content.is_empty() {
            PartKind::File {
                path: base_dir.join(&filename),
                filename,
                content_type: raw.content_type,
            }
        } else {
            PartKind::Inline {
                filename,
                content_type: raw.content_type,
                data: content.as_bytes().to_vec(),
            }
        }
    } else {
        PartKind::Text {
            value: variables.replace_variables(content),
        }
    };

    tracing::debug!("Parsed multipart part: {}", name);
    Some(FormPart { name, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const BODY: &str = "--XYZ
Content-Disposition: form-data; name=\"title\"

Hello {{who}}
--XYZ
Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\"
Content-Type: text/plain

< ./files/a.txt
--XYZ
Content-Disposition: form-data; name=\"inline\"; filename=\"b.txt\"

inline content
--XYZ
Content-Disposition: form-data; filename=\"orphan.txt\"

x
--XYZ--";

    #[test]
    fn test_boundary_of() {
        assert_eq!(
            boundary_of("multipart/form-data; boundary=XYZ"),
            Some("XYZ".to_string())
        );
        assert_eq!(
            boundary_of("multipart/form-data; charset=utf-8; Boundary=\"a b\""),
            Some("a b".to_string())
        );
        assert_eq!(boundary_of("multipart/form-data"), None);
        assert_eq!(boundary_of("multipart/form-data; boundary="), None);
    }

    #[test]
    fn test_parse_parts() {
        let mut vars = VariableManager::new();
        vars.set_variable("who", "world");
        let parts = parse_parts(BODY, "XYZ", Path::new("/base"), &vars);

        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[0],
            FormPart {
                name: "title".to_string(),
                kind: PartKind::Text {
                    value: "Hello world".to_string()
                }
            }
        );
        assert_eq!(
            parts[1].kind,
            PartKind::File {
                path: PathBuf::from("/base/./files/a.txt"),
                filename: "a.txt".to_string(),
                content_type: Some("text/plain".to_string()),
            }
        );
        assert_eq!(
            parts[2].kind,
            PartKind::Inline {
                filename: "b.txt".to_string(),
                content_type: None,
                data: b"inline content".to_vec(),
            }
        );
    }

    #[test]
    fn test_filename_without_content_is_file() {
        let body = "--B\nContent-Disposition: form-data; name=\"doc\"; filename=\"doc.pdf\"\n\n--B--";
        let parts = parse_parts(body, "B", Path::new("dir"), &VariableManager::new());
        assert_eq!(
            parts[0].kind,
            PartKind::File {
                path: PathBuf::from("dir/doc.pdf"),
                filename: "doc.pdf".to_string(),
                content_type: None,
            }
        );
    }

    #[test]
    fn test_multiline_text_part_and_crlf() {
        let body = "--B\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nline one\r\nline two\r\n--B--\r\n";
        let parts = parse_parts(body, "B", Path::new("."), &VariableManager::new());
        assert_eq!(
            parts[0].kind,
            PartKind::Text {
                value: "line one\nline two".to_string()
            }
        );
    }
}
