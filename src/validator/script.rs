use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::http::Response;
use crate::validator::{CustomValidator, ValidatorContext, ValidatorError};

/// node 下的加载器：脚本导出 `(response, context) => void`，抛出异常即校验失败
const NODE_HARNESS: &str = r#"
const { pathToFileURL } = require('url');
const [script, response, context] = process.argv.slice(1);
(async () => {
  const loaded = script.endsWith('.mjs')
    ? await import(pathToFileURL(script).href)
    : require(script);
  const validate = typeof loaded === 'function' ? loaded : loaded && loaded.default;
  if (typeof validate !== 'function') {
    throw new Error('Custom validator must export a function');
  }
  await validate(JSON.parse(response), JSON.parse(context));
})().catch((err) => {
  process.stderr.write(String(err && err.message !== undefined ? err.message : err));
  process.exit(1);
});
"#;

/// 外部脚本校验器
///
/// 参数依次为响应 JSON 和上下文 JSON，退出码非 0 视为校验失败。
/// JavaScript 脚本需导出校验函数，由内置的 node 加载器调用
pub struct ScriptValidator {
    path: PathBuf,
    timeout: Duration,
}

impl ScriptValidator {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 按扩展名选择解释器，未知扩展名直接执行
    fn command(script: &Path) -> Command {
        let extension = script
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("js" | "cjs" | "mjs") => {
                let mut command = Command::new("node");
                command.arg("-e").arg(NODE_HARNESS).arg(script);
                command
            }
            Some("py") => Self::with_script("python3", script),
            Some("sh") => Self::with_script("sh", script),
            _ => Command::new(script),
        }
    }

    fn with_script(interpreter: &str, script: &Path) -> Command {
        let mut command = Command::new(interpreter);
        command.arg(script);
        command
    }
}

#[async_trait]
impl CustomValidator for ScriptValidator {
    async fn validate(
        &self,
        response: &Response,
        context: &ValidatorContext<'_>,
    ) -> Result<(), ValidatorError> {
        if !self.path.is_file() {
            return Err(ValidatorError::NotFound(self.path.clone()));
        }
        // 子进程的工作目录是脚本所在目录，必须使用绝对路径
        let script = tokio::fs::canonicalize(&self.path)
            .await
            .map_err(|_| ValidatorError::NotFound(self.path.clone()))?;

        let spawn_error = |message: String| ValidatorError::Spawn {
            path: self.path.clone(),
            message,
        };

        let response_json =
            serde_json::to_string(&response.to_validator_json()).map_err(|e| spawn_error(e.to_string()))?;
        let context_json =
            serde_json::to_string(&context.to_json()).map_err(|e| spawn_error(e.to_string()))?;

        let mut command = Self::command(&script);
        command
            .arg(response_json)
            .arg(context_json)
            .env_clear()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = std::env::var_os("PATH") {
            command.env("PATH", path);
        }
        if let Some(dir) = script.parent() {
            command.current_dir(dir);
        }

        tracing::debug!("Running validator script {}", self.path.display());

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ValidatorError::Timeout {
                path: self.path.clone(),
                millis: self.timeout.as_millis(),
            })?
            .map_err(|e| spawn_error(e.to_string()))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let message = [stderr.trim(), stdout.trim()]
            .into_iter()
            .find(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("validator exited with {}", output.status));

        Err(ValidatorError::Failed(message))
    }
}
