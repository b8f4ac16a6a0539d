use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
}

/// 运行参数（来自 rucheck.toml，可被 CLI 覆盖）
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 单个请求的超时时间
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,

    /// 发送请求前是否先探测服务器可达性
    pub probe: bool,

    /// 可达性探测的超时时间（应短于 timeout）
    #[serde(deserialize_with = "deserialize_duration")]
    pub probe_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            probe: true,
            probe_timeout: Duration::from_secs(1),
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}

/// 解析时间字符串（支持 "5s", "1000ms", "2m"）
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    let invalid = || ConfigError::InvalidDuration(s.to_string());

    if let Some(ms) = s.strip_suffix("ms") {
        let millis: u64 = ms.trim().parse().map_err(|_| invalid())?;
        Ok(Duration::from_millis(millis))
    } else if let Some(sec) = s.strip_suffix('s') {
        let secs: u64 = sec.trim().parse().map_err(|_| invalid())?;
        Ok(Duration::from_secs(secs))
    } else if let Some(min) = s.strip_suffix('m') {
        let mins: u64 = min.trim().parse().map_err(|_| invalid())?;
        let secs = mins.checked_mul(60).ok_or_else(invalid)?;
        Ok(Duration::from_secs(secs))
    } else {
        Err(invalid())
    }
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    pub const CONFIG_FILE: &'static str = "rucheck.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Settings, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/rucheck/
    pub fn find_and_load() -> Option<Settings> {
        if let Some(settings) = Self::try_load_from_current_dir() {
            return Some(settings);
        }

        Self::try_load_from_user_dir()
    }

    fn try_load_from_current_dir() -> Option<Settings> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Self::load_logged(&config_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    fn try_load_from_user_dir() -> Option<Settings> {
        let home = dirs::home_dir()?;
        let config_path = home.join(".config").join("rucheck").join(Self::CONFIG_FILE);

        if config_path.exists() {
            Self::load_logged(&config_path)
        } else {
            None
        }
    }

    // 自动发现的配置文件解析失败时只告警，不中止运行
    fn load_logged(path: &Path) -> Option<Settings> {
        match Self::load_from_path(path) {
            Ok(settings) => {
                tracing::debug!("Loaded settings from {}", path.display());
                Some(settings)
            }
            Err(e) => {
                tracing::warn!("Ignoring config file: {}", e);
                None
            }
        }
    }
}
