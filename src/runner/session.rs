use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::assertion::AssertionEngine;
use crate::config::{ConfigLoader, Settings};
use crate::error::Result;
use crate::http::RequestExecutor;
use crate::parser;
use crate::runner::manager::TestManager;
use crate::runner::reporter::TestReporter;
use crate::runner::types::TestSummary;
use crate::validator::ValidatorRegistry;
use crate::variable::{VariableManager, VariablesLoader};

/// 一次运行的参数（CLI 参数覆盖配置文件）
#[derive(Clone, Default)]
pub struct RunOptions {
    pub verbose: bool,

    /// 变量文件；为空时尝试请求文件旁的 variables.json
    pub variables_file: Option<PathBuf>,

    /// 配置文件；为空时自动查找 rucheck.toml
    pub config_file: Option<PathBuf>,

    pub timeout: Option<Duration>,

    /// `Some(false)` 关闭可达性探测
    pub probe: Option<bool>,

    /// 进程内注册的自定义校验器
    pub validators: ValidatorRegistry,
}

impl RunOptions {
    /// 合并配置文件与命令行覆盖
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config_file {
            Some(path) => ConfigLoader::load_from_path(path)?,
            None => ConfigLoader::find_and_load().unwrap_or_default(),
        };

        if let Some(timeout) = self.timeout {
            settings.timeout = timeout;
        }
        if let Some(probe) = self.probe {
            settings.probe = probe;
        }

        tracing::debug!("Effective settings: {:?}", settings);
        Ok(settings)
    }
}

/// 加载变量文件（在解析之前，使其优先于文件内的默认声明）
pub fn load_variables(request_file: &Path, options: &RunOptions) -> Result<VariableManager> {
    let mut variables = VariableManager::new();

    let path = match &options.variables_file {
        Some(path) => Some(path.clone()),
        None => VariablesLoader::default_for(request_file),
    };

    if let Some(path) = path {
        let loaded = VariablesLoader::load_from_path(&path)?;
        tracing::info!("Loaded {} variable(s) from {}", loaded.len(), path.display());
        variables.set_variables(loaded);
    }

    Ok(variables)
}

/// 运行一个请求文件
pub async fn run_file<P: AsRef<Path>>(path: P, options: &RunOptions) -> Result<TestSummary> {
    let path = path.as_ref();
    let settings = options.settings()?;
    let mut variables = load_variables(path, options)?;

    let file = parser::parse_file(path, &mut variables)?;
    tracing::info!("Parsed {} request(s) from {}", file.len(), path.display());

    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let executor = RequestExecutor::new(&settings)?;
    let engine = AssertionEngine::new(base_dir, Arc::new(options.validators.clone()))
        .with_timeout(settings.timeout);
    let mut manager = TestManager::new(executor, engine, TestReporter::new(options.verbose));

    manager.run(&file, &mut variables).await
}
