use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use rucheck::config::parse_duration;
use rucheck::{RunOptions, TestSummary};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run the requests and tests in an .http file", long_about = None)]
pub struct Cli {
    /// 请求文件（.http）
    pub file: PathBuf,

    /// 输出每一行的处理过程、每个断言以及完整的请求/响应
    #[arg(short, long)]
    pub verbose: bool,

    /// 变量文件（JSON 对象），默认使用请求文件旁的 variables.json
    #[arg(long = "var", value_name = "FILE")]
    pub variables: Option<PathBuf>,

    /// 配置文件，默认查找 rucheck.toml
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 单个请求的超时时间，例如 5s、500ms
    #[arg(long, value_name = "DURATION", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// 不在发送前探测服务器可达性
    #[arg(long)]
    pub no_probe: bool,
}

fn parse_timeout(raw: &str) -> std::result::Result<Duration, String> {
    parse_duration(raw).map_err(|e| e.to_string())
}

impl Cli {
    pub fn options(&self) -> RunOptions {
        RunOptions {
            verbose: self.verbose,
            variables_file: self.variables.clone(),
            config_file: self.config.clone(),
            timeout: self.timeout,
            probe: self.no_probe.then_some(false),
            ..Default::default()
        }
    }
}

pub type Result<T> = std::result::Result<T, anyhow::Error>;

pub async fn run(cli: &Cli) -> Result<TestSummary> {
    rucheck::run_file(&cli.file, &cli.options())
        .await
        .with_context(|| format!("Failed to run {}", cli.file.display()))
}

/// 退出码：0 全部通过，1 有失败，2 致命错误
pub fn exit_code(outcome: Result<TestSummary>) -> ExitCode {
    ExitCode::from(exit_status(&outcome))
}

fn exit_status(outcome: &Result<TestSummary>) -> u8 {
    match outcome {
        Ok(summary) if summary.is_success() => 0,
        Ok(summary) => {
            println!("{}", format!("{} test(s) failed.", summary.failed).red());
            1
        }
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            2
        }
    }
}
