use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 支持通过 RUST_LOG 环境变量控制日志级别
/// 默认级别: rucheck=info，verbose 模式下为 rucheck=debug
///
/// 日志写到 stderr，stdout 只保留测试报告
///
/// 示例:
/// - RUST_LOG=debug rucheck api.http
/// - RUST_LOG=rucheck::parser=trace rucheck api.http
pub fn init_logger(verbose: bool) {
    let default_level = if verbose { "rucheck=debug" } else { "rucheck=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    tracing::debug!("Logger initialized");
}
