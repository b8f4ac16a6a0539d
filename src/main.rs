mod cli;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 初始化日志系统
    rucheck::logger::init_logger(cli.verbose);

    let outcome = cli::run(&cli).await;
    cli::exit_code(outcome)
}
