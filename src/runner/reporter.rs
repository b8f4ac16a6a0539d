use crate::http::{Request, Response};
use crate::parser::ParsedRequest;
use crate::runner::types::{TestResult, TestSummary};
use crate::utils::{PayloadFormat, PayloadFormatter};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

pub struct TestReporter {
    verbose: bool,
    formatter: PayloadFormatter,
    passed: usize,
    failed: usize,
}

impl TestReporter {
    pub fn new(verbose: bool) -> Self {
        let format = if verbose {
            PayloadFormat::Verbose
        } else {
            PayloadFormat::Compact
        };

        Self {
            verbose,
            formatter: PayloadFormatter::new(format),
            passed: 0,
            failed: 0,
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// 打印测试开始
    pub fn print_header(&self, file_path: &str, total: usize) {
        println!(
            "\nRunning {} requests from {}...\n",
            total,
            file_path.bold()
        );
    }

    /// 开始执行一个请求
    pub fn print_request(&self, request: &ParsedRequest) {
        println!(
            "{} {} {}",
            "▶".cyan(),
            request.name.bold(),
            format!("({} {})", request.method, request.url).dimmed()
        );
    }

    /// 变量替换后的完整请求（仅 verbose）
    pub fn print_payload(&self, request: &Request) {
        if !self.verbose {
            return;
        }
        for line in self.formatter.format_request(request).lines() {
            println!("   {}", line);
        }
        println!();
    }

    /// 响应内容（仅 verbose）
    pub fn print_response(&self, response: &Response) {
        if !self.verbose {
            return;
        }
        for line in self.formatter.format_response(response).lines() {
            println!("   {}", line);
        }
        println!();
    }

    /// 打印单个测试结果，并更新运行中的计数
    pub fn print_result(&mut self, result: &TestResult) {
        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }

        let symbol = if result.passed { "✅" } else { "❌" };
        let status = result
            .status_code
            .map(|code| format!(" [{}]", code))
            .unwrap_or_default();
        let note = if result.expected_error {
            " (expected error)".dimmed().to_string()
        } else {
            String::new()
        };

        println!(
            "  {} {}{} ({}ms){}  {}",
            symbol,
            result.name,
            status,
            result.duration.as_millis(),
            note,
            format!("[{}/{}]", self.passed.to_string().green(), self.failed.to_string().red())
                .dimmed()
        );

        if let Some(error) = &result.error {
            // 预期失败的错误只在 verbose 模式显示
            if !result.passed || self.verbose {
                for line in error.lines() {
                    println!("     {}", line.red());
                }
            }
        }
    }

    /// 打印测试摘要
    pub fn print_summary(&self, summary: &TestSummary) {
        println!();
        println!("{}", Self::summary_table(summary));

        let totals = if summary.failed == 0 {
            format!(
                "  {}: {} passed, {} total",
                "Tests".bold(),
                summary.passed.to_string().green(),
                summary.total
            )
        } else {
            format!(
                "  {}: {} passed, {} failed, {} total",
                "Tests".bold(),
                summary.passed.to_string().green(),
                summary.failed.to_string().red(),
                summary.total
            )
        };
        println!("{}", totals);
        println!(
            "  {}: {:.3}s",
            "Duration".bold(),
            summary.total_duration.as_secs_f64()
        );
        println!();
    }

    fn summary_table(summary: &TestSummary) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["Request", "Test", "Status", "Result", "Duration"]);

        for result in &summary.results {
            let (label, color) = match (result.passed, result.expected_error) {
                (true, false) => ("PASS", Color::Green),
                (true, true) => ("PASS (expected error)", Color::Yellow),
                (false, _) => ("FAIL", Color::Red),
            };
            let status = result
                .status_code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "-".to_string());

            table.add_row(vec![
                Cell::new(&result.request_name),
                Cell::new(&result.name).add_attribute(Attribute::Dim),
                Cell::new(status),
                Cell::new(label).fg(color),
                Cell::new(format!("{}ms", result.duration.as_millis())),
            ]);
        }

        table
    }
}

impl Default for TestReporter {
    fn default() -> Self {
        Self::new(false)
    }
}
