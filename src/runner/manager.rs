use std::time::{Duration, Instant};

use crate::assertion::{Assertion, AssertionEngine};
use crate::error::{Result, RucheckError};
use crate::http::{RequestExecutor, Response};
use crate::parser::{ParsedFile, ParsedRequest, TestItem};
use crate::runner::reporter::TestReporter;
use crate::runner::types::{TestResult, TestResultCollector, TestSummary};
use crate::variable::{ResponseProcessor, VariableManager};

/// 运行状态：Idle → Running → Summarized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Summarized,
}

/// 测试编排：按文件顺序执行请求、更新变量、执行断言
pub struct TestManager {
    executor: RequestExecutor,
    processor: ResponseProcessor,
    engine: AssertionEngine,
    reporter: TestReporter,
    state: RunState,
}

impl TestManager {
    pub fn new(executor: RequestExecutor, engine: AssertionEngine, reporter: TestReporter) -> Self {
        Self {
            executor,
            processor: ResponseProcessor::new(),
            engine,
            reporter,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// 执行文件中的全部请求，每个管理器只能运行一次
    pub async fn run(
        &mut self,
        file: &ParsedFile,
        variables: &mut VariableManager,
    ) -> Result<TestSummary> {
        if self.state != RunState::Idle {
            return Err(RucheckError::Other(format!(
                "Test run already started (state: {:?})",
                self.state
            )));
        }
        self.state = RunState::Running;

        let source = file
            .source_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string());
        self.reporter.print_header(&source, file.len());

        let mut collector = TestResultCollector::new();
        for request in &file.requests {
            for result in self.run_request(request, variables).await {
                let result = if request.expect_error {
                    result.expect_error()
                } else {
                    result
                };
                self.reporter.print_result(&result);
                collector.add(result);
            }
        }

        let summary = collector.summarize();
        self.state = RunState::Summarized;
        tracing::info!(
            "Finished: {} passed, {} failed, {} total",
            summary.passed,
            summary.failed,
            summary.total
        );
        self.reporter.print_summary(&summary);

        Ok(summary)
    }

    async fn run_request(
        &self,
        request: &ParsedRequest,
        variables: &mut VariableManager,
    ) -> Vec<TestResult> {
        self.reporter.print_request(request);
        let started = Instant::now();

        let response = match self.send(request, variables).await {
            Ok(response) => response,
            Err(message) => {
                return vec![request_failed(request, None, message, started.elapsed())];
            }
        };

        if let Err(e) =
            self.processor
                .process(&response, &request.variable_updates, variables)
        {
            return vec![request_failed(
                request,
                Some(response.status.code()),
                e.to_string(),
                response.duration,
            )];
        }

        // 没有测试块时，默认检查状态码在 2xx 范围内
        let default_test;
        let tests: &[TestItem] = if request.tests.is_empty() {
            default_test = [TestItem {
                name: request.name.clone(),
                assertions: vec![Assertion::success()],
            }];
            &default_test
        } else {
            &request.tests
        };

        let mut results = Vec::with_capacity(tests.len());
        for test in tests {
            results.push(self.run_test(test, request, &response, variables).await);
        }
        results
    }

    async fn send(
        &self,
        request: &ParsedRequest,
        variables: &VariableManager,
    ) -> std::result::Result<Response, String> {
        let prepared = self
            .executor
            .prepare(request, variables)
            .map_err(|e| e.to_string())?;
        self.reporter.print_payload(&prepared);

        let response = self
            .executor
            .dispatch(prepared)
            .await
            .map_err(|e| e.to_string())?;
        self.reporter.print_response(&response);
        Ok(response)
    }

    /// 第一个失败的断言中止该测试
    async fn run_test(
        &self,
        test: &TestItem,
        request: &ParsedRequest,
        response: &Response,
        variables: &VariableManager,
    ) -> TestResult {
        let status = Some(response.status.code());

        for assertion in &test.assertions {
            if let Err(e) = self
                .engine
                .assert(assertion, response, request, variables)
                .await
            {
                tracing::debug!("Assertion '{}' failed: {}", assertion, e);
                return TestResult::fail(
                    &test.name,
                    &request.name,
                    status,
                    e.to_string(),
                    response.duration,
                );
            }
        }

        TestResult::pass(&test.name, &request.name, status, response.duration)
    }
}

fn request_failed(
    request: &ParsedRequest,
    status: Option<u16>,
    message: String,
    duration: Duration,
) -> TestResult {
    tracing::warn!("Request {} failed: {}", request.name, message);
    TestResult::fail(
        &request.name,
        &request.name,
        status,
        format!("Request failed: {}\n{}", request.name, message),
        duration,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::validator::ValidatorRegistry;
    use std::sync::Arc;

    fn manager() -> TestManager {
        let executor = RequestExecutor::new(&Settings::default()).unwrap();
        let engine = AssertionEngine::new(".", Arc::new(ValidatorRegistry::new()));
        TestManager::new(executor, engine, TestReporter::new(false))
    }

    #[tokio::test]
    async fn test_run_only_once() {
        let mut manager = manager();
        let mut variables = VariableManager::new();
        assert_eq!(manager.state(), RunState::Idle);

        let summary = manager
            .run(&ParsedFile::new(), &mut variables)
            .await
            .unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(manager.state(), RunState::Summarized);

        let err = manager
            .run(&ParsedFile::new(), &mut variables)
            .await
            .unwrap_err();
        assert!(matches!(err, RucheckError::Other(_)));
    }

    #[tokio::test]
    async fn test_invalid_url_yields_synthetic_failure() {
        let mut manager = manager();
        let mut variables = VariableManager::new();
        let mut request = ParsedRequest::new("Broken", 1);
        request.url = "{{missing}}/users".to_string();
        let file = ParsedFile {
            requests: vec![request],
            source_path: None,
        };

        let summary = manager.run(&file, &mut variables).await.unwrap();
        assert_eq!(summary.failed, 1);
        let result = &summary.results[0];
        assert_eq!(result.name, "Broken");
        assert!(
            result
                .error
                .as_deref()
                .unwrap()
                .starts_with("Request failed: Broken\n")
        );
    }
}
