use std::time::Duration;

/// 单个测试（TestItem）的执行结果
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    /// 测试名称
    pub name: String,

    /// 所属请求名称
    pub request_name: String,

    /// 是否通过（已考虑 `_expectError` 反转）
    pub passed: bool,

    /// 响应状态码（请求失败时为空）
    pub status_code: Option<u16>,

    /// 失败原因；对于预期失败的请求，保留原始错误
    pub error: Option<String>,

    /// 失败被 `_expectError` 反转为通过
    pub expected_error: bool,

    /// 请求耗时
    pub duration: Duration,
}

impl TestResult {
    pub fn pass(
        name: impl Into<String>,
        request_name: impl Into<String>,
        status_code: Option<u16>,
        duration: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            request_name: request_name.into(),
            passed: true,
            status_code,
            error: None,
            expected_error: false,
            duration,
        }
    }

    pub fn fail(
        name: impl Into<String>,
        request_name: impl Into<String>,
        status_code: Option<u16>,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            request_name: request_name.into(),
            passed: false,
            status_code,
            error: Some(error.into()),
            expected_error: false,
            duration,
        }
    }

    /// 预期失败的请求：失败视为通过，通过保持不变
    pub fn expect_error(mut self) -> Self {
        if !self.passed {
            self.passed = true;
            self.expected_error = true;
        }
        self
    }
}

/// 测试摘要
#[derive(Debug, Clone, Default)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub total_duration: Duration,
    pub results: Vec<TestResult>,
}

impl TestSummary {
    pub fn from_results(results: Vec<TestResult>) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        let total_duration = results.iter().map(|r| r.duration).sum();

        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            total_duration,
            results,
        }
    }

    /// 没有失败的结果即为成功
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

/// 结果收集器
#[derive(Debug, Default)]
pub struct TestResultCollector {
    results: Vec<TestResult>,
}

impl TestResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: TestResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn summarize(self) -> TestSummary {
        TestSummary::from_results(self.results)
    }
}
