/// 断言模块 - 状态码、Header、Body（JSONPath）与自定义校验
mod evaluator;
mod extractor;
mod parser;
mod types;

pub use evaluator::AssertionEngine;
pub use extractor::{adjust_json_path, coerce_expected, deep_equal, select_first};
pub use parser::parse_assertion;
pub use types::{AssertError, Assertion, StatusExpectation, StatusPredicate};
