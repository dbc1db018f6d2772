use std::collections::{BTreeMap, HashMap};

use crate::testcase::sequence::TestCase;

/// Outcome of running one candidate test against the subject.
///
/// Exceptions raised by the subject are observations, not engine errors:
/// they flow back into the search as feedback on which statements are worth
/// mutating. The metrics bag carries whatever raw measurements the fitness
/// functions in play want to aggregate, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    exceptions: BTreeMap<usize, String>,
    timeout: bool,
    metrics: HashMap<String, f64>,
}

impl ExecutionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the statement at `position` raised an exception.
    pub fn report_new_thrown_exception(&mut self, position: usize, message: impl Into<String>) {
        self.exceptions.insert(position, message.into());
    }

    pub fn has_test_exceptions(&self) -> bool {
        !self.exceptions.is_empty()
    }

    /// Position of the earliest statement that raised, if any. Statements
    /// after it never ran.
    pub fn first_position_of_thrown_exception(&self) -> Option<usize> {
        self.exceptions.keys().next().copied()
    }

    pub fn exception_at(&self, position: usize) -> Option<&str> {
        self.exceptions.get(&position).map(String::as_str)
    }

    pub fn exceptions(&self) -> &BTreeMap<usize, String> {
        &self.exceptions
    }

    pub fn set_timeout(&mut self, timeout: bool) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> bool {
        self.timeout
    }

    pub fn set_metric(&mut self, name: impl Into<String>, value: f64) {
        self.metrics.insert(name.into(), value);
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    pub fn metrics(&self) -> &HashMap<String, f64> {
        &self.metrics
    }
}

/// Runs candidate tests against the subject.
///
/// Implementations decide what execution means: an in-process interpreter,
/// a subprocess harness, or a scripted stub in tests. The engine only ever
/// talks to this trait.
pub trait TestCaseExecutor {
    fn execute(&mut self, test: &TestCase) -> ExecutionResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_exception_is_earliest_position() {
        let mut result = ExecutionResult::new();
        result.report_new_thrown_exception(4, "ValueError");
        result.report_new_thrown_exception(2, "TypeError");
        assert!(result.has_test_exceptions());
        assert_eq!(result.first_position_of_thrown_exception(), Some(2));
        assert_eq!(result.exception_at(2), Some("TypeError"));
        assert_eq!(result.exception_at(3), None);
        let positions: Vec<usize> = result.exceptions().keys().copied().collect();
        assert_eq!(positions, vec![2, 4]);
    }

    #[test]
    fn test_clean_result_reports_nothing() {
        let result = ExecutionResult::new();
        assert!(!result.has_test_exceptions());
        assert_eq!(result.first_position_of_thrown_exception(), None);
        assert!(!result.timeout());
    }

    #[test]
    fn test_metrics_round_trip() {
        let mut result = ExecutionResult::new();
        result.set_metric("branch_coverage", 0.5);
        assert_eq!(result.metric("branch_coverage"), Some(0.5));
        assert_eq!(result.metric("line_coverage"), None);
    }
}
