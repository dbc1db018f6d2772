#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use evotest::config::AppConfig;
use evotest::engines::search::FitnessFunction;
use evotest::testcase::{
    CallTarget, ExecutionResult, TestCase, TestCaseExecutor, TestCluster, TypeDesc,
};

pub fn int_ty() -> TypeDesc {
    TypeDesc::new("int")
}

pub fn stack_ty() -> TypeDesc {
    TypeDesc::new("Stack")
}

/// API surface of a small stack module: one constructor plus three
/// operations under test.
pub fn stack_cluster() -> Arc<TestCluster> {
    Arc::new(TestCluster::new(vec![
        CallTarget::function("make_stack", vec![], Some(stack_ty()), false),
        CallTarget::method(stack_ty(), "push", vec![stack_ty(), int_ty()], None, true),
        CallTarget::method(stack_ty(), "pop", vec![stack_ty()], Some(int_ty()), true),
        CallTarget::method(stack_ty(), "clear", vec![stack_ty()], None, true),
    ]))
}

/// Deterministic stack interpreter.
///
/// Walks the sequence, marks every call it reaches with a `reached::` metric,
/// and raises on `pop` when nothing was pushed first, which ends the run the
/// way a real exception would.
pub struct StackExecutor {
    pub executions: usize,
}

impl StackExecutor {
    pub fn new() -> Self {
        Self { executions: 0 }
    }
}

impl TestCaseExecutor for StackExecutor {
    fn execute(&mut self, test: &TestCase) -> ExecutionResult {
        self.executions += 1;
        let mut result = ExecutionResult::new();
        let mut depth = 0usize;
        for (position, statement) in test.statements().iter().enumerate() {
            let target = match statement.call_target() {
                Some(target) => target,
                None => continue,
            };
            result.set_metric(format!("reached::{}", target.name), 1.0);
            match target.name.as_str() {
                "push" => depth += 1,
                "clear" => depth = 0,
                "pop" if depth == 0 => {
                    result.report_new_thrown_exception(position, "pop from empty stack");
                    break;
                }
                "pop" => depth -= 1,
                _ => {}
            }
        }
        result
    }
}

/// Cost-style fitness: the number of operations under test that no result
/// in the batch ever reached. A suite touching push, pop, and clear scores
/// zero.
pub struct UncoveredOperations {
    cluster: Arc<TestCluster>,
}

impl UncoveredOperations {
    pub fn new(cluster: Arc<TestCluster>) -> Self {
        Self { cluster }
    }
}

impl FitnessFunction for UncoveredOperations {
    fn name(&self) -> &str {
        "uncovered_operations"
    }

    fn compute(&self, results: &[Arc<ExecutionResult>]) -> f64 {
        let mut covered = BTreeSet::new();
        for result in results {
            for metric in result.metrics().keys() {
                if let Some(name) = metric.strip_prefix("reached::") {
                    covered.insert(name.to_string());
                }
            }
        }
        self.cluster
            .targets_under_test()
            .filter(|target| !covered.contains(&target.name))
            .count() as f64
    }
}

/// A configuration small enough for fast, reproducible searches.
pub fn small_config(algorithm: &str, seed: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.search.algorithm = algorithm.to_string();
    config.search.population_size = 8;
    config.search.chromosome_length = 10;
    config.search.max_suite_size = 10;
    config.search.min_initial_tests = 1;
    config.search.max_initial_tests = 3;
    config.search.max_iterations = 15;
    config.search.seed = Some(seed);
    config
}
