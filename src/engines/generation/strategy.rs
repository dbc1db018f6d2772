use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;

use crate::config::{PrimitivesConfig, SearchConfig};
use crate::engines::generation::statistics::{SearchReport, StatisticsSink};
use crate::engines::generation::stopping::StoppingCondition;
use crate::engines::search::operators::{CrossoverFunction, SelectionFunction};
use crate::engines::search::{
    Chromosome, ChromosomeFactory, FitnessFunction, TestCaseChromosome, TestSuiteChromosome,
};
use crate::error::Result;
use crate::testcase::{ExecutionResult, TestCaseExecutor, TestFactory};

/// A complete test-generation algorithm, from initial population to the
/// best suite it could find within its budget.
pub trait TestGenerationStrategy {
    fn generate_tests(&mut self) -> Result<TestSuiteChromosome>;
}

/// Everything a strategy works with, bundled so the strategies themselves
/// stay small. Built by the algorithm factory.
pub struct SearchContext {
    pub search: SearchConfig,
    pub primitives: PrimitivesConfig,
    pub test_factory: Arc<dyn TestFactory>,
    pub test_case_factory: Arc<dyn ChromosomeFactory<TestCaseChromosome>>,
    pub suite_factory: Arc<dyn ChromosomeFactory<TestSuiteChromosome>>,
    pub executor: Box<dyn TestCaseExecutor>,
    pub fitness_functions: Vec<Box<dyn FitnessFunction>>,
    pub selection: Box<dyn SelectionFunction<TestSuiteChromosome>>,
    pub crossover: Box<dyn CrossoverFunction<TestSuiteChromosome>>,
    pub stopping_conditions: Vec<Box<dyn StoppingCondition>>,
    pub statistics: Box<dyn StatisticsSink>,
    pub rng: StdRng,
    pub tests_executed: u64,
}

impl SearchContext {
    /// Runs one test case against the subject and books the execution
    /// against every budget.
    fn execute_test(&mut self, test: &mut TestCaseChromosome) {
        let result = Arc::new(self.executor.execute(test.test_case()));
        test.set_last_execution_result(Arc::clone(&result));
        test.set_changed(false);
        self.tests_executed += 1;
        for condition in &mut self.stopping_conditions {
            condition.after_test_execution();
        }
        self.statistics.on_test_executed();
    }

    /// Fitness of a single test case, executing it only when its outcome is
    /// stale.
    pub fn evaluate_test(&mut self, test: &mut TestCaseChromosome) -> f64 {
        if !test.has_changed() {
            if let Some(fitness) = test.fitness() {
                return fitness;
            }
        }
        if test.has_changed() || test.last_execution_result().is_none() {
            self.execute_test(test);
        }
        let results: Vec<Arc<ExecutionResult>> =
            test.last_execution_result().cloned().into_iter().collect();
        let fitness = self.compute_fitness(&results);
        test.set_fitness(fitness);
        fitness
    }

    /// Fitness of a whole suite. Members are re-executed only when changed;
    /// the aggregate is computed over every member's outcome.
    pub fn evaluate_suite(&mut self, suite: &mut TestSuiteChromosome) -> f64 {
        if !suite.has_changed() {
            if let Some(fitness) = suite.fitness() {
                return fitness;
            }
        }
        for test in suite.tests_mut() {
            if test.has_changed() || test.last_execution_result().is_none() {
                self.execute_test(test);
            }
        }
        let results: Vec<Arc<ExecutionResult>> = suite
            .tests()
            .iter()
            .filter_map(|test| test.last_execution_result().cloned())
            .collect();
        let fitness = self.compute_fitness(&results);
        suite.set_fitness(fitness);
        fitness
    }

    fn compute_fitness(&self, results: &[Arc<ExecutionResult>]) -> f64 {
        self.fitness_functions
            .iter()
            .map(|function| function.compute(results))
            .sum()
    }

    /// Sorts a population best-first, in the direction the selection
    /// function was configured for. Unevaluated chromosomes sort last.
    pub fn sort_population(&self, population: &mut [TestSuiteChromosome]) {
        let maximize = self.selection.maximize();
        let worst = if maximize {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        population.sort_by(|a, b| {
            let fitness_a = a.fitness().unwrap_or(worst);
            let fitness_b = b.fitness().unwrap_or(worst);
            let ordering = if maximize {
                fitness_b.partial_cmp(&fitness_a)
            } else {
                fitness_a.partial_cmp(&fitness_b)
            };
            ordering.unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    pub fn stopping_fulfilled(&self) -> bool {
        self.stopping_conditions
            .iter()
            .any(|condition| condition.is_fulfilled())
    }

    /// Books one finished search iteration against every budget and reports
    /// it.
    pub fn after_iteration(&mut self, iteration: u64, best_fitness: f64, suite_size: usize) {
        for condition in &mut self.stopping_conditions {
            condition.after_search_iteration();
        }
        self.statistics.on_iteration(iteration, best_fitness, suite_size);
    }

    /// Builds the final report and hands it to the statistics sink.
    pub fn report_finished(
        &mut self,
        algorithm: &str,
        started_at: DateTime<Utc>,
        iterations: u64,
        best: &TestSuiteChromosome,
    ) -> SearchReport {
        let report = SearchReport {
            algorithm: algorithm.to_string(),
            started_at,
            finished_at: Utc::now(),
            iterations,
            tests_executed: self.tests_executed,
            best_fitness: best.fitness(),
            suite_size: best.size(),
            suite_total_length: best.total_length(),
        };
        self.statistics.on_search_finished(&report);
        report
    }
}
