use std::sync::Arc;

use chrono::Utc;

use crate::engines::generation::strategies::is_improvement;
use crate::engines::generation::strategy::{SearchContext, TestGenerationStrategy};
use crate::engines::search::{Chromosome, TestSuiteChromosome};
use crate::error::Result;

/// Incremental random testing: one fresh random test case per iteration.
///
/// Cases that raise an exception are collected separately, since they point
/// at defects regardless of what they cover. Passing cases join the suite
/// only when they improve the aggregate fitness, which keeps the suite from
/// silting up with redundant tests. Timed-out cases are discarded outright.
/// The returned suite contains both kinds of kept case.
pub struct RandomTestingStrategy {
    context: SearchContext,
}

impl RandomTestingStrategy {
    pub fn new(context: SearchContext) -> Self {
        Self { context }
    }
}

impl TestGenerationStrategy for RandomTestingStrategy {
    fn generate_tests(&mut self) -> Result<TestSuiteChromosome> {
        let started_at = Utc::now();
        self.context.statistics.on_search_started("random_testing");
        let maximize = self.context.selection.maximize();

        let mut passing = TestSuiteChromosome::new(Arc::clone(&self.context.test_case_factory));
        let mut failing = TestSuiteChromosome::new(Arc::clone(&self.context.test_case_factory));
        let mut best_fitness = self.context.evaluate_suite(&mut passing);

        let mut iteration = 0u64;
        while !self.context.stopping_fulfilled() {
            let mut test = self
                .context
                .test_case_factory
                .get_chromosome(&mut self.context.rng);
            self.context.evaluate_test(&mut test);

            let timed_out = test
                .last_execution_result()
                .is_some_and(|result| result.timeout());
            if timed_out {
                // A hung execution covers nothing and reproduces nothing.
                log::debug!("discarding a timed-out test case");
            } else if test.is_failing() {
                failing.add_test(test);
            } else {
                let mut candidate = passing.clone();
                candidate.add_test(test);
                let fitness = self.context.evaluate_suite(&mut candidate);
                if is_improvement(fitness, best_fitness, maximize) {
                    passing = candidate;
                    best_fitness = fitness;
                }
            }

            iteration += 1;
            self.context
                .after_iteration(iteration, best_fitness, passing.size());
        }

        if failing.size() > 0 {
            log::info!("random testing found {} failing test cases", failing.size());
        }

        let mut combined = passing;
        for test in failing.tests() {
            combined.add_test(test.clone());
        }
        self.context.evaluate_suite(&mut combined);

        self.context
            .report_finished("random_testing", started_at, iteration, &combined);
        Ok(combined)
    }
}
