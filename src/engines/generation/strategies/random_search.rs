use chrono::Utc;

use crate::engines::generation::strategies::is_improvement;
use crate::engines::generation::strategy::{SearchContext, TestGenerationStrategy};
use crate::engines::search::{Chromosome, TestSuiteChromosome};
use crate::error::Result;

/// Pure random search over whole suites: draw a fresh random suite every
/// iteration and keep whichever of the two is better. The baseline the
/// evolutionary strategies have to beat.
pub struct RandomSearchStrategy {
    context: SearchContext,
}

impl RandomSearchStrategy {
    pub fn new(context: SearchContext) -> Self {
        Self { context }
    }
}

impl TestGenerationStrategy for RandomSearchStrategy {
    fn generate_tests(&mut self) -> Result<TestSuiteChromosome> {
        let started_at = Utc::now();
        self.context.statistics.on_search_started("random_search");
        let maximize = self.context.selection.maximize();

        let mut best = self
            .context
            .suite_factory
            .get_chromosome(&mut self.context.rng);
        let mut best_fitness = self.context.evaluate_suite(&mut best);

        let mut iteration = 0u64;
        while !self.context.stopping_fulfilled() {
            let mut candidate = self
                .context
                .suite_factory
                .get_chromosome(&mut self.context.rng);
            let candidate_fitness = self.context.evaluate_suite(&mut candidate);
            if is_improvement(candidate_fitness, best_fitness, maximize) {
                best = candidate;
                best_fitness = candidate_fitness;
            }

            iteration += 1;
            self.context
                .after_iteration(iteration, best_fitness, best.size());
        }

        self.context
            .report_finished("random_search", started_at, iteration, &best);
        Ok(best)
    }
}
