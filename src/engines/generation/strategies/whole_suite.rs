use chrono::Utc;
use rand::Rng;

use crate::engines::generation::strategies::{better_fitness, is_improvement, worst_fitness};
use crate::engines::generation::strategy::{SearchContext, TestGenerationStrategy};
use crate::engines::search::{Chromosome, TestSuiteChromosome};
use crate::error::Result;

/// Genetic algorithm over whole test suites.
///
/// Standard generational loop: elites carry over untouched, parents are
/// drawn by rank selection, offspring go through crossover and mutation,
/// and an offspring pair replaces its parents only when it is at least as
/// fit and no longer in total. The search ends when a budget runs out or
/// the best suite reaches a perfect fitness.
pub struct WholeSuiteStrategy {
    context: SearchContext,
}

impl WholeSuiteStrategy {
    pub fn new(context: SearchContext) -> Self {
        Self { context }
    }

    fn initial_population(&mut self) -> Vec<TestSuiteChromosome> {
        let mut population = Vec::with_capacity(self.context.search.population_size);
        for _ in 0..self.context.search.population_size {
            let mut suite = self
                .context
                .suite_factory
                .get_chromosome(&mut self.context.rng);
            self.context.evaluate_suite(&mut suite);
            population.push(suite);
        }
        population
    }

    /// Breeds the next generation from a best-first sorted population.
    fn evolve(&mut self, population: &[TestSuiteChromosome]) -> Vec<TestSuiteChromosome> {
        let maximize = self.context.selection.maximize();
        let worst = worst_fitness(maximize);
        let mut next_generation: Vec<TestSuiteChromosome> =
            Vec::with_capacity(self.context.search.population_size);

        // Elitism: the best suites survive unchanged.
        for elite in population.iter().take(self.context.search.elite) {
            next_generation.push(elite.clone());
        }

        while next_generation.len() < self.context.search.population_size {
            let index1 = self
                .context
                .selection
                .get_index(population, &mut self.context.rng);
            let index2 = self
                .context
                .selection
                .get_index(population, &mut self.context.rng);
            let mut offspring1 = population[index1].clone();
            let mut offspring2 = population[index2].clone();

            if self.context.rng.gen::<f64>() <= self.context.search.crossover_rate {
                self.context.crossover.cross_over(
                    &mut offspring1,
                    &mut offspring2,
                    &self.context.search,
                    &mut self.context.rng,
                );
            }
            offspring1.mutate(
                &self.context.search,
                &self.context.primitives,
                &mut self.context.rng,
            );
            offspring2.mutate(
                &self.context.search,
                &self.context.primitives,
                &mut self.context.rng,
            );

            let offspring1_fitness = self.context.evaluate_suite(&mut offspring1);
            let offspring2_fitness = self.context.evaluate_suite(&mut offspring2);

            // Accept the offspring pair only when it is at least as fit as
            // the parent pair, breaking fitness ties by total length.
            let parents_best = better_fitness(
                population[index1].fitness().unwrap_or(worst),
                population[index2].fitness().unwrap_or(worst),
                maximize,
            );
            let offspring_best = better_fitness(offspring1_fitness, offspring2_fitness, maximize);
            let parents_length =
                population[index1].total_length() + population[index2].total_length();
            let offspring_length = offspring1.total_length() + offspring2.total_length();

            let accept_offspring = is_improvement(offspring_best, parents_best, maximize)
                || (offspring_best == parents_best && offspring_length <= parents_length);

            if accept_offspring {
                for offspring in [offspring1, offspring2] {
                    if next_generation.len() < self.context.search.population_size {
                        next_generation.push(offspring);
                    }
                }
            } else {
                for index in [index1, index2] {
                    if next_generation.len() < self.context.search.population_size {
                        next_generation.push(population[index].clone());
                    }
                }
            }
        }

        next_generation
    }
}

impl TestGenerationStrategy for WholeSuiteStrategy {
    fn generate_tests(&mut self) -> Result<TestSuiteChromosome> {
        let started_at = Utc::now();
        self.context.statistics.on_search_started("whole_suite");
        let maximize = self.context.selection.maximize();
        let worst = worst_fitness(maximize);

        let mut population = self.initial_population();
        self.context.sort_population(&mut population);

        let mut iteration = 0u64;
        while !self.context.stopping_fulfilled() {
            let best_fitness = population[0].fitness().unwrap_or(worst);
            // A perfect suite cannot be improved on.
            if !maximize && best_fitness == 0.0 {
                break;
            }

            let mut next_generation = self.evolve(&population);
            self.context.sort_population(&mut next_generation);
            population = next_generation;

            iteration += 1;
            let best_fitness = population[0].fitness().unwrap_or(worst);
            self.context
                .after_iteration(iteration, best_fitness, population[0].size());
        }

        let best = population.swap_remove(0);
        self.context
            .report_finished("whole_suite", started_at, iteration, &best);
        Ok(best)
    }
}
