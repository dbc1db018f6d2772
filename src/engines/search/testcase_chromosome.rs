use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::{PrimitivesConfig, SearchConfig};
use crate::engines::search::chromosome::Chromosome;
use crate::error::Result;
use crate::testcase::{ExecutionResult, TestCase, TestFactory};

/// A chromosome encoding a single test case.
///
/// Carries the construction capability it mutates through, the outcome of
/// its most recent execution, and the usual fitness bookkeeping. Cloning
/// deep-copies the sequence and shares the capability and the execution
/// result.
#[derive(Clone)]
pub struct TestCaseChromosome {
    test: TestCase,
    factory: Arc<dyn TestFactory>,
    changed: bool,
    fitness: Option<f64>,
    num_mutations: u64,
    last_execution_result: Option<Arc<ExecutionResult>>,
}

impl TestCaseChromosome {
    pub fn new(test: TestCase, factory: Arc<dyn TestFactory>) -> Self {
        Self {
            test,
            factory,
            changed: true,
            fitness: None,
            num_mutations: 0,
            last_execution_result: None,
        }
    }

    pub fn test_case(&self) -> &TestCase {
        &self.test
    }

    pub fn num_mutations(&self) -> u64 {
        self.num_mutations
    }

    pub fn last_execution_result(&self) -> Option<&Arc<ExecutionResult>> {
        self.last_execution_result.as_ref()
    }

    pub fn set_last_execution_result(&mut self, result: Arc<ExecutionResult>) {
        self.last_execution_result = Some(result);
    }

    /// Whether the most recent execution raised an exception.
    pub fn is_failing(&self) -> bool {
        self.last_execution_result
            .as_ref()
            .is_some_and(|result| result.has_test_exceptions())
    }

    /// Index of the last statement mutation may touch.
    ///
    /// When the previous execution raised, everything after the raising
    /// statement never ran, so mutation stops at the raising position as
    /// long as it is still in range. An empty test has no such index.
    pub fn last_mutatable_statement(&self) -> Option<usize> {
        if self.size() == 0 {
            return None;
        }
        if let Some(result) = &self.last_execution_result {
            if result.has_test_exceptions() {
                if let Some(position) = result.first_position_of_thrown_exception() {
                    // The recorded position may be stale after mutations.
                    if position < self.size() {
                        return Some(position);
                    }
                }
            }
        }
        Some(self.size() - 1)
    }

    /// Applies one round of mutation: an optional chop back to the length
    /// cap, then delete, change and insert, each behind its own coin flip.
    /// A round that strips every call on the subject is rolled back and
    /// replaced by one forced insertion.
    pub fn mutate(&mut self, config: &SearchConfig, primitives: &PrimitivesConfig, rng: &mut StdRng) {
        let mut changed = false;

        if config.chop_max_length && self.size() >= config.chromosome_length {
            if let Some(position) = self.last_mutatable_statement() {
                self.test.chop(position);
                changed = true;
            }
        }

        // In case mutation removes every call on the subject.
        let backup = self.test.clone();

        if rng.gen::<f64>() <= config.test_delete_probability && self.mutation_delete(rng) {
            changed = true;
        }

        if rng.gen::<f64>() <= config.test_change_probability
            && self.mutation_change(primitives, rng)
        {
            changed = true;
        }

        if rng.gen::<f64>() <= config.test_insert_probability && self.mutation_insert(config, rng)
        {
            changed = true;
        }

        if !self.factory.has_call_on_sut(&self.test) {
            self.test = backup;
            // The restored sequence still differs from where this round
            // started, so a successful insertion counts as a change.
            if self.mutation_insert(config, rng) {
                changed = true;
            }
        }

        if changed {
            self.set_changed(true);
            self.num_mutations += 1;
        }
    }

    /// Reverse scan over the mutatable prefix; each position is deleted
    /// gracefully with probability `1 / (last_mutatable + 1)`.
    fn mutation_delete(&mut self, rng: &mut StdRng) -> bool {
        let last_mutatable = match self.last_mutatable_statement() {
            Some(position) => position,
            None => return false,
        };

        let mut changed = false;
        let probability = 1.0 / (last_mutatable + 1) as f64;
        for position in (0..=last_mutatable).rev() {
            // Earlier deletions in this scan may have shrunk the test.
            if position >= self.test.size() {
                continue;
            }
            if rng.gen::<f64>() <= probability {
                match self.factory.delete_statement_gracefully(&mut self.test, position) {
                    Ok(modified) => changed |= modified,
                    Err(err) => log::debug!("graceful deletion at {position} failed: {err}"),
                }
            }
        }
        changed
    }

    /// Forward scan over the mutatable prefix; each position first tries
    /// the statement's own payload mutation and falls back to swapping the
    /// call target.
    fn mutation_change(&mut self, primitives: &PrimitivesConfig, rng: &mut StdRng) -> bool {
        let last_mutatable = match self.last_mutatable_statement() {
            Some(position) => position,
            None => return false,
        };

        let mut changed = false;
        let probability = 1.0 / (last_mutatable + 1) as f64;
        for position in 0..=last_mutatable {
            if position >= self.test.size() {
                break;
            }
            if rng.gen::<f64>() < probability {
                let mutated = match self.test.get_mut(position) {
                    Ok(statement) => statement.mutate_payload(primitives, rng),
                    Err(_) => false,
                };
                if mutated {
                    changed = true;
                } else {
                    match self.factory.change_random_call(&mut self.test, position, rng) {
                        Ok(swapped) => changed |= swapped,
                        Err(err) => log::debug!("call change at {position} failed: {err}"),
                    }
                }
            }
        }
        changed
    }

    /// Inserts statements at random positions with exponentially decaying
    /// probability, never growing past the length cap.
    fn mutation_insert(&mut self, config: &SearchConfig, rng: &mut StdRng) -> bool {
        let mut changed = false;
        let alpha = config.statement_insertion_probability;
        let mut exponent = 1;
        while rng.gen::<f64>() <= alpha.powi(exponent) && self.size() < config.chromosome_length {
            let max_position = match self.last_mutatable_statement() {
                // Also allow the slot right after the last mutatable statement.
                Some(position) => position + 1,
                None => 0,
            };
            let inserted = self
                .factory
                .insert_random_statement(&mut self.test, max_position, rng);
            exponent += 1;
            match inserted {
                Ok(position) if position < self.size() => changed = true,
                Ok(_) => {}
                Err(err) => log::debug!("statement insertion failed: {err}"),
            }
        }
        changed
    }
}

impl Chromosome for TestCaseChromosome {
    fn size(&self) -> usize {
        self.test.size()
    }

    fn has_changed(&self) -> bool {
        self.changed
    }

    fn set_changed(&mut self, changed: bool) {
        self.changed = changed;
        if changed {
            self.fitness = None;
        }
    }

    fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
        self.changed = false;
    }

    /// Offspring keeps own statements before `own_point` and appends clones
    /// of the other parent's statements from `other_point` on, rebound into
    /// the new sequence. Adopted only while it stays under the length cap;
    /// a failed append leaves the chromosome untouched.
    fn cross_over(
        &mut self,
        other: &Self,
        own_point: usize,
        other_point: usize,
        config: &SearchConfig,
    ) -> Result<()> {
        let mut offspring = TestCase::new();
        for statement in self.test.statements().iter().take(own_point) {
            offspring.add_statement(statement.clone())?;
        }
        for statement in other.test.statements().iter().skip(other_point) {
            self.factory.append_statement(&mut offspring, statement)?;
        }

        if offspring.size() < config.chromosome_length {
            self.test = offspring;
            self.set_changed(true);
        }
        Ok(())
    }
}

impl fmt::Debug for TestCaseChromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCaseChromosome")
            .field("test", &self.test)
            .field("changed", &self.changed)
            .field("fitness", &self.fitness)
            .field("num_mutations", &self.num_mutations)
            .finish()
    }
}

impl PartialEq for TestCaseChromosome {
    fn eq(&self, other: &Self) -> bool {
        self.test == other.test
    }
}
