use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::{PrimitivesConfig, SearchConfig};
use crate::engines::search::chromosome::Chromosome;
use crate::engines::search::factories::ChromosomeFactory;
use crate::engines::search::testcase_chromosome::TestCaseChromosome;
use crate::error::Result;

/// A chromosome encoding a whole test suite as an ordered list of test-case
/// chromosomes. Holds a factory so mutation can grow the suite with brand
/// new tests.
#[derive(Clone)]
pub struct TestSuiteChromosome {
    tests: Vec<TestCaseChromosome>,
    test_case_factory: Arc<dyn ChromosomeFactory<TestCaseChromosome>>,
    changed: bool,
    fitness: Option<f64>,
}

impl TestSuiteChromosome {
    pub fn new(test_case_factory: Arc<dyn ChromosomeFactory<TestCaseChromosome>>) -> Self {
        Self {
            tests: Vec::new(),
            test_case_factory,
            changed: true,
            fitness: None,
        }
    }

    pub fn tests(&self) -> &[TestCaseChromosome] {
        &self.tests
    }

    /// Mutable member access for the evaluation layer; storing execution
    /// results and fitness there does not count as a suite change.
    pub fn tests_mut(&mut self) -> &mut [TestCaseChromosome] {
        &mut self.tests
    }

    pub fn add_test(&mut self, test: TestCaseChromosome) {
        self.tests.push(test);
        self.set_changed(true);
    }

    /// Total number of statements across all member tests.
    pub fn total_length(&self) -> usize {
        self.tests.iter().map(Chromosome::size).sum()
    }

    /// Mutates each member with probability `1/size`, then appends brand new
    /// tests with geometrically decaying probability until the suite-size
    /// cap cuts growth off.
    pub fn mutate(
        &mut self,
        config: &SearchConfig,
        primitives: &PrimitivesConfig,
        rng: &mut StdRng,
    ) {
        let mut changed = false;

        if !self.tests.is_empty() {
            let probability = 1.0 / self.tests.len() as f64;
            for test in &mut self.tests {
                if rng.gen::<f64>() < probability {
                    test.mutate(config, primitives, rng);
                    if test.has_changed() {
                        changed = true;
                    }
                }
            }
        }

        let alpha = config.test_insertion_probability;
        let mut exponent = 1;
        while rng.gen::<f64>() <= alpha.powi(exponent) && self.tests.len() < config.max_suite_size
        {
            let fresh = self.test_case_factory.get_chromosome(rng);
            self.tests.push(fresh);
            exponent += 1;
            changed = true;
        }

        if changed {
            self.set_changed(true);
        }
    }
}

impl Chromosome for TestSuiteChromosome {
    fn size(&self) -> usize {
        self.tests.len()
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

    /// Member-list splice: own tests before `own_point`, clones of the other
    /// parent's tests from `other_point` on.
    fn cross_over(
        &mut self,
        other: &Self,
        own_point: usize,
        other_point: usize,
        _config: &SearchConfig,
    ) -> Result<()> {
        self.tests.truncate(own_point);
        for test in other.tests.iter().skip(other_point) {
            self.tests.push(test.clone());
        }
        self.set_changed(true);
        Ok(())
    }
}

impl fmt::Debug for TestSuiteChromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSuiteChromosome")
            .field("tests", &self.tests)
            .field("changed", &self.changed)
            .field("fitness", &self.fitness)
            .finish()
    }
}

impl PartialEq for TestSuiteChromosome {
    fn eq(&self, other: &Self) -> bool {
        self.tests == other.tests
    }
}
