use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::SearchConfig;
use crate::engines::search::chromosome::Chromosome;
use crate::engines::search::suite_chromosome::TestSuiteChromosome;
use crate::engines::search::testcase_chromosome::TestCaseChromosome;
use crate::testcase::{TestCase, TestFactory};

/// Builds fresh random chromosomes for initial populations and suite growth.
pub trait ChromosomeFactory<C: Chromosome> {
    fn get_chromosome(&self, rng: &mut StdRng) -> C;
}

/// Builds test-case chromosomes of random length.
///
/// Statements are inserted one at a time until a randomly drawn target
/// length is reached; construction failures burn an attempt, and the attempt
/// budget keeps an unsatisfiable cluster from looping forever. The resulting
/// test may be shorter than the target, or even empty.
pub struct TestCaseChromosomeFactory {
    test_factory: Arc<dyn TestFactory>,
    search: SearchConfig,
}

impl TestCaseChromosomeFactory {
    pub fn new(test_factory: Arc<dyn TestFactory>, search: SearchConfig) -> Self {
        Self {
            test_factory,
            search,
        }
    }
}

impl ChromosomeFactory<TestCaseChromosome> for TestCaseChromosomeFactory {
    fn get_chromosome(&self, rng: &mut StdRng) -> TestCaseChromosome {
        let length = rng.gen_range(1..=self.search.chromosome_length);
        let mut test = TestCase::new();
        let mut attempts = 0;
        while test.size() < length && attempts < self.search.max_attempts {
            let size = test.size();
            if let Err(err) = self.test_factory.insert_random_statement(&mut test, size, rng) {
                log::debug!("statement construction failed: {err}");
            }
            attempts += 1;
        }
        TestCaseChromosome::new(test, Arc::clone(&self.test_factory))
    }
}

/// Builds suite chromosomes holding a random number of fresh test cases.
pub struct TestSuiteChromosomeFactory {
    test_case_factory: Arc<dyn ChromosomeFactory<TestCaseChromosome>>,
    search: SearchConfig,
}

impl TestSuiteChromosomeFactory {
    pub fn new(
        test_case_factory: Arc<dyn ChromosomeFactory<TestCaseChromosome>>,
        search: SearchConfig,
    ) -> Self {
        Self {
            test_case_factory,
            search,
        }
    }
}

impl ChromosomeFactory<TestSuiteChromosome> for TestSuiteChromosomeFactory {
    fn get_chromosome(&self, rng: &mut StdRng) -> TestSuiteChromosome {
        let mut suite = TestSuiteChromosome::new(Arc::clone(&self.test_case_factory));
        let num_tests =
            rng.gen_range(self.search.min_initial_tests..=self.search.max_initial_tests);
        for _ in 0..num_tests {
            let test = self.test_case_factory.get_chromosome(rng);
            suite.add_test(test);
        }
        suite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrimitivesConfig;
    use crate::testcase::{CallTarget, ClusterTestFactory, TestCluster, TypeDesc};
    use rand::SeedableRng;

    fn test_factory() -> Arc<dyn TestFactory> {
        let counter = TypeDesc::new("Counter");
        let cluster = TestCluster::new(vec![
            CallTarget::function("make_counter", vec![], Some(counter.clone()), false),
            CallTarget::method(
                counter.clone(),
                "increment",
                vec![counter, TypeDesc::new("int")],
                Some(TypeDesc::new("int")),
                true,
            ),
        ]);
        Arc::new(ClusterTestFactory::new(
            Arc::new(cluster),
            PrimitivesConfig::default(),
        ))
    }

    #[test]
    fn test_random_tests_are_nonempty_and_well_formed() {
        let search = SearchConfig {
            chromosome_length: 10,
            ..SearchConfig::default()
        };
        let factory = TestCaseChromosomeFactory::new(test_factory(), search);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let chromosome = factory.get_chromosome(&mut rng);
            assert!(chromosome.size() >= 1);
            for (pos, stmt) in chromosome.test_case().statements().iter().enumerate() {
                for var in stmt.inputs() {
                    assert!(var.position() < pos);
                }
            }
        }
    }

    #[test]
    fn test_unsatisfiable_cluster_yields_empty_test() {
        let cluster = TestCluster::new(vec![CallTarget::function(
            "consume",
            vec![TypeDesc::new("Window")],
            None,
            true,
        )]);
        let factory: Arc<dyn TestFactory> = Arc::new(ClusterTestFactory::new(
            Arc::new(cluster),
            PrimitivesConfig::default(),
        ));
        let search = SearchConfig {
            max_attempts: 25,
            ..SearchConfig::default()
        };
        let chromosome_factory = TestCaseChromosomeFactory::new(factory, search);
        let mut rng = StdRng::seed_from_u64(11);
        let chromosome = chromosome_factory.get_chromosome(&mut rng);
        assert_eq!(chromosome.size(), 0);
    }

    #[test]
    fn test_suite_factory_honors_initial_test_bounds() {
        let search = SearchConfig {
            min_initial_tests: 2,
            max_initial_tests: 4,
            ..SearchConfig::default()
        };
        let test_case_factory = Arc::new(TestCaseChromosomeFactory::new(
            test_factory(),
            search.clone(),
        ));
        let suite_factory = TestSuiteChromosomeFactory::new(test_case_factory, search);
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..10 {
            let suite = suite_factory.get_chromosome(&mut rng);
            assert!((2..=4).contains(&suite.size()));
        }
    }
}
