use std::str::FromStr;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::AppConfig;
use crate::engines::generation::statistics::StatisticsSink;
use crate::engines::generation::stopping::stopping_condition_from_config;
use crate::engines::generation::strategies::{
    RandomSearchStrategy, RandomTestingStrategy, WholeSuiteStrategy,
};
use crate::engines::generation::strategy::{SearchContext, TestGenerationStrategy};
use crate::engines::search::operators::{
    RankSelection, SelectionFunction, SinglePointRelativeCrossover,
};
use crate::engines::search::{
    ChromosomeFactory, FitnessFunction, TestCaseChromosome, TestCaseChromosomeFactory,
    TestSuiteChromosome, TestSuiteChromosomeFactory,
};
use crate::error::{EvotestError, Result};
use crate::testcase::{ClusterTestFactory, TestCaseExecutor, TestCluster, TestFactory};

/// The closed set of generation algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    RandomSearch,
    RandomTesting,
    WholeSuite,
}

impl FromStr for Algorithm {
    type Err = EvotestError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "random_search" => Ok(Self::RandomSearch),
            "random_testing" => Ok(Self::RandomTesting),
            "whole_suite" => Ok(Self::WholeSuite),
            unknown => Err(EvotestError::Configuration(format!(
                "no generation algorithm named {unknown:?}"
            ))),
        }
    }
}

/// Assembles a ready-to-run strategy from the configuration and the
/// caller-supplied collaborators.
///
/// A misconfigured algorithm name is a hard error; the caller asked for
/// something that does not exist and silently running a different search
/// would be worse than failing. Contrast with the stopping condition, where
/// any budget is serviceable and an unknown name only costs a warning.
pub struct GenerationAlgorithmFactory {
    config: AppConfig,
    cluster: Arc<TestCluster>,
    executor: Box<dyn TestCaseExecutor>,
    fitness_functions: Vec<Box<dyn FitnessFunction>>,
    statistics: Box<dyn StatisticsSink>,
}

impl GenerationAlgorithmFactory {
    pub fn new(
        config: AppConfig,
        cluster: Arc<TestCluster>,
        executor: Box<dyn TestCaseExecutor>,
        fitness_functions: Vec<Box<dyn FitnessFunction>>,
        statistics: Box<dyn StatisticsSink>,
    ) -> Self {
        Self {
            config,
            cluster,
            executor,
            fitness_functions,
            statistics,
        }
    }

    /// Builds the configured strategy, consuming the factory.
    pub fn get_search_algorithm(self) -> Result<Box<dyn TestGenerationStrategy>> {
        self.config.validate()?;
        let algorithm = Algorithm::from_str(&self.config.search.algorithm)?;
        log::info!("using generation algorithm {algorithm:?}");

        // Every aggregate in this engine is a cost.
        if let Some(function) = self.fitness_functions.iter().find(|f| f.is_maximisation()) {
            return Err(EvotestError::Configuration(format!(
                "fitness function {:?} maximises; only minimising functions are supported",
                function.name()
            )));
        }

        let search = self.config.search.clone();
        let rng = match search.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let test_factory: Arc<dyn TestFactory> = Arc::new(ClusterTestFactory::new(
            Arc::clone(&self.cluster),
            self.config.primitives.clone(),
        ));
        let test_case_factory: Arc<dyn ChromosomeFactory<TestCaseChromosome>> = Arc::new(
            TestCaseChromosomeFactory::new(Arc::clone(&test_factory), search.clone()),
        );
        let suite_factory: Arc<dyn ChromosomeFactory<TestSuiteChromosome>> = Arc::new(
            TestSuiteChromosomeFactory::new(Arc::clone(&test_case_factory), search.clone()),
        );

        // Fitness values are costs; the selection direction must say so
        // rather than assume it.
        let mut selection: Box<dyn SelectionFunction<TestSuiteChromosome>> =
            Box::new(RankSelection::new(search.rank_bias));
        selection.set_maximize(false);

        let stopping_conditions = vec![stopping_condition_from_config(&search)];

        let context = SearchContext {
            primitives: self.config.primitives.clone(),
            search,
            test_factory,
            test_case_factory,
            suite_factory,
            executor: self.executor,
            fitness_functions: self.fitness_functions,
            selection,
            crossover: Box::new(SinglePointRelativeCrossover),
            stopping_conditions,
            statistics: self.statistics,
            rng,
            tests_executed: 0,
        };

        Ok(match algorithm {
            Algorithm::RandomSearch => Box::new(RandomSearchStrategy::new(context)),
            Algorithm::RandomTesting => Box::new(RandomTestingStrategy::new(context)),
            Algorithm::WholeSuite => Box::new(WholeSuiteStrategy::new(context)),
        })
    }
}
