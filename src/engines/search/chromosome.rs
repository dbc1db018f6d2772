use std::sync::Arc;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::testcase::ExecutionResult;

/// Common surface of everything the search evolves.
///
/// Fitness is cached on the chromosome: `fitness()` stays valid until a
/// mutation or crossover marks the chromosome changed, at which point the
/// evaluation layer recomputes and stores a fresh value. Cloning preserves
/// both the cache and the changed flag.
pub trait Chromosome: Clone {
    /// Number of elements: statements for a test case, tests for a suite.
    fn size(&self) -> usize;

    fn has_changed(&self) -> bool;

    fn set_changed(&mut self, changed: bool);

    /// Cached fitness, if one was stored since the last change.
    fn fitness(&self) -> Option<f64>;

    /// Stores a freshly computed fitness and clears the changed flag.
    fn set_fitness(&mut self, fitness: f64);

    /// Single-point crossover at pre-computed positions: keep own elements
    /// before `own_point`, take the other parent's elements from
    /// `other_point` on. Construction failures leave `self` unmodified.
    fn cross_over(
        &mut self,
        other: &Self,
        own_point: usize,
        other_point: usize,
        config: &SearchConfig,
    ) -> Result<()>;
}

/// Scores a chromosome from the raw outcomes of executing its test cases.
///
/// Implementations live outside the engine; coverage, exception counts or
/// any other measurement reachable from the execution metrics bag work the
/// same way. Values are costs unless `is_maximisation` says otherwise.
pub trait FitnessFunction {
    fn name(&self) -> &str;

    fn is_maximisation(&self) -> bool {
        false
    }

    fn compute(&self, results: &[Arc<ExecutionResult>]) -> f64;
}
