//! The concrete test-generation strategies.

pub mod random_search;
pub mod random_testing;
pub mod whole_suite;

pub use random_search::RandomSearchStrategy;
pub use random_testing::RandomTestingStrategy;
pub use whole_suite::WholeSuiteStrategy;

/// Whether `candidate` beats `incumbent` in the configured direction.
pub(crate) fn is_improvement(candidate: f64, incumbent: f64, maximize: bool) -> bool {
    if maximize {
        candidate > incumbent
    } else {
        candidate < incumbent
    }
}

/// The better of two fitness values in the configured direction.
pub(crate) fn better_fitness(a: f64, b: f64, maximize: bool) -> f64 {
    if maximize {
        a.max(b)
    } else {
        a.min(b)
    }
}

/// Placeholder for a fitness that has never been computed; sorts behind
/// every real value in the configured direction.
pub(crate) fn worst_fitness(maximize: bool) -> f64 {
    if maximize {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    }
}
