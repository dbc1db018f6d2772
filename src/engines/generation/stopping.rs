use std::time::{Duration, Instant};

use crate::config::SearchConfig;

/// Budget tracking for the search loop.
///
/// Strategies call the event hooks as the search moves and check
/// `is_fulfilled` at generation boundaries; a long-running generation is
/// finished, never interrupted. Conditions are passive observers and must
/// stay cheap.
pub trait StoppingCondition {
    /// Amount of budget consumed so far, in the condition's own unit.
    fn current_value(&self) -> u64;

    /// The configured budget, in the condition's own unit.
    fn limit(&self) -> u64;

    fn is_fulfilled(&self) -> bool;

    /// Restarts budget tracking from zero.
    fn reset(&mut self);

    /// Fraction of the budget consumed, clamped to 1.0.
    fn progress(&self) -> f64 {
        if self.limit() == 0 {
            return 1.0;
        }
        (self.current_value() as f64 / self.limit() as f64).min(1.0)
    }

    fn after_search_iteration(&mut self) {}

    fn after_test_execution(&mut self) {}
}

/// Stops after a fixed number of search iterations.
#[derive(Debug)]
pub struct MaxIterationsStoppingCondition {
    limit: u64,
    iterations: u64,
}

impl MaxIterationsStoppingCondition {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            iterations: 0,
        }
    }
}

impl StoppingCondition for MaxIterationsStoppingCondition {
    fn current_value(&self) -> u64 {
        self.iterations
    }

    fn limit(&self) -> u64 {
        self.limit
    }

    fn is_fulfilled(&self) -> bool {
        self.iterations >= self.limit
    }

    fn reset(&mut self) {
        self.iterations = 0;
    }

    fn after_search_iteration(&mut self) {
        self.iterations += 1;
    }
}

/// Stops after a fixed number of test-case executions.
#[derive(Debug)]
pub struct MaxTestExecutionsStoppingCondition {
    limit: u64,
    executions: u64,
}

impl MaxTestExecutionsStoppingCondition {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            executions: 0,
        }
    }
}

impl StoppingCondition for MaxTestExecutionsStoppingCondition {
    fn current_value(&self) -> u64 {
        self.executions
    }

    fn limit(&self) -> u64 {
        self.limit
    }

    fn is_fulfilled(&self) -> bool {
        self.executions >= self.limit
    }

    fn reset(&mut self) {
        self.executions = 0;
    }

    fn after_test_execution(&mut self) {
        self.executions += 1;
    }
}

/// Stops once the wall-clock budget is used up.
#[derive(Debug)]
pub struct MaxSearchTimeStoppingCondition {
    budget: Duration,
    start: Instant,
}

impl MaxSearchTimeStoppingCondition {
    pub fn new(budget_seconds: u64) -> Self {
        Self {
            budget: Duration::from_secs(budget_seconds),
            start: Instant::now(),
        }
    }
}

impl StoppingCondition for MaxSearchTimeStoppingCondition {
    fn current_value(&self) -> u64 {
        self.start.elapsed().as_secs()
    }

    fn limit(&self) -> u64 {
        self.budget.as_secs()
    }

    fn is_fulfilled(&self) -> bool {
        self.start.elapsed() >= self.budget
    }

    fn reset(&mut self) {
        self.start = Instant::now();
    }

    fn progress(&self) -> f64 {
        if self.budget.is_zero() {
            return 1.0;
        }
        (self.start.elapsed().as_secs_f64() / self.budget.as_secs_f64()).min(1.0)
    }
}

/// Builds the stopping condition named in the configuration. An unknown
/// kind is not worth aborting a run over; it logs a warning and falls back
/// to iteration counting.
pub fn stopping_condition_from_config(search: &SearchConfig) -> Box<dyn StoppingCondition> {
    match search.stopping_condition.as_str() {
        "max_iterations" => Box::new(MaxIterationsStoppingCondition::new(search.max_iterations)),
        "max_test_executions" => Box::new(MaxTestExecutionsStoppingCondition::new(
            search.max_test_executions,
        )),
        "max_time" => Box::new(MaxSearchTimeStoppingCondition::new(search.budget_seconds)),
        unknown => {
            log::warn!("unknown stopping condition {unknown:?}, falling back to iteration limit");
            Box::new(MaxIterationsStoppingCondition::new(search.max_iterations))
        }
    }
}
