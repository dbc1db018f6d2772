//! Search orchestration: strategies, budgets, reporting, and the factory
//! that wires a configured strategy together.

pub mod algorithm_factory;
pub mod statistics;
pub mod stopping;
pub mod strategies;
pub mod strategy;

pub use algorithm_factory::{Algorithm, GenerationAlgorithmFactory};
pub use statistics::{
    ChannelStatistics, LogStatistics, NoopStatistics, SearchReport, StatisticsEvent, StatisticsSink,
};
pub use stopping::{
    stopping_condition_from_config, MaxIterationsStoppingCondition, MaxSearchTimeStoppingCondition,
    MaxTestExecutionsStoppingCondition, StoppingCondition,
};
pub use strategies::{RandomSearchStrategy, RandomTestingStrategy, WholeSuiteStrategy};
pub use strategy::{SearchContext, TestGenerationStrategy};
