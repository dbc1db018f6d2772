use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::EvotestError;
use serde::{Deserialize, Serialize};

/// Knobs consumed by the search algorithms and the genetic operators.
///
/// `algorithm` and `stopping_condition` are kept as plain strings here and
/// parsed at wiring time: an unknown algorithm is a hard configuration error,
/// an unknown stopping condition falls back to iteration counting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub algorithm: String,
    pub population_size: usize,
    /// Maximum number of statements in a single test case.
    pub chromosome_length: usize,
    /// Truncate overlong test cases at the last mutatable statement before mutating.
    pub chop_max_length: bool,
    /// Number of best suites copied unchanged into the next generation.
    pub elite: usize,
    pub crossover_rate: f64,
    pub test_delete_probability: f64,
    pub test_change_probability: f64,
    pub test_insert_probability: f64,
    /// Decay base for the geometric statement-insertion loop.
    pub statement_insertion_probability: f64,
    /// Decay base for growing a suite with brand-new test cases.
    pub test_insertion_probability: f64,
    /// Maximum number of test cases in a suite.
    pub max_suite_size: usize,
    pub min_initial_tests: usize,
    pub max_initial_tests: usize,
    /// Cap on statement-construction attempts when building a random test.
    pub max_attempts: usize,
    /// Bias of rank selection, must lie in (1, 2].
    pub rank_bias: f64,
    pub stopping_condition: String,
    pub max_iterations: u64,
    pub max_test_executions: u64,
    pub budget_seconds: u64,
    /// Fixed seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            algorithm: "whole_suite".to_string(),
            population_size: 50,
            chromosome_length: 40,
            chop_max_length: true,
            elite: 1,
            crossover_rate: 0.75,
            test_delete_probability: 1.0 / 3.0,
            test_change_probability: 1.0 / 3.0,
            test_insert_probability: 1.0 / 3.0,
            statement_insertion_probability: 0.5,
            test_insertion_probability: 0.1,
            max_suite_size: 100,
            min_initial_tests: 1,
            max_initial_tests: 10,
            max_attempts: 1000,
            rank_bias: 1.7,
            stopping_condition: "max_iterations".to_string(),
            max_iterations: 100,
            max_test_executions: 10_000,
            budget_seconds: 600,
            seed: None,
        }
    }
}

impl ConfigSection for SearchConfig {
    fn section_name() -> &'static str {
        "search"
    }

    fn validate(&self) -> Result<(), EvotestError> {
        if self.population_size < 2 {
            return Err(EvotestError::Configuration(
                "Population size must be at least 2".to_string(),
            ));
        }
        if self.chromosome_length == 0 {
            return Err(EvotestError::Configuration(
                "Chromosome length must be positive".to_string(),
            ));
        }
        for (name, p) in [
            ("crossover_rate", self.crossover_rate),
            ("test_delete_probability", self.test_delete_probability),
            ("test_change_probability", self.test_change_probability),
            ("test_insert_probability", self.test_insert_probability),
            (
                "statement_insertion_probability",
                self.statement_insertion_probability,
            ),
            ("test_insertion_probability", self.test_insertion_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(EvotestError::Configuration(format!(
                    "{} must be between 0 and 1",
                    name
                )));
            }
        }
        if self.rank_bias <= 1.0 || self.rank_bias > 2.0 {
            return Err(EvotestError::Configuration(
                "Rank bias must lie in (1, 2]".to_string(),
            ));
        }
        if self.min_initial_tests == 0 || self.min_initial_tests > self.max_initial_tests {
            return Err(EvotestError::Configuration(
                "Initial test bounds must satisfy 1 <= min <= max".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(EvotestError::Configuration(
                "Max attempts must be positive".to_string(),
            ));
        }
        if self.elite >= self.population_size {
            return Err(EvotestError::Configuration(
                "Elite count must be smaller than the population size".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Search".to_string(),
            fields: vec![
                FieldManifest {
                    name: "algorithm".to_string(),
                    field_type: "string".to_string(),
                    default: serde_json::json!("whole_suite"),
                    min: None,
                    max: None,
                    description: "Generation algorithm: whole_suite, random_search or random_testing"
                        .to_string(),
                },
                FieldManifest {
                    name: "population_size".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(50),
                    min: Some(2.0),
                    max: Some(10000.0),
                    description: "Number of suites in the evolving population".to_string(),
                },
                FieldManifest {
                    name: "chromosome_length".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(40),
                    min: Some(1.0),
                    max: Some(1000.0),
                    description: "Maximum number of statements in a test case".to_string(),
                },
                FieldManifest {
                    name: "rank_bias".to_string(),
                    field_type: "float".to_string(),
                    default: serde_json::json!(1.7),
                    min: Some(1.0),
                    max: Some(2.0),
                    description: "Steepness of the rank selection distribution".to_string(),
                },
                // ... add all other fields
            ],
        }
    }
}
