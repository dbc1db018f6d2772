//! Chromosome representations and the genetic operators that act on them.

pub mod chromosome;
pub mod factories;
pub mod operators;
pub mod suite_chromosome;
pub mod testcase_chromosome;

pub use chromosome::{Chromosome, FitnessFunction};
pub use factories::{ChromosomeFactory, TestCaseChromosomeFactory, TestSuiteChromosomeFactory};
pub use suite_chromosome::TestSuiteChromosome;
pub use testcase_chromosome::TestCaseChromosome;
