//! Search operators shared by the generation strategies.

pub mod crossover;
pub mod selection;

pub use crossover::{CrossoverFunction, SinglePointRelativeCrossover};
pub use selection::{RankSelection, SelectionFunction};
