//! Search-based test generation: evolves sequences of API calls against a
//! user-supplied executor until a fitness target or budget is reached.
//!
//! The crate is wired together by [`engines::generation::GenerationAlgorithmFactory`],
//! which takes an [`config::AppConfig`], a [`testcase::TestCluster`] describing the
//! API under test, an executor, and fitness functions, and returns a ready-to-run
//! generation strategy.

pub mod config;
pub mod engines;
pub mod error;
pub mod testcase;

pub use config::{AppConfig, ConfigManager, PrimitivesConfig, SearchConfig};
pub use error::{EvotestError, Result};
