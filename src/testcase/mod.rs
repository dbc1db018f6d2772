//! The data model of candidate tests: statements, sequences, the analysed
//! API surface, and the factory that builds and rewires statements for the
//! search operators.

pub mod cluster;
pub mod execution;
pub mod factory;
pub mod sequence;
pub mod statement;
pub mod variable;

pub use cluster::TestCluster;
pub use execution::{ExecutionResult, TestCaseExecutor};
pub use factory::{ClusterTestFactory, TestFactory};
pub use sequence::TestCase;
pub use statement::{CallTarget, ConstantValue, Statement, StatementKind};
pub use variable::{TypeDesc, VarRef};
