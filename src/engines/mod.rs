pub mod generation;
pub mod search;
