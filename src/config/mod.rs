pub mod manager;
pub mod primitives;
pub mod search;
pub mod traits;

pub use manager::{AppConfig, ConfigManager};
pub use primitives::PrimitivesConfig;
pub use search::SearchConfig;
