use super::{primitives::PrimitivesConfig, search::SearchConfig, traits::ConfigSection};
use crate::error::EvotestError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub primitives: PrimitivesConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), EvotestError> {
        self.search.validate()?;
        self.primitives.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EvotestError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EvotestError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| EvotestError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        *self.config.write().unwrap() = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EvotestError> {
        let config = self.config.read().unwrap();
        let toml_str = toml::to_string_pretty(&*config)
            .map_err(|e| EvotestError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| EvotestError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap().clone()
    }

    pub fn update<F>(&self, f: F) -> Result<(), EvotestError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap();
        f(&mut config);
        config.validate()?;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rejects_invalid_values() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.search.population_size = 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = AppConfig::default();
        let encoded = toml::to_string_pretty(&config).unwrap();
        let decoded: AppConfig = toml::from_str(&encoded).unwrap();
        assert_eq!(decoded.search.population_size, config.search.population_size);
        assert_eq!(decoded.primitives.max_int, config.primitives.max_int);
    }

    #[test]
    fn test_save_and_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "evotest_config_{}.toml",
            std::process::id()
        ));
        let manager = ConfigManager::new();
        manager
            .update(|c| c.search.population_size = 17)
            .unwrap();
        manager.save_to_file(&path).unwrap();

        let loaded = ConfigManager::new();
        loaded.load_from_file(&path).unwrap();
        assert_eq!(loaded.get().search.population_size, 17);
        let _ = std::fs::remove_file(&path);
    }
}
