//! Analytics configuration.
//!
//! Settings live in `.atlas/config.json` under the project directory. When
//! that file is absent the user-level `atlas/config.json` under the platform
//! config directory is tried, then built-in defaults. Every field has a
//! default, so a config file only needs the keys it changes.

use crate::centrality::CentralityOptions;
use crate::error::{GraphError, Result};
use crate::lod::{LodScorer, DEFAULT_DISTANCE_SCALE, DEFAULT_NEAR_FIELD};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project-level config directory.
pub const CONFIG_DIR: &str = ".atlas";

/// Config file name, in the project or user config directory.
pub const CONFIG_FILE: &str = "config.json";

/// Level-of-detail camera settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LodConfig {
    pub distance_scale: f64,
    pub near_field: f64,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            distance_scale: DEFAULT_DISTANCE_SCALE,
            near_field: DEFAULT_NEAR_FIELD,
        }
    }
}

impl LodConfig {
    pub fn scorer(&self) -> LodScorer {
        LodScorer::new(self.distance_scale, self.near_field)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyticsConfig {
    /// Hops of context kept around filter matches.
    pub filter_depth: usize,
    /// Largest traversal depth a caller may request.
    pub max_traversal_depth: usize,
    pub max_nodes_per_cluster: usize,
    pub lod: LodConfig,
    /// Options used when a centrality call does not pass its own.
    pub centrality: CentralityOptions,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            filter_depth: crate::filter::DEFAULT_CONTEXT_DEPTH,
            max_traversal_depth: 10,
            max_nodes_per_cluster: 50,
            lod: LodConfig::default(),
            centrality: CentralityOptions::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Path of the project-level config file.
    pub fn project_path(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Path of the user-level config file, if the platform has one.
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("atlas").join(CONFIG_FILE))
    }

    /// Loads the project config, falling back to the user config and then
    /// to defaults. A file that exists but cannot be read or decoded is an
    /// error.
    pub fn load(project_dir: &Path) -> Result<Self> {
        Self::load_with(project_dir, Self::user_path())
    }

    /// Same as [`AnalyticsConfig::load`] with an explicit user-level file.
    /// `None` skips the user level.
    pub fn load_with(project_dir: &Path, user_path: Option<PathBuf>) -> Result<Self> {
        let candidates = std::iter::once(Self::project_path(project_dir)).chain(user_path);

        for path in candidates {
            if path.is_file() {
                let config = Self::from_path(&path)?;
                debug!(path = %path.display(), "config loaded");
                return Ok(config);
            }
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Reads and validates one config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| GraphError::config(path, e))?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| GraphError::config(path, e))?;
        config.validate(path)?;
        Ok(config)
    }

    /// Writes the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| GraphError::config(path, e))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Rejects traversal depths above the configured ceiling.
    pub fn check_depth(&self, depth: usize) -> Result<usize> {
        if depth > self.max_traversal_depth {
            return Err(GraphError::invalid_parameter(
                "depth",
                format!(
                    "{} exceeds the maximum of {}",
                    depth, self.max_traversal_depth
                ),
            ));
        }
        Ok(depth)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.max_nodes_per_cluster == 0 {
            return Err(GraphError::config(path, "maxNodesPerCluster must be at least 1"));
        }
        if !(self.lod.distance_scale.is_finite() && self.lod.distance_scale > 0.0) {
            return Err(GraphError::config(path, "lod.distanceScale must be positive"));
        }
        if !(self.lod.near_field.is_finite() && self.lod.near_field >= 0.0) {
            return Err(GraphError::config(path, "lod.nearField must not be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.filter_depth, 1);
        assert_eq!(config.max_traversal_depth, 10);
        assert_eq!(config.max_nodes_per_cluster, 50);
        assert_eq!(config.lod.scorer(), LodScorer::default());
        assert!(config.centrality.normalize);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "maxNodesPerCluster": 20, "lod": { "nearField": 2.0 } }"#).unwrap();

        let config = AnalyticsConfig::from_path(&path).unwrap();
        assert_eq!(config.max_nodes_per_cluster, 20);
        assert_eq!(config.lod.near_field, 2.0);
        assert_eq!(config.lod.distance_scale, DEFAULT_DISTANCE_SCALE);
        assert_eq!(config.max_traversal_depth, 10);
    }

    #[test]
    fn test_save_and_load_project_config() {
        let dir = TempDir::new().unwrap();
        let mut config = AnalyticsConfig::default();
        config.filter_depth = 2;
        config.centrality.directed = true;
        config
            .save(&AnalyticsConfig::project_path(dir.path()))
            .unwrap();

        let loaded = AnalyticsConfig::load_with(dir.path(), None).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_user_config_is_the_fallback() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        let user_path = user.path().join(CONFIG_FILE);
        fs::write(&user_path, r#"{ "maxTraversalDepth": 3 }"#).unwrap();

        let config = AnalyticsConfig::load_with(project.path(), Some(user_path.clone())).unwrap();
        assert_eq!(config.max_traversal_depth, 3);

        AnalyticsConfig::default()
            .save(&AnalyticsConfig::project_path(project.path()))
            .unwrap();
        let config = AnalyticsConfig::load_with(project.path(), Some(user_path)).unwrap();
        assert_eq!(config.max_traversal_depth, 10);

        let missing = user.path().join("absent.json");
        let config = AnalyticsConfig::load_with(user.path(), Some(missing)).unwrap();
        assert_eq!(config, AnalyticsConfig::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = AnalyticsConfig::project_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let err = AnalyticsConfig::load_with(dir.path(), None).unwrap_err();
        assert!(matches!(err, GraphError::Config { .. }));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "maxNodesPerCluster": 0 }"#).unwrap();
        assert!(AnalyticsConfig::from_path(&path).is_err());

        fs::write(&path, r#"{ "centrality": { "bogus": true } }"#).unwrap();
        assert!(AnalyticsConfig::from_path(&path).is_err());
    }

    #[test]
    fn test_check_depth() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.check_depth(10).unwrap(), 10);
        let err = config.check_depth(11).unwrap_err();
        assert!(matches!(err, GraphError::InvalidParameter { name: "depth", .. }));
    }
}
