//! Kubeconfig discovery and loading.
//!
//! Discovery follows the usual kubectl rules:
//! - An explicit path, if one was configured
//! - Every file listed in `KUBECONFIG`, merged in order (first value wins)
//! - `~/.kube/config`

use std::env;
use std::path::{Path, PathBuf};

use kube::config::Kubeconfig;
use tracing::debug;

use crate::error::ConfigLoadError;

/// Environment variable listing kubeconfig files.
pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

/// Source of the kubeconfig snapshot.
pub trait ConfigLoader: Send + Sync {
    /// Load the configuration.
    ///
    /// # Errors
    /// Returns error if no configuration can be located or parsed.
    fn load(&self) -> Result<Kubeconfig, ConfigLoadError>;
}

/// Loads the kubeconfig from disk using the standard discovery rules.
#[derive(Debug, Clone, Default)]
pub struct DefaultLoader {
    explicit_path: Option<PathBuf>,
}

impl DefaultLoader {
    /// Loader that searches `KUBECONFIG` and then `~/.kube/config`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader that reads only the given file.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            explicit_path: Some(path.into()),
        }
    }

    /// Files that would be read, in merge order.
    ///
    /// # Errors
    /// Returns error if nothing is configured and the home directory has no
    /// kubeconfig.
    pub fn candidate_paths(&self) -> Result<Vec<PathBuf>, ConfigLoadError> {
        if let Some(path) = &self.explicit_path {
            return Ok(vec![path.clone()]);
        }

        if let Some(value) = env::var_os(KUBECONFIG_ENV) {
            let paths: Vec<PathBuf> = env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if !paths.is_empty() {
                return Ok(paths);
            }
        }

        let default_path = default_kubeconfig_path()
            .ok_or_else(|| ConfigLoadError::NotFound("could not determine home directory".into()))?;
        if !default_path.exists() {
            return Err(ConfigLoadError::NotFound(format!(
                "{} does not exist and {KUBECONFIG_ENV} is not set",
                default_path.display()
            )));
        }
        Ok(vec![default_path])
    }
}

impl ConfigLoader for DefaultLoader {
    fn load(&self) -> Result<Kubeconfig, ConfigLoadError> {
        let paths = self.candidate_paths()?;
        let from_env = self.explicit_path.is_none();

        let mut merged: Option<Kubeconfig> = None;
        for path in &paths {
            // kubectl ignores missing entries in a KUBECONFIG list
            if from_env && !path.exists() {
                debug!(path = %path.display(), "Skipping missing kubeconfig");
                continue;
            }
            let config = read_kubeconfig(path)?;
            merged = Some(match merged {
                Some(current) => current.merge(config)?,
                None => config,
            });
        }

        merged.ok_or_else(|| {
            ConfigLoadError::NotFound(format!("no file listed in {KUBECONFIG_ENV} exists"))
        })
    }
}

/// Serves a snapshot that is already in memory.
#[derive(Debug, Clone)]
pub struct StaticLoader {
    config: Kubeconfig,
}

impl StaticLoader {
    /// Wrap an existing snapshot.
    #[must_use]
    pub fn new(config: Kubeconfig) -> Self {
        Self { config }
    }

    /// Parse a snapshot from YAML.
    ///
    /// # Errors
    /// Returns error if the YAML is not a valid kubeconfig.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        Ok(Self::new(Kubeconfig::from_yaml(yaml)?))
    }
}

impl ConfigLoader for StaticLoader {
    fn load(&self) -> Result<Kubeconfig, ConfigLoadError> {
        Ok(self.config.clone())
    }
}

/// Get the default kubeconfig path (~/.kube/config).
#[must_use]
pub fn default_kubeconfig_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".kube").join("config"))
}

/// Name of the current context, or `""` if unset.
#[must_use]
pub fn current_context(config: &Kubeconfig) -> &str {
    config.current_context.as_deref().unwrap_or_default()
}

/// Cluster referenced by the current context, or `""` if the context is
/// unset, unknown, or has no cluster.
#[must_use]
pub fn current_cluster(config: &Kubeconfig) -> &str {
    let name = current_context(config);
    config
        .contexts
        .iter()
        .find(|c| c.name == name)
        .and_then(|c| c.context.as_ref())
        .map(|c| c.cluster.as_str())
        .unwrap_or_default()
}

fn read_kubeconfig(path: &Path) -> Result<Kubeconfig, ConfigLoadError> {
    debug!(path = %path.display(), "Reading kubeconfig");

    let text = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Kubeconfig::from_yaml(&text)?)
}
