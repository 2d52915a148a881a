//! The metadata accessor.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use futures::future::{BoxFuture, FutureExt, Shared};
use kube::config::Kubeconfig;
use tracing::debug;

use crate::cluster_name::GkeClusterName;
use crate::error::{ConfigLoadError, ResolutionError};
use crate::kubeconfig::{self, ConfigLoader, DefaultLoader};
use crate::providers::{ProjectResolver, ResourceManager};

/// Outcome of the one-time project number lookup, shared by every caller.
type Resolution = Shared<BoxFuture<'static, Result<String, ResolutionError>>>;

/// GKE metadata for the current kubeconfig context.
///
/// The kubeconfig snapshot is taken once at construction. Project name and
/// location are parsed from the current cluster name on every call. The
/// project number is looked up at most once per instance; the outcome,
/// success or failure, is kept for the life of the instance.
pub struct Metadata {
    config: Kubeconfig,
    resolver: Arc<dyn ProjectResolver>,
    project_number: OnceLock<Resolution>,
}

impl Metadata {
    /// Load the ambient kubeconfig and resolve project numbers through
    /// Cloud Resource Manager with ambient credentials.
    ///
    /// # Errors
    /// Returns error if the kubeconfig cannot be located or parsed.
    pub fn new() -> Result<Self, ConfigLoadError> {
        Self::builder().build()
    }

    /// Start building a customized accessor.
    #[must_use]
    pub fn builder() -> MetadataBuilder {
        MetadataBuilder::default()
    }

    /// Wrap an existing snapshot.
    #[must_use]
    pub fn from_kubeconfig(config: Kubeconfig, resolver: Arc<dyn ProjectResolver>) -> Self {
        Self {
            config,
            resolver,
            project_number: OnceLock::new(),
        }
    }

    /// The kubeconfig snapshot.
    #[must_use]
    pub fn kubeconfig(&self) -> &Kubeconfig {
        &self.config
    }

    /// Name of the current context, or `""`.
    #[must_use]
    pub fn current_context(&self) -> &str {
        kubeconfig::current_context(&self.config)
    }

    /// Cluster of the current context, or `""` if unset.
    #[must_use]
    pub fn cluster_name(&self) -> &str {
        kubeconfig::current_cluster(&self.config)
    }

    /// Structured view of [`Metadata::cluster_name`], if it follows the GKE
    /// convention.
    #[must_use]
    pub fn cluster(&self) -> Option<GkeClusterName> {
        GkeClusterName::parse(self.cluster_name())
    }

    /// GCP project ID, or `""` if the cluster name is not a GKE name.
    #[must_use]
    pub fn project_name(&self) -> String {
        self.cluster().map(|c| c.project).unwrap_or_default()
    }

    /// Cluster region or zone, or `""` if the cluster name is not a GKE name.
    #[must_use]
    pub fn location(&self) -> String {
        self.cluster().map(|c| c.location).unwrap_or_default()
    }

    /// Numeric project number of [`Metadata::project_name`].
    ///
    /// The first call creates a single lookup. Every call, concurrent or
    /// later, waits for and returns that lookup's outcome. A failure is
    /// returned again on each call and never retried. Dropping a waiting
    /// caller does not cancel the lookup; the next caller resumes it.
    ///
    /// No task is spawned, so any executor can drive the returned future.
    ///
    /// # Errors
    /// Returns the lookup's error if credentials could not be set up or the
    /// API call failed.
    pub async fn project_number(&self) -> Result<String, ResolutionError> {
        let resolution = self
            .project_number
            .get_or_init(|| self.start_resolution())
            .clone();
        resolution.await
    }

    fn start_resolution(&self) -> Resolution {
        let resolver = Arc::clone(&self.resolver);
        let project = self.project_name();
        debug!(project = %project, "Resolving project number");

        async move {
            resolver
                .project_number(&project)
                .await
                .map_err(ResolutionError::from)
        }
        .boxed()
        .shared()
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metadata")
            .field("current_context", &self.current_context())
            .field("cluster_name", &self.cluster_name())
            .field(
                "project_number",
                &self.project_number.get().and_then(Shared::peek),
            )
            .finish_non_exhaustive()
    }
}

/// Builder for [`Metadata`].
#[derive(Default)]
pub struct MetadataBuilder {
    loader: Option<Box<dyn ConfigLoader>>,
    resolver: Option<Arc<dyn ProjectResolver>>,
}

impl MetadataBuilder {
    /// Read only this kubeconfig file instead of the standard locations.
    #[must_use]
    pub fn kubeconfig_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.loader = Some(Box::new(DefaultLoader::with_path(path)));
        self
    }

    /// Use a custom configuration source.
    #[must_use]
    pub fn loader(mut self, loader: impl ConfigLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Use a custom project resolver.
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn ProjectResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Load the configuration and create the accessor. No network calls are
    /// made.
    ///
    /// # Errors
    /// Returns error if the kubeconfig cannot be located or parsed.
    pub fn build(self) -> Result<Metadata, ConfigLoadError> {
        let config = match self.loader {
            Some(loader) => loader.load()?,
            None => DefaultLoader::new().load()?,
        };
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(ResourceManager::default()));

        let metadata = Metadata::from_kubeconfig(config, resolver);
        debug!(
            context = %metadata.current_context(),
            cluster = %metadata.cluster_name(),
            "Loaded kubeconfig"
        );
        Ok(metadata)
    }
}
