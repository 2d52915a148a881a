//! GKE metadata for the current Kubernetes context.
//!
//! This crate answers "which GCP project and location does my current
//! kubeconfig context point at?" for clusters that follow the GKE naming
//! convention:
//!
//! ```text
//! gke_<project>_<location>_<cluster>
//! ```
//!
//! - **Project name** and **location** are parsed from the cluster name.
//! - **Project number** is looked up once through Cloud Resource Manager
//!   and cached for the lifetime of the [`Metadata`] instance.
//!
//! ## Example
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let metadata = gke_metadata::Metadata::new()?;
//!
//! println!("project:  {}", metadata.project_name());
//! println!("location: {}", metadata.location());
//! println!("number:   {}", metadata.project_number().await?);
//! # Ok(())
//! # }
//! ```

mod cluster_name;
mod error;
pub mod kubeconfig;
mod metadata;
pub mod providers;

pub use cluster_name::GkeClusterName;
pub use error::{CloudError, ConfigLoadError, ResolutionError};
pub use kubeconfig::{ConfigLoader, DefaultLoader, StaticLoader};
pub use metadata::{Metadata, MetadataBuilder};
pub use providers::{gcp, ProjectResolver};
