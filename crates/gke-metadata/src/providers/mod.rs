//! Project resolvers.
//!
//! This module defines the resolver capability used by the accessor and the
//! Google Cloud implementation of it.

pub mod gcp;
mod traits;

pub use traits::ProjectResolver;

// Re-export provider clients
pub use gcp::ResourceManager;
