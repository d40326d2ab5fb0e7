//! # Resource definitions for model configuration files
//!
//! Pipelines reach the files describing their models (label mappings, dashboard settings)
//! through the `ResourceProvider` trait. A single resource type is pre-defined:
//! - LocalResource: points to a local file
//!
//! The model weights themselves are owned by the injected model backends and are not
//! referenced here.

mod local;

use crate::common::error::DashboardError;
pub use local::LocalResource;
use std::path::PathBuf;

/// # Resource Trait that can provide the location of a configuration resource
pub trait ResourceProvider {
    /// Provides the local path for a resource.
    ///
    /// # Returns
    ///
    /// * `PathBuf` pointing to the resource file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nlp_dashboard::resources::{LocalResource, ResourceProvider};
    /// use std::path::PathBuf;
    /// let config_resource = LocalResource {
    ///     local_path: PathBuf::from("path/to/config.json"),
    /// };
    /// let config_path = config_resource.get_local_path();
    /// ```
    fn get_local_path(&self) -> Result<PathBuf, DashboardError>;
}
