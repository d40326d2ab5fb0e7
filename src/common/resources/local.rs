use crate::common::error::DashboardError;
use crate::resources::ResourceProvider;
use std::path::PathBuf;

/// # Local resource
#[derive(PartialEq, Clone, Debug)]
pub struct LocalResource {
    /// Local path for the resource
    pub local_path: PathBuf,
}

impl ResourceProvider for LocalResource {
    /// Gets the path for a local resource.
    ///
    /// Fails if the file does not exist.
    fn get_local_path(&self) -> Result<PathBuf, DashboardError> {
        if self.local_path.is_file() {
            Ok(self.local_path.clone())
        } else {
            Err(DashboardError::IOError(format!(
                "Resource not found at {}",
                self.local_path.display()
            )))
        }
    }
}

impl From<PathBuf> for LocalResource {
    fn from(local_path: PathBuf) -> Self {
        Self { local_path }
    }
}
