use std::sync::Arc;

use crate::client::{SearchClient, TransportError};
use crate::lifecycle::{Interrupted, Lifecycle};

/// Errors raised while making sure the target index exists.
#[derive(thiserror::Error, Debug)]
pub enum ProvisionError {
    #[error("index existence check failed: {0}")]
    CheckFailed(#[source] TransportError),

    #[error("index creation failed: {0}")]
    CreateFailed(#[source] TransportError),

    #[error("cannot create index")]
    NotAcknowledged,

    #[error("provisioning interrupted by shutdown")]
    Interrupted,

    #[error("transport call panicked during provisioning")]
    Aborted,

    #[error("could not start dispatch executor: {0}")]
    Runtime(#[from] std::io::Error),
}

impl From<Interrupted> for ProvisionError {
    fn from(interrupted: Interrupted) -> Self {
        match interrupted {
            Interrupted::Cancelled => ProvisionError::Interrupted,
            Interrupted::Panicked => ProvisionError::Aborted,
        }
    }
}

/// Creates the target index on first use.
pub struct IndexProvisioner<'a> {
    client: &'a Arc<dyn SearchClient>,
    lifecycle: &'a Lifecycle,
}

impl<'a> IndexProvisioner<'a> {
    pub fn new(client: &'a Arc<dyn SearchClient>, lifecycle: &'a Lifecycle) -> Self {
        Self { client, lifecycle }
    }

    /// Ensure `index` exists, creating it when the store does not know it.
    ///
    /// An existing index is left untouched, so calling this repeatedly is
    /// safe. A creation request the store did not acknowledge is reported as
    /// [`ProvisionError::NotAcknowledged`].
    pub fn ensure(&self, index: &str) -> Result<(), ProvisionError> {
        let client = Arc::clone(self.client);
        let name = index.to_string();
        let exists = self
            .lifecycle
            .block_on(async move { client.index_exists(&name).await })
            .map_err(ProvisionError::from)?
            .map_err(ProvisionError::CheckFailed)?;

        if exists {
            tracing::debug!(index, "index already exists");
            return Ok(());
        }

        let client = Arc::clone(self.client);
        let name = index.to_string();
        let created = self
            .lifecycle
            .block_on(async move { client.create_index(&name).await })
            .map_err(ProvisionError::from)?
            .map_err(ProvisionError::CreateFailed)?;

        if !created.acknowledged {
            return Err(ProvisionError::NotAcknowledged);
        }

        tracing::debug!(index, "created index");
        Ok(())
    }
}
