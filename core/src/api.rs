//! The four product operations, driven through a `Transport`.

use tracing::{info, warn};

use crate::client::ProductClient;
use crate::config::ClientConfig;
use crate::error::ApiResult;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Product, ProductBody, ProductId};

/// Async facade over `ProductClient`: build, execute, parse.
///
/// Each call suspends only while the transport is waiting on the network.
#[derive(Debug, Clone)]
pub struct ProductApi<T> {
    client: ProductClient,
    transport: T,
}

impl ProductApi<ReqwestTransport> {
    /// Production API over reqwest.
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        Ok(Self::new(
            ProductClient::new(&config.base_url),
            ReqwestTransport::new(config)?,
        ))
    }
}

impl<T: Transport> ProductApi<T> {
    pub fn new(client: ProductClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &ProductClient {
        &self.client
    }

    pub async fn list(&self) -> ApiResult<Vec<Product>> {
        let response = self.transport.execute(self.client.build_list_products()).await?;
        self.client
            .parse_list_products(response)
            .inspect_err(|e| warn!(error = %e, "listing products failed"))
    }

    pub async fn create(&self, body: &ProductBody) -> ApiResult<Option<Product>> {
        let request = self.client.build_create_product(body)?;
        let response = self.transport.execute(request).await?;
        let created = self
            .client
            .parse_create_product(response)
            .inspect_err(|e| warn!(error = %e, "creating product failed"))?;
        info!(name = %body.name, "product created");
        Ok(created)
    }

    pub async fn update(&self, id: &ProductId, body: &ProductBody) -> ApiResult<Option<Product>> {
        let request = self.client.build_update_product(id, body)?;
        let response = self.transport.execute(request).await?;
        let updated = self
            .client
            .parse_update_product(response)
            .inspect_err(|e| warn!(%id, error = %e, "updating product failed"))?;
        info!(%id, "product updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &ProductId) -> ApiResult<bool> {
        let response = self.transport.execute(self.client.build_delete_product(id)).await?;
        let deleted = self
            .client
            .parse_delete_product(response)
            .inspect_err(|e| warn!(%id, error = %e, "deleting product failed"))?;
        info!(%id, "product deleted");
        Ok(deleted)
    }
}
