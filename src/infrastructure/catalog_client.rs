use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::domain::cart::ProductSnapshot;
use crate::domain::errors::RemoteError;
use crate::domain::ports::ProductCatalog;

use super::remote::{build_client, decimal_from_f64, endpoint, get_envelope};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDto {
    product_id: i32,
    name: String,
    price: f64,
}

impl TryFrom<ProductDto> for ProductSnapshot {
    type Error = RemoteError;

    fn try_from(dto: ProductDto) -> Result<Self, Self::Error> {
        Ok(ProductSnapshot {
            product_id: dto.product_id,
            name: dto.name,
            price: decimal_from_f64(dto.price)?,
        })
    }
}

/// Reads the product list from the catalog service.
pub struct HttpProductCatalog {
    client: Client,
    base_url: Url,
}

impl HttpProductCatalog {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, RemoteError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url,
        })
    }
}

impl ProductCatalog for HttpProductCatalog {
    async fn list_products(&self) -> Result<Vec<ProductSnapshot>, RemoteError> {
        let url = endpoint(&self.base_url, &["api", "ProductAPI"])?;
        let envelope = get_envelope::<Vec<ProductDto>>(&self.client, url)
            .await?
            .ok_or(RemoteError::Status(404))?;

        if !envelope.is_success {
            let message = envelope.message.unwrap_or_default();
            warn!("Catalog service rejected product listing: {message}");
            return Err(RemoteError::Rejected(message));
        }

        let products = envelope
            .result
            .unwrap_or_default()
            .into_iter()
            .map(ProductSnapshot::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Fetched {} products from catalog", products.len());
        Ok(products)
    }
}
