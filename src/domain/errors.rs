use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Cart not found for this user.")]
    CartNotFound,
    #[error("Cart line not found.")]
    LineNotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Store error: {0}")]
    Store(String),
}

impl DomainError {
    /// The merged quantity of a cart line would not fit in the quantity column.
    pub fn quantity_overflow(product_id: i32) -> Self {
        DomainError::InvalidInput(format!(
            "quantity for product {product_id} would exceed {}",
            i32::MAX
        ))
    }
}

/// Failure talking to the catalog or coupon service.
///
/// These never escape the aggregator: they are absorbed into a degraded
/// [`CartView`](super::cart::CartView).
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("service reported failure: {0}")]
    Rejected(String),
}
