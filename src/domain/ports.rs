use uuid::Uuid;

use super::cart::{
    CartHeader, CartLine, CartLineInput, Coupon, ProductSnapshot, RemovedLine, UpsertResult,
};
use super::errors::{DomainError, RemoteError};

/// Persistence for cart headers and their lines.
///
/// Implementations are synchronous; callers run them on the blocking pool.
pub trait CartStore: Send + Sync + 'static {
    fn find_header_by_user(&self, user_id: &str) -> Result<Option<CartHeader>, DomainError>;
    fn lines_for_header(&self, header_id: Uuid) -> Result<Vec<CartLine>, DomainError>;
    fn find_line(&self, line_id: Uuid) -> Result<Option<CartLine>, DomainError>;
    fn create_header(&self, user_id: &str) -> Result<CartHeader, DomainError>;
    fn create_line(
        &self,
        header_id: Uuid,
        product_id: i32,
        quantity: i32,
    ) -> Result<CartLine, DomainError>;
    fn update_line_quantity(&self, line_id: Uuid, quantity: i32) -> Result<CartLine, DomainError>;
    /// Fails with [`DomainError::LineNotFound`] when no row was deleted.
    fn delete_line(&self, line_id: Uuid) -> Result<(), DomainError>;
    /// Fails with [`DomainError::CartNotFound`] when no row was deleted.
    fn delete_header(&self, header_id: Uuid) -> Result<(), DomainError>;
    fn set_coupon_code(&self, header_id: Uuid, code: Option<&str>) -> Result<(), DomainError>;

    /// Adds `line` to the user's cart as one unit of work.
    ///
    /// Creates the header when missing, inserts the line when the product is
    /// new to the cart and otherwise adds to the existing line's quantity,
    /// keeping that line's id.
    fn upsert_line(&self, user_id: &str, line: &CartLineInput) -> Result<UpsertResult, DomainError>;

    /// Deletes a line and, if it was the last line of its cart, the header too.
    /// Both deletes commit or neither does.
    fn remove_line(&self, line_id: Uuid) -> Result<RemovedLine, DomainError>;
}

pub trait ProductCatalog: Send + Sync + 'static {
    async fn list_products(&self) -> Result<Vec<ProductSnapshot>, RemoteError>;
}

pub trait CouponLookup: Send + Sync + 'static {
    /// `Ok(None)` means the coupon service answered that the code is unknown.
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, RemoteError>;
}
