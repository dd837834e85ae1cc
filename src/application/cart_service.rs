use std::sync::Arc;

use log::{info, warn};
use uuid::Uuid;

use crate::domain::cart::{
    price_cart, CartLineInput, CartView, CouponResolution, ProductSnapshot, RemovedLine,
    UpsertResult,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartStore, CouponLookup, ProductCatalog};

const MAX_USER_ID_LEN: usize = 255;
const MAX_COUPON_CODE_LEN: usize = 64;

/// Cart reads and mutations.
///
/// Store calls run on the blocking pool, so no connection is held while the
/// catalog and coupon services are awaited.
pub struct CartService<S, P, C> {
    store: Arc<S>,
    catalog: P,
    coupons: C,
}

impl<S: CartStore, P: ProductCatalog, C: CouponLookup> CartService<S, P, C> {
    pub fn new(store: S, catalog: P, coupons: C) -> Self {
        Self {
            store: Arc::new(store),
            catalog,
            coupons,
        }
    }

    /// Builds the priced view of a user's cart.
    ///
    /// Catalog and coupon failures degrade the view (see
    /// [`PricingStatus`](crate::domain::cart::PricingStatus)); only store
    /// failures and a missing cart are errors.
    pub async fn get_cart(&self, user_id: &str) -> Result<CartView, DomainError> {
        let user_id = validate_user_id(user_id)?;

        let (header, lines) = self
            .with_store(move |store| {
                let header = store
                    .find_header_by_user(&user_id)?
                    .ok_or(DomainError::CartNotFound)?;
                let lines = store.lines_for_header(header.id)?;
                Ok((header, lines))
            })
            .await?;

        let (products, coupon) = tokio::join!(
            self.fetch_products(),
            self.resolve_coupon(header.active_coupon_code())
        );

        Ok(price_cart(header, lines, products, coupon))
    }

    pub async fn upsert(
        &self,
        user_id: &str,
        line: CartLineInput,
    ) -> Result<UpsertResult, DomainError> {
        let user_id = validate_user_id(user_id)?;
        if line.quantity <= 0 {
            return Err(DomainError::InvalidInput(format!(
                "quantity must be positive, got {}",
                line.quantity
            )));
        }

        let result = self
            .with_store(move |store| store.upsert_line(&user_id, &line))
            .await?;
        info!(
            "Cart line {} for product {} is now at quantity {} ({:?})",
            result.line.id, result.line.product_id, result.line.quantity, result.outcome
        );
        Ok(result)
    }

    pub async fn apply_coupon(&self, user_id: &str, code: &str) -> Result<(), DomainError> {
        let user_id = validate_user_id(user_id)?;
        let code = code.trim();
        if code.is_empty() {
            return Err(DomainError::InvalidInput("coupon code is required".to_string()));
        }
        if code.len() > MAX_COUPON_CODE_LEN {
            return Err(DomainError::InvalidInput(format!(
                "coupon code is longer than {MAX_COUPON_CODE_LEN} characters"
            )));
        }
        let code = code.to_string();

        self.with_store(move |store| {
            let header = store
                .find_header_by_user(&user_id)?
                .ok_or(DomainError::CartNotFound)?;
            store.set_coupon_code(header.id, Some(&code))
        })
        .await
    }

    pub async fn remove_coupon(&self, user_id: &str) -> Result<(), DomainError> {
        let user_id = validate_user_id(user_id)?;

        self.with_store(move |store| {
            let header = store
                .find_header_by_user(&user_id)?
                .ok_or(DomainError::CartNotFound)?;
            store.set_coupon_code(header.id, None)
        })
        .await
    }

    pub async fn remove_line(&self, line_id: Uuid) -> Result<RemovedLine, DomainError> {
        let removed = self
            .with_store(move |store| store.remove_line(line_id))
            .await?;
        if removed.header_removed {
            info!(
                "Removed last line {} and its cart {}",
                removed.line_id, removed.cart_header_id
            );
        }
        Ok(removed)
    }

    async fn fetch_products(&self) -> Option<Vec<ProductSnapshot>> {
        match self.catalog.list_products().await {
            Ok(products) => Some(products),
            Err(e) => {
                warn!("Catalog unavailable, pricing cart without products: {e}");
                None
            }
        }
    }

    async fn resolve_coupon(&self, code: Option<&str>) -> CouponResolution {
        let Some(code) = code else {
            return CouponResolution::NotRequested;
        };
        match self.coupons.find_by_code(code).await {
            Ok(Some(coupon)) => CouponResolution::Resolved(coupon),
            Ok(None) => {
                info!("Coupon '{code}' is unknown, ignoring it for pricing");
                CouponResolution::Unresolved
            }
            Err(e) => {
                warn!("Coupon lookup for '{code}' failed, ignoring it for pricing: {e}");
                CouponResolution::Unresolved
            }
        }
    }

    async fn with_store<T, F>(&self, op: F) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T, DomainError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| DomainError::Store(format!("store task failed: {e}")))?
    }
}

/// User ids are kept exactly as given; `"u1 "` and `"u1"` own different carts.
fn validate_user_id(user_id: &str) -> Result<String, DomainError> {
    if user_id.trim().is_empty() {
        return Err(DomainError::InvalidInput("user id is required".to_string()));
    }
    if user_id.len() > MAX_USER_ID_LEN {
        return Err(DomainError::InvalidInput(format!(
            "user id is longer than {MAX_USER_ID_LEN} characters"
        )));
    }
    Ok(user_id.to_string())
}
