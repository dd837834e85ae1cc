use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct CartHeader {
    pub id: Uuid,
    pub user_id: String,
    pub coupon_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartHeader {
    /// The stored coupon code, with blank codes treated as no coupon.
    pub fn active_coupon_code(&self) -> Option<&str> {
        self.coupon_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub id: Uuid,
    pub cart_header_id: Uuid,
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct CartLineInput {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub product_id: i32,
    pub name: String,
    pub price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coupon {
    pub code: String,
    pub discount_amount: BigDecimal,
    pub min_amount: BigDecimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No cart existed; header and line were both created.
    CreatedCart,
    /// The cart existed but did not yet hold this product.
    AddedLine,
    /// The product was already in the cart and its quantity was increased.
    MergedLine,
}

#[derive(Debug, Clone)]
pub struct UpsertResult {
    pub line: CartLine,
    pub outcome: UpsertOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemovedLine {
    pub line_id: Uuid,
    pub cart_header_id: Uuid,
    pub header_removed: bool,
}

/// How much of the catalog data needed to price the cart was available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductsStatus {
    Complete,
    /// The catalog answered but did not know these product ids.
    Partial { missing: Vec<i32> },
    /// The catalog call failed; no line carries a price.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponStatus {
    /// No coupon code is stored on the cart.
    None,
    Applied,
    /// The coupon exists but the cart does not exceed its minimum amount.
    BelowMinimum,
    /// The coupon was not found, or the coupon service could not be reached.
    /// The two cases are intentionally not told apart.
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingStatus {
    pub products: ProductsStatus,
    pub coupon: CouponStatus,
}

impl PricingStatus {
    pub fn is_complete(&self) -> bool {
        self.products == ProductsStatus::Complete
            && matches!(
                self.coupon,
                CouponStatus::None | CouponStatus::Applied | CouponStatus::BelowMinimum
            )
    }
}

/// Result of looking up the cart's coupon, before pricing.
#[derive(Debug, Clone)]
pub enum CouponResolution {
    NotRequested,
    Resolved(Coupon),
    Unresolved,
}

#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: Uuid,
    pub product_id: i32,
    pub quantity: i32,
    pub product: Option<ProductSnapshot>,
    pub line_total: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct CartView {
    pub header_id: Uuid,
    pub user_id: String,
    pub coupon_code: Option<String>,
    pub subtotal: BigDecimal,
    pub discount: BigDecimal,
    pub total: BigDecimal,
    pub lines: Vec<CartLineView>,
    pub pricing: PricingStatus,
}

/// Joins cart lines with the catalog snapshot and applies the coupon.
///
/// `products` is `None` when the catalog could not be reached. Lines whose
/// product is unknown stay in the view with a zero line total. The coupon
/// discount is only taken when the subtotal is strictly greater than the
/// coupon's minimum amount.
pub fn price_cart(
    header: CartHeader,
    lines: Vec<CartLine>,
    products: Option<Vec<ProductSnapshot>>,
    coupon: CouponResolution,
) -> CartView {
    let catalog_available = products.is_some();
    let by_id: HashMap<i32, ProductSnapshot> = products
        .unwrap_or_default()
        .into_iter()
        .map(|p| (p.product_id, p))
        .collect();

    let mut missing = Vec::new();
    let lines: Vec<CartLineView> = lines
        .into_iter()
        .map(|line| {
            let product = by_id.get(&line.product_id).cloned();
            let line_total = match &product {
                Some(p) => &p.price * BigDecimal::from(line.quantity),
                None => {
                    missing.push(line.product_id);
                    BigDecimal::from(0)
                }
            };
            CartLineView {
                id: line.id,
                product_id: line.product_id,
                quantity: line.quantity,
                product,
                line_total,
            }
        })
        .collect();

    let subtotal = lines
        .iter()
        .fold(BigDecimal::from(0), |acc, l| acc + &l.line_total);

    let (discount, coupon_status) = match coupon {
        CouponResolution::NotRequested => (BigDecimal::from(0), CouponStatus::None),
        CouponResolution::Unresolved => (BigDecimal::from(0), CouponStatus::Unresolved),
        CouponResolution::Resolved(c) if subtotal > c.min_amount => {
            (c.discount_amount, CouponStatus::Applied)
        }
        CouponResolution::Resolved(_) => (BigDecimal::from(0), CouponStatus::BelowMinimum),
    };

    let products_status = if !catalog_available {
        ProductsStatus::Unavailable
    } else if missing.is_empty() {
        ProductsStatus::Complete
    } else {
        ProductsStatus::Partial { missing }
    };

    CartView {
        header_id: header.id,
        user_id: header.user_id,
        coupon_code: header.coupon_code,
        total: &subtotal - &discount,
        subtotal,
        discount,
        lines,
        pricing: PricingStatus {
            products: products_status,
            coupon: coupon_status,
        },
    }
}
