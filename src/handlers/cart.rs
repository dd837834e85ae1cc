use actix_web::{web, HttpResponse};
use bigdecimal::num_bigint::Sign;
use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::cart_service::CartService;
use crate::domain::cart::{
    CartLineInput, CartView, CouponStatus, ProductsStatus, RemovedLine, UpsertOutcome,
    UpsertResult,
};
use crate::domain::ports::{CartStore, CouponLookup, ProductCatalog};
use crate::errors::AppError;
use crate::handlers::envelope::ResponseEnvelope;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertCartLineRequest {
    pub user_id: String,
    pub product_id: i32,
    /// Added to the existing quantity when the product is already in the cart.
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyCouponRequest {
    pub coupon_code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub product_id: i32,
    pub name: String,
    /// Decimal price as a string, e.g. "9.99"
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub id: Uuid,
    pub product_id: i32,
    pub quantity: i32,
    /// Absent when the catalog did not return this product.
    pub product: Option<ProductResponse>,
    pub line_total: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductsAvailability {
    Complete,
    Partial,
    Unavailable,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CouponState {
    None,
    Applied,
    BelowMinimum,
    /// Unknown code or coupon service unreachable.
    Unresolved,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PricingResponse {
    /// False when any product or the stored coupon could not be resolved.
    pub complete: bool,
    pub products: ProductsAvailability,
    pub missing_product_ids: Vec<i32>,
    pub coupon: CouponState,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub cart_header_id: Uuid,
    pub user_id: String,
    pub coupon_code: Option<String>,
    pub subtotal: String,
    pub discount: String,
    pub total: String,
    pub lines: Vec<CartLineResponse>,
    pub pricing: PricingResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcomeResponse {
    CreatedCart,
    AddedLine,
    MergedLine,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpsertCartLineResponse {
    pub line_id: Uuid,
    pub cart_header_id: Uuid,
    pub product_id: i32,
    pub quantity: i32,
    pub outcome: UpsertOutcomeResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CouponResponse {
    pub user_id: String,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemoveLineResponse {
    pub line_id: Uuid,
    pub cart_header_id: Uuid,
    /// True when the removed line was the last one and the cart went with it.
    pub cart_removed: bool,
}

/// Renders an amount in cents precision, rounding half up: `0` becomes
/// `"0.00"`, `100.005` becomes `"100.01"`.
fn money(amount: &BigDecimal) -> String {
    let (cents, _) = amount
        .with_scale_round(2, RoundingMode::HalfUp)
        .into_bigint_and_exponent();
    let sign = if cents.sign() == Sign::Minus { "-" } else { "" };
    let digits = format!("{:0>3}", cents.magnitude().to_string());
    let (units, fraction) = digits.split_at(digits.len() - 2);
    format!("{sign}{units}.{fraction}")
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        let complete = view.pricing.is_complete();
        let (products, missing_product_ids) = match view.pricing.products {
            ProductsStatus::Complete => (ProductsAvailability::Complete, vec![]),
            ProductsStatus::Partial { missing } => (ProductsAvailability::Partial, missing),
            ProductsStatus::Unavailable => (ProductsAvailability::Unavailable, vec![]),
        };
        let coupon = match view.pricing.coupon {
            CouponStatus::None => CouponState::None,
            CouponStatus::Applied => CouponState::Applied,
            CouponStatus::BelowMinimum => CouponState::BelowMinimum,
            CouponStatus::Unresolved => CouponState::Unresolved,
        };

        CartResponse {
            cart_header_id: view.header_id,
            user_id: view.user_id,
            coupon_code: view.coupon_code,
            subtotal: money(&view.subtotal),
            discount: money(&view.discount),
            total: money(&view.total),
            lines: view
                .lines
                .into_iter()
                .map(|l| CartLineResponse {
                    id: l.id,
                    product_id: l.product_id,
                    quantity: l.quantity,
                    line_total: money(&l.line_total),
                    product: l.product.map(|p| ProductResponse {
                        product_id: p.product_id,
                        name: p.name,
                        price: money(&p.price),
                    }),
                })
                .collect(),
            pricing: PricingResponse {
                complete,
                products,
                missing_product_ids,
                coupon,
            },
        }
    }
}

impl From<UpsertResult> for UpsertCartLineResponse {
    fn from(result: UpsertResult) -> Self {
        UpsertCartLineResponse {
            line_id: result.line.id,
            cart_header_id: result.line.cart_header_id,
            product_id: result.line.product_id,
            quantity: result.line.quantity,
            outcome: match result.outcome {
                UpsertOutcome::CreatedCart => UpsertOutcomeResponse::CreatedCart,
                UpsertOutcome::AddedLine => UpsertOutcomeResponse::AddedLine,
                UpsertOutcome::MergedLine => UpsertOutcomeResponse::MergedLine,
            },
        }
    }
}

impl From<RemovedLine> for RemoveLineResponse {
    fn from(removed: RemovedLine) -> Self {
        RemoveLineResponse {
            line_id: removed.line_id,
            cart_header_id: removed.cart_header_id,
            cart_removed: removed.header_removed,
        }
    }
}

// ── Routing ──────────────────────────────────────────────────────────────────

/// Registers the cart routes for a service built from `S`, `P` and `C`.
///
/// Malformed JSON bodies and path parameters are answered with the same
/// envelope as every other failure.
pub fn configure<S, P, C>(cfg: &mut web::ServiceConfig)
where
    S: CartStore,
    P: ProductCatalog,
    C: CouponLookup,
{
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api/cart")
            .service(web::resource("/lines").route(web::post().to(upsert_line::<S, P, C>)))
            .service(
                web::resource("/lines/{line_id}").route(web::delete().to(remove_line::<S, P, C>)),
            )
            .service(web::resource("/{user_id}").route(web::get().to(get_cart::<S, P, C>)))
            .service(
                web::resource("/{user_id}/coupon")
                    .route(web::put().to(apply_coupon::<S, P, C>))
                    .route(web::delete().to(remove_coupon::<S, P, C>)),
            ),
    );
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/cart/{user_id}
///
/// Returns the user's cart priced against the live catalog, with the stored
/// coupon applied when the cart qualifies. Catalog or coupon outages degrade
/// the `pricing` block instead of failing the request.
#[utoipa::path(
    get,
    path = "/api/cart/{user_id}",
    params(
        ("user_id" = String, Path, description = "Owner of the cart"),
    ),
    responses(
        (status = 200, description = "Priced cart", body = ResponseEnvelope<CartResponse>),
        (status = 400, description = "Invalid user id"),
        (status = 404, description = "Cart not found for this user"),
        (status = 500, description = "Cart store failure"),
    ),
    tag = "cart"
)]
pub async fn get_cart<S: CartStore, P: ProductCatalog, C: CouponLookup>(
    service: web::Data<CartService<S, P, C>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let view = service.get_cart(&user_id).await?;
    Ok(HttpResponse::Ok().json(ResponseEnvelope::ok(CartResponse::from(view))))
}

/// POST /api/cart/lines
///
/// Adds a product to the user's cart, creating the cart on first use and
/// merging quantities when the product is already present.
#[utoipa::path(
    post,
    path = "/api/cart/lines",
    request_body = UpsertCartLineRequest,
    responses(
        (status = 200, description = "Resulting cart line", body = ResponseEnvelope<UpsertCartLineResponse>),
        (status = 400, description = "Invalid user id or quantity"),
        (status = 500, description = "Cart store failure"),
    ),
    tag = "cart"
)]
pub async fn upsert_line<S: CartStore, P: ProductCatalog, C: CouponLookup>(
    service: web::Data<CartService<S, P, C>>,
    body: web::Json<UpsertCartLineRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let result = service
        .upsert(
            &body.user_id,
            CartLineInput {
                product_id: body.product_id,
                quantity: body.quantity,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(ResponseEnvelope::ok(UpsertCartLineResponse::from(result))))
}

/// DELETE /api/cart/lines/{line_id}
///
/// Removes one line; removing the last line also removes the cart.
#[utoipa::path(
    delete,
    path = "/api/cart/lines/{line_id}",
    params(
        ("line_id" = Uuid, Path, description = "Cart line UUID"),
    ),
    responses(
        (status = 200, description = "Line removed", body = ResponseEnvelope<RemoveLineResponse>),
        (status = 404, description = "Cart line not found"),
        (status = 500, description = "Cart store failure"),
    ),
    tag = "cart"
)]
pub async fn remove_line<S: CartStore, P: ProductCatalog, C: CouponLookup>(
    service: web::Data<CartService<S, P, C>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let removed = service.remove_line(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ResponseEnvelope::ok(RemoveLineResponse::from(removed))))
}

/// PUT /api/cart/{user_id}/coupon
#[utoipa::path(
    put,
    path = "/api/cart/{user_id}/coupon",
    params(
        ("user_id" = String, Path, description = "Owner of the cart"),
    ),
    request_body = ApplyCouponRequest,
    responses(
        (status = 200, description = "Coupon stored on the cart", body = ResponseEnvelope<CouponResponse>),
        (status = 400, description = "Invalid user id or coupon code"),
        (status = 404, description = "Cart not found for this user"),
        (status = 500, description = "Cart store failure"),
    ),
    tag = "cart"
)]
pub async fn apply_coupon<S: CartStore, P: ProductCatalog, C: CouponLookup>(
    service: web::Data<CartService<S, P, C>>,
    path: web::Path<String>,
    body: web::Json<ApplyCouponRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let code = body.into_inner().coupon_code;
    service.apply_coupon(&user_id, &code).await?;
    Ok(HttpResponse::Ok().json(ResponseEnvelope::ok(CouponResponse {
        user_id,
        coupon_code: Some(code.trim().to_string()),
    })))
}

/// DELETE /api/cart/{user_id}/coupon
#[utoipa::path(
    delete,
    path = "/api/cart/{user_id}/coupon",
    params(
        ("user_id" = String, Path, description = "Owner of the cart"),
    ),
    responses(
        (status = 200, description = "Coupon cleared", body = ResponseEnvelope<CouponResponse>),
        (status = 404, description = "Cart not found for this user"),
        (status = 500, description = "Cart store failure"),
    ),
    tag = "cart"
)]
pub async fn remove_coupon<S: CartStore, P: ProductCatalog, C: CouponLookup>(
    service: web::Data<CartService<S, P, C>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    service.remove_coupon(&user_id).await?;
    Ok(HttpResponse::Ok().json(ResponseEnvelope::ok(CouponResponse {
        user_id,
        coupon_code: None,
    })))
}
