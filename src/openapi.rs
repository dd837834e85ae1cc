use utoipa::OpenApi;

use crate::handlers::cart;

#[derive(OpenApi)]
#[openapi(
    paths(
        cart::get_cart,
        cart::upsert_line,
        cart::remove_line,
        cart::apply_coupon,
        cart::remove_coupon,
    ),
    components(schemas(
        cart::UpsertCartLineRequest,
        cart::ApplyCouponRequest,
        cart::CartResponse,
        cart::CartLineResponse,
        cart::ProductResponse,
        cart::PricingResponse,
        cart::ProductsAvailability,
        cart::CouponState,
        cart::UpsertCartLineResponse,
        cart::UpsertOutcomeResponse,
        cart::CouponResponse,
        cart::RemoveLineResponse,
    )),
    tags((name = "cart", description = "Shopping cart operations"))
)]
pub struct ApiDoc;
