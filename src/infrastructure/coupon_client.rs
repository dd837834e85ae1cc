use std::time::Duration;

use log::debug;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::domain::cart::Coupon;
use crate::domain::errors::RemoteError;
use crate::domain::ports::CouponLookup;

use super::remote::{build_client, decimal_from_f64, endpoint, get_envelope};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CouponDto {
    coupon_code: String,
    discount_amount: f64,
    min_amount: f64,
}

impl TryFrom<CouponDto> for Coupon {
    type Error = RemoteError;

    fn try_from(dto: CouponDto) -> Result<Self, Self::Error> {
        Ok(Coupon {
            code: dto.coupon_code,
            discount_amount: decimal_from_f64(dto.discount_amount)?,
            min_amount: decimal_from_f64(dto.min_amount)?,
        })
    }
}

/// Looks coupons up by code on the coupon service.
pub struct HttpCouponLookup {
    client: Client,
    base_url: Url,
}

impl HttpCouponLookup {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, RemoteError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url,
        })
    }
}

impl CouponLookup for HttpCouponLookup {
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, RemoteError> {
        let url = endpoint(&self.base_url, &["api", "CouponAPI", "GetByCode", code])?;
        let Some(envelope) = get_envelope::<CouponDto>(&self.client, url).await? else {
            debug!("Coupon '{code}' not found");
            return Ok(None);
        };

        // The coupon service answers an unknown code with isSuccess=false.
        match envelope.result {
            Some(dto) if envelope.is_success => Ok(Some(Coupon::try_from(dto)?)),
            _ => {
                debug!("Coupon '{code}' not found");
                Ok(None)
            }
        }
    }
}
