use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::cart::{CartHeader, CartLine};
use crate::schema::{cart_headers, cart_lines};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = cart_headers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartHeaderRow {
    pub id: Uuid,
    pub user_id: String,
    pub coupon_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cart_headers)]
pub struct NewCartHeaderRow<'a> {
    pub id: Uuid,
    pub user_id: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = cart_lines)]
#[diesel(belongs_to(CartHeaderRow, foreign_key = cart_header_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartLineRow {
    pub id: Uuid,
    pub cart_header_id: Uuid,
    pub product_id: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cart_lines)]
pub struct NewCartLineRow {
    pub id: Uuid,
    pub cart_header_id: Uuid,
    pub product_id: i32,
    pub quantity: i32,
}

impl From<CartHeaderRow> for CartHeader {
    fn from(row: CartHeaderRow) -> Self {
        CartHeader {
            id: row.id,
            user_id: row.user_id,
            coupon_code: row.coupon_code,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        CartLine {
            id: row.id,
            cart_header_id: row.cart_header_id,
            product_id: row.product_id,
            quantity: row.quantity,
        }
    }
}
