use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{
    CartHeader, CartLine, CartLineInput, RemovedLine, UpsertOutcome, UpsertResult,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartStore;
use crate::schema::{cart_headers, cart_lines};

use super::models::{CartHeaderRow, CartLineRow, NewCartHeaderRow, NewCartLineRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Store(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Store(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselCartStore {
    pool: DbPool,
}

impl DieselCartStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CartStore for DieselCartStore {
    fn find_header_by_user(&self, user_id: &str) -> Result<Option<CartHeader>, DomainError> {
        let mut conn = self.pool.get()?;

        let header = cart_headers::table
            .filter(cart_headers::user_id.eq(user_id))
            .select(CartHeaderRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(header.map(Into::into))
    }

    fn lines_for_header(&self, header_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;

        let lines = cart_lines::table
            .filter(cart_lines::cart_header_id.eq(header_id))
            .select(CartLineRow::as_select())
            .order(cart_lines::created_at.asc())
            .load(&mut conn)?;

        Ok(lines.into_iter().map(Into::into).collect())
    }

    fn find_line(&self, line_id: Uuid) -> Result<Option<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;

        let line = cart_lines::table
            .find(line_id)
            .select(CartLineRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(line.map(Into::into))
    }

    fn create_header(&self, user_id: &str) -> Result<CartHeader, DomainError> {
        let mut conn = self.pool.get()?;

        let header = diesel::insert_into(cart_headers::table)
            .values(&NewCartHeaderRow {
                id: Uuid::new_v4(),
                user_id,
            })
            .returning(CartHeaderRow::as_returning())
            .get_result(&mut conn)?;

        Ok(header.into())
    }

    fn create_line(
        &self,
        header_id: Uuid,
        product_id: i32,
        quantity: i32,
    ) -> Result<CartLine, DomainError> {
        let mut conn = self.pool.get()?;

        let line = diesel::insert_into(cart_lines::table)
            .values(&NewCartLineRow {
                id: Uuid::new_v4(),
                cart_header_id: header_id,
                product_id,
                quantity,
            })
            .returning(CartLineRow::as_returning())
            .get_result(&mut conn)?;

        Ok(line.into())
    }

    fn update_line_quantity(&self, line_id: Uuid, quantity: i32) -> Result<CartLine, DomainError> {
        let mut conn = self.pool.get()?;

        let line = diesel::update(cart_lines::table.find(line_id))
            .set((
                cart_lines::quantity.eq(quantity),
                cart_lines::updated_at.eq(Utc::now()),
            ))
            .returning(CartLineRow::as_returning())
            .get_result(&mut conn)
            .optional()?;

        line.map(Into::into).ok_or(DomainError::LineNotFound)
    }

    fn delete_line(&self, line_id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        match diesel::delete(cart_lines::table.find(line_id)).execute(&mut conn)? {
            0 => Err(DomainError::LineNotFound),
            _ => Ok(()),
        }
    }

    fn delete_header(&self, header_id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        match diesel::delete(cart_headers::table.find(header_id)).execute(&mut conn)? {
            0 => Err(DomainError::CartNotFound),
            _ => Ok(()),
        }
    }

    fn set_coupon_code(&self, header_id: Uuid, code: Option<&str>) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(cart_headers::table.find(header_id))
            .set((
                cart_headers::coupon_code.eq(code),
                cart_headers::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        match updated {
            0 => Err(DomainError::CartNotFound),
            _ => Ok(()),
        }
    }

    fn upsert_line(&self, user_id: &str, line: &CartLineInput) -> Result<UpsertResult, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert or touch the header in one statement. Either way the
            //    row stays locked until commit, so upserts into one cart run
            //    one after another and a concurrent removal cannot slip in.
            let new_header_id = Uuid::new_v4();
            let header_id = diesel::insert_into(cart_headers::table)
                .values(&NewCartHeaderRow {
                    id: new_header_id,
                    user_id,
                })
                .on_conflict(cart_headers::user_id)
                .do_update()
                .set(cart_headers::updated_at.eq(Utc::now()))
                .returning(cart_headers::id)
                .get_result::<Uuid>(conn)?;
            let created_cart = header_id == new_header_id;

            // 2. Check the merged quantity fits before Postgres rejects it.
            let existing = cart_lines::table
                .filter(cart_lines::cart_header_id.eq(header_id))
                .filter(cart_lines::product_id.eq(line.product_id))
                .select(cart_lines::quantity)
                .first::<i32>(conn)
                .optional()?;
            if let Some(quantity) = existing {
                if quantity.checked_add(line.quantity).is_none() {
                    return Err(DomainError::quantity_overflow(line.product_id));
                }
            }

            // 3. Insert the line or add to the quantity of the existing row
            //    for this product, keeping its id.
            let row = diesel::insert_into(cart_lines::table)
                .values(&NewCartLineRow {
                    id: Uuid::new_v4(),
                    cart_header_id: header_id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .on_conflict((cart_lines::cart_header_id, cart_lines::product_id))
                .do_update()
                .set((
                    cart_lines::quantity.eq(cart_lines::quantity + excluded(cart_lines::quantity)),
                    cart_lines::updated_at.eq(Utc::now()),
                ))
                .returning(CartLineRow::as_returning())
                .get_result(conn)?;

            let outcome = match (created_cart, existing) {
                (true, _) => UpsertOutcome::CreatedCart,
                (false, Some(_)) => UpsertOutcome::MergedLine,
                (false, None) => UpsertOutcome::AddedLine,
            };

            Ok(UpsertResult {
                line: row.into(),
                outcome,
            })
        })
    }

    fn remove_line(&self, line_id: Uuid) -> Result<RemovedLine, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let header_id = cart_lines::table
                .find(line_id)
                .select(cart_lines::cart_header_id)
                .first::<Uuid>(conn)
                .optional()?
                .ok_or(DomainError::LineNotFound)?;

            // Lock the header so two removals racing for the last lines of
            // one cart see each other's deletes. A header removed in between
            // took this line with it.
            cart_headers::table
                .find(header_id)
                .select(cart_headers::id)
                .for_update()
                .first::<Uuid>(conn)
                .optional()?
                .ok_or(DomainError::LineNotFound)?;

            let siblings: i64 = cart_lines::table
                .filter(cart_lines::cart_header_id.eq(header_id))
                .count()
                .get_result(conn)?;

            if diesel::delete(cart_lines::table.find(line_id)).execute(conn)? == 0 {
                return Err(DomainError::LineNotFound);
            }

            let header_removed = siblings <= 1;
            if header_removed {
                diesel::delete(cart_headers::table.find(header_id)).execute(conn)?;
            }

            Ok(RemovedLine {
                line_id,
                cart_header_id: header_id,
                header_removed,
            })
        })
    }
}
