//! Test doubles shared by the service and handler tests.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use mockall::mock;
use uuid::Uuid;

use crate::domain::cart::{
    CartHeader, CartLine, CartLineInput, Coupon, ProductSnapshot, RemovedLine, UpsertOutcome,
    UpsertResult,
};
use crate::domain::errors::{DomainError, RemoteError};
use crate::domain::ports::{CartStore, CouponLookup, ProductCatalog};

mock! {
    pub Catalog {}
    impl ProductCatalog for Catalog {
        async fn list_products(&self) -> Result<Vec<ProductSnapshot>, RemoteError>;
    }
}

mock! {
    pub Coupons {}
    impl CouponLookup for Coupons {
        async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, RemoteError>;
    }
}

#[derive(Debug, Default)]
struct State {
    headers: Vec<CartHeader>,
    lines: Vec<CartLine>,
}

/// Cart store backed by two vectors behind one mutex, so every operation is
/// atomic the way the database transactions are.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartStore {
    state: Arc<Mutex<State>>,
    failure: Option<String>,
}

impl InMemoryCartStore {
    /// A store whose every operation fails with `DomainError::Store`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        if let Some(message) = &self.failure {
            return Err(DomainError::Store(message.clone()));
        }
        self.state
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))
    }

    pub fn header_for_user(&self, user_id: &str) -> Option<CartHeader> {
        let state = self.state.lock().unwrap();
        state.headers.iter().find(|h| h.user_id == user_id).cloned()
    }

    pub fn lines_for_user(&self, user_id: &str) -> Vec<CartLine> {
        let Some(header) = self.header_for_user(user_id) else {
            return Vec::new();
        };
        let state = self.state.lock().unwrap();
        state
            .lines
            .iter()
            .filter(|l| l.cart_header_id == header.id)
            .cloned()
            .collect()
    }

    pub fn header_count(&self) -> usize {
        self.state.lock().unwrap().headers.len()
    }

    pub fn line_count(&self) -> usize {
        self.state.lock().unwrap().lines.len()
    }

    /// Panics if a header has no lines or a line has no header.
    pub fn assert_consistent(&self) {
        let state = self.state.lock().unwrap();
        for header in &state.headers {
            assert!(
                state.lines.iter().any(|l| l.cart_header_id == header.id),
                "header {} has no lines",
                header.id
            );
        }
        for line in &state.lines {
            assert!(
                state.headers.iter().any(|h| h.id == line.cart_header_id),
                "line {} has no header",
                line.id
            );
        }
    }
}

fn new_header(user_id: &str) -> CartHeader {
    let now = Utc::now();
    CartHeader {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        coupon_code: None,
        created_at: now,
        updated_at: now,
    }
}

fn new_line(header_id: Uuid, product_id: i32, quantity: i32) -> CartLine {
    CartLine {
        id: Uuid::new_v4(),
        cart_header_id: header_id,
        product_id,
        quantity,
    }
}

impl CartStore for InMemoryCartStore {
    fn find_header_by_user(&self, user_id: &str) -> Result<Option<CartHeader>, DomainError> {
        let state = self.state()?;
        Ok(state.headers.iter().find(|h| h.user_id == user_id).cloned())
    }

    fn lines_for_header(&self, header_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        let state = self.state()?;
        Ok(state
            .lines
            .iter()
            .filter(|l| l.cart_header_id == header_id)
            .cloned()
            .collect())
    }

    fn find_line(&self, line_id: Uuid) -> Result<Option<CartLine>, DomainError> {
        let state = self.state()?;
        Ok(state.lines.iter().find(|l| l.id == line_id).cloned())
    }

    fn create_header(&self, user_id: &str) -> Result<CartHeader, DomainError> {
        let mut state = self.state()?;
        if state.headers.iter().any(|h| h.user_id == user_id) {
            return Err(DomainError::Store(format!(
                "duplicate cart header for {user_id}"
            )));
        }
        let header = new_header(user_id);
        state.headers.push(header.clone());
        Ok(header)
    }

    fn create_line(
        &self,
        header_id: Uuid,
        product_id: i32,
        quantity: i32,
    ) -> Result<CartLine, DomainError> {
        let mut state = self.state()?;
        let line = new_line(header_id, product_id, quantity);
        state.lines.push(line.clone());
        Ok(line)
    }

    fn update_line_quantity(&self, line_id: Uuid, quantity: i32) -> Result<CartLine, DomainError> {
        let mut state = self.state()?;
        let line = state
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or(DomainError::LineNotFound)?;
        line.quantity = quantity;
        Ok(line.clone())
    }

    fn delete_line(&self, line_id: Uuid) -> Result<(), DomainError> {
        let mut state = self.state()?;
        let before = state.lines.len();
        state.lines.retain(|l| l.id != line_id);
        if state.lines.len() == before {
            return Err(DomainError::LineNotFound);
        }
        Ok(())
    }

    fn delete_header(&self, header_id: Uuid) -> Result<(), DomainError> {
        let mut state = self.state()?;
        let before = state.headers.len();
        state.headers.retain(|h| h.id != header_id);
        if state.headers.len() == before {
            return Err(DomainError::CartNotFound);
        }
        state.lines.retain(|l| l.cart_header_id != header_id);
        Ok(())
    }

    fn set_coupon_code(&self, header_id: Uuid, code: Option<&str>) -> Result<(), DomainError> {
        let mut state = self.state()?;
        let header = state
            .headers
            .iter_mut()
            .find(|h| h.id == header_id)
            .ok_or(DomainError::CartNotFound)?;
        header.coupon_code = code.map(str::to_string);
        header.updated_at = Utc::now();
        Ok(())
    }

    fn upsert_line(&self, user_id: &str, line: &CartLineInput) -> Result<UpsertResult, DomainError> {
        let mut state = self.state()?;

        let existing_header = state
            .headers
            .iter()
            .find(|h| h.user_id == user_id)
            .map(|h| h.id);
        let (header_id, created_cart) = match existing_header {
            Some(id) => (id, false),
            None => {
                let header = new_header(user_id);
                let id = header.id;
                state.headers.push(header);
                (id, true)
            }
        };

        if let Some(existing) = state
            .lines
            .iter_mut()
            .find(|l| l.cart_header_id == header_id && l.product_id == line.product_id)
        {
            existing.quantity = existing
                .quantity
                .checked_add(line.quantity)
                .ok_or_else(|| DomainError::quantity_overflow(line.product_id))?;
            return Ok(UpsertResult {
                line: existing.clone(),
                outcome: UpsertOutcome::MergedLine,
            });
        }

        let created = new_line(header_id, line.product_id, line.quantity);
        state.lines.push(created.clone());
        Ok(UpsertResult {
            line: created,
            outcome: if created_cart {
                UpsertOutcome::CreatedCart
            } else {
                UpsertOutcome::AddedLine
            },
        })
    }

    fn remove_line(&self, line_id: Uuid) -> Result<RemovedLine, DomainError> {
        let mut state = self.state()?;

        let header_id = state
            .lines
            .iter()
            .find(|l| l.id == line_id)
            .map(|l| l.cart_header_id)
            .ok_or(DomainError::LineNotFound)?;
        let siblings = state
            .lines
            .iter()
            .filter(|l| l.cart_header_id == header_id)
            .count();

        state.lines.retain(|l| l.id != line_id);
        let header_removed = siblings <= 1;
        if header_removed {
            state.headers.retain(|h| h.id != header_id);
        }

        Ok(RemovedLine {
            line_id,
            cart_header_id: header_id,
            header_removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_follow_store_contract() {
        let store = InMemoryCartStore::default();

        let header = store.create_header("u1").unwrap();
        assert!(store.create_header("u1").is_err());
        let line = store.create_line(header.id, 7, 1).unwrap();

        assert_eq!(store.find_line(line.id).unwrap(), Some(line.clone()));
        assert_eq!(store.update_line_quantity(line.id, 3).unwrap().quantity, 3);
        store.set_coupon_code(header.id, Some("SAVE10")).unwrap();
        assert_eq!(
            store.find_header_by_user("u1").unwrap().unwrap().coupon_code.as_deref(),
            Some("SAVE10")
        );

        store.delete_line(line.id).unwrap();
        assert!(matches!(store.delete_line(line.id), Err(DomainError::LineNotFound)));
        store.delete_header(header.id).unwrap();
        assert!(matches!(
            store.delete_header(header.id),
            Err(DomainError::CartNotFound)
        ));
    }
}
