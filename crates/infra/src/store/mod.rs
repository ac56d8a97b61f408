//! Store traits and shared query/error types.
//!
//! Every trait method is one logical persistence operation: atomic multi-row
//! write (order + items), point lookup, or filtered/paginated listing.
//! Implementations must guarantee that `create_order` is all-or-nothing and
//! that hydration never observes an item list mid-insert.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use storders_catalog::{NewProduct, Product, ProductPatch};
use storders_core::{CustomerId, DomainError, OrderId, ProductId};
use storders_directory::{Customer, CustomerPatch, NewCustomer};
use storders_orders::{NewOrder, Order, OrderStatus, OrderUpdate};

pub mod memory;
pub mod postgres;

/// Default and maximum page size for list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Bounded retry count for the transactional create path (order-number
/// count + insert); a conflict aborts the attempt and the whole creation is
/// replayed.
pub const MAX_CREATE_ATTEMPTS: u32 = 3;

/// Storage-level error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced entity does not exist (client-input error; nothing was
    /// persisted).
    #[error("{entity} {id} not found")]
    ReferenceNotFound { entity: &'static str, id: Uuid },

    /// Unique-constraint or serialization conflict. The order creation path
    /// retries these internally; elsewhere they surface as caller-visible
    /// conflicts (e.g. duplicate part number).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Retries for a transactional sequence were exhausted; the request
    /// may succeed if replayed.
    #[error("transient storage conflict: {0}")]
    Transient(String),

    /// A domain invariant failed inside the store path (e.g. order-number
    /// sequence exhausted).
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(String),
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        StoreError::Invariant(err.to_string())
    }
}

/// Offset/limit window for list operations. The limit is clamped to
/// [`MAX_PAGE_SIZE`] at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

impl Page {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Customer list filters (AND-combined).
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    /// Substring match over company name or contact name.
    pub search: Option<String>,
    pub country: Option<String>,
}

/// Product list filters (AND-combined). Listing only returns active
/// products; point lookups and order pricing see inactive ones too.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub family: Option<String>,
    /// Substring match over name, part number, or description.
    pub search: Option<String>,
}

/// Order list filters (AND-combined).
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<CustomerId>,
}

/// Cheap backing-store connectivity probe for readiness checks.
#[async_trait]
pub trait HealthStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Customer Directory persistence.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn create_customer(&self, new: NewCustomer) -> Result<Customer, StoreError>;
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
    async fn list_customers(
        &self,
        filter: CustomerFilter,
        page: Page,
    ) -> Result<Vec<Customer>, StoreError>;
    async fn update_customer(
        &self,
        id: CustomerId,
        patch: CustomerPatch,
    ) -> Result<Option<Customer>, StoreError>;
}

/// Product Catalog persistence.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError>;
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: Page,
    ) -> Result<Vec<Product>, StoreError>;
    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError>;
    /// Soft delete: flips `is_active` off, keeps the row resolvable.
    async fn deactivate_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
}

/// Order lifecycle + query persistence.
///
/// `create_order` performs the whole creation sequence: count the month
/// prefix, assign the number, resolve authoritative line prices from the
/// catalog, and write order + items as one atomic unit. Absent target ids
/// are reported as `Ok(None)`, not as errors.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, new: NewOrder) -> Result<Order, StoreError>;
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
    async fn list_orders(&self, filter: OrderFilter, page: Page) -> Result<Vec<Order>, StoreError>;
    async fn update_order(
        &self,
        id: OrderId,
        update: OrderUpdate,
    ) -> Result<Option<Order>, StoreError>;
    async fn cancel_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_limit_is_clamped_to_the_window() {
        assert_eq!(Page::new(0, 500).limit, MAX_PAGE_SIZE);
        assert_eq!(Page::new(0, 0).limit, 1);
        assert_eq!(Page::new(20, 50), Page { offset: 20, limit: 50 });
        assert_eq!(Page::default().limit, DEFAULT_PAGE_SIZE);
    }
}
