//! Infrastructure layer: persistence for customers, products, and orders.
//!
//! The store traits in [`store`] are the persistence boundary the services
//! above depend on. Two implementations exist: Postgres (production) and
//! in-memory (tests/dev), wired explicitly at process start — there is no
//! process-wide connection singleton.

pub mod store;

pub use store::memory::InMemoryStore;
pub use store::postgres::PostgresStore;
pub use store::{
    CustomerFilter, CustomerStore, HealthStore, OrderFilter, OrderStore, Page, ProductFilter,
    ProductStore, StoreError,
};
