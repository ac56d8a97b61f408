//! Customer Directory domain module.
//!
//! Customers are plain field-level records: no derived state, no lifecycle
//! beyond create/update. Referential checks against customers happen (or
//! deliberately don't) in the consumers of this crate.

pub mod customer;

pub use customer::{Customer, CustomerPatch, NewCustomer};
