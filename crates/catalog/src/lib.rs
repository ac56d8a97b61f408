//! Product Catalog domain module.
//!
//! Owns product identity, the current list price, and the active flag.
//! Order pricing reads the catalog through [`PriceQuote`] — a point-in-time
//! copy of the price, never a live reference.

pub mod product;

pub use product::{NewProduct, PriceQuote, Product, ProductPatch};
