//! Declarative resource models
//!
//! Each resource splits into a caller-owned `spec` (desired state) and a
//! reconciler-owned `status` (observed progress). The reconcilers never
//! write specs, callers never write statuses.

mod customer;
mod order;
mod store;

pub use customer::{Customer, CustomerSpec, CustomerStatus};
pub use order::{Order, OrderItem, OrderSpec, OrderStatus};
pub use store::{CatalogProduct, Store, StoreSpec};
