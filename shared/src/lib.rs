//! Shared types for the pizza controller
//!
//! This crate holds everything the controller and its collaborators agree
//! on, with no I/O of its own:
//!
//! - **Resources** (`models`): the declarative Customer / Store / Order
//!   types, each split into a caller-owned spec and a reconciler-owned
//!   status.
//! - **Resource plumbing** (`resource`): identity, optimistic-concurrency
//!   versions, references, and timestamped status conditions.
//! - **Errors** (`error`): the controller-wide error taxonomy.

pub mod error;
pub mod models;
pub mod resource;

pub use error::{Error, Result};
pub use models::{Customer, CustomerSpec, CustomerStatus};
pub use models::{Order, OrderItem, OrderSpec, OrderStatus};
pub use models::{CatalogProduct, Store, StoreSpec};
pub use resource::{
    condition, has_condition, upsert_condition, Condition, ObjectRef, Resource, ResourceKey,
    ResourceMeta,
};
