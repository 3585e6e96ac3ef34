//! Pizza controller — declarative food ordering
//!
//! Callers assert desired state (a customer, an order) as resources; the
//! controller's background reconcilers converge the commerce service
//! toward it and record progress as durable status conditions.
//!
//! # Module structure
//!
//! ```text
//! controller/src/
//! ├── config.rs      # env-driven process configuration
//! ├── store/         # resource collections + secret store collaborators
//! ├── engine/        # generic level-triggered reconciliation loop
//! ├── orders/        # order state machine + payload assembler
//! └── reconcilers/   # per-kind reconcilers (order, customer)
//! ```

pub mod config;
pub mod engine;
pub mod orders;
pub mod reconcilers;
pub mod store;

pub use config::Config;
pub use engine::{Engine, EngineConfig, Outcome, Reconcile};
pub use reconcilers::{CustomerReconciler, OrderReconciler};
pub use store::{Collection, MemorySecrets, SecretStore};
