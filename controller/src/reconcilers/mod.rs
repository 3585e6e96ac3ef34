//! Per-kind reconcilers
//!
//! Each reconciler implements [`crate::engine::Reconcile`] for one
//! resource kind and is driven by its own engine. Passes are
//! read-decide-act: fetch fresh state, pick at most one step, perform
//! it, record the result in status.

mod customer;
mod order;

pub use customer::CustomerReconciler;
pub use order::OrderReconciler;
